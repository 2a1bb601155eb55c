// Cumulative great-circle distance along a route and distance → position lookup
use super::error::{PlanningError, PlanningResult};
use super::geometry::Coordinate;

/// Mean Earth radius in statute miles.
const EARTH_RADIUS_MI: f64 = 3_958.761;

/// Haversine great-circle distance in miles.
pub fn great_circle_miles(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_MI * c
}

/// Running distance from the first point, same length as `coords`.
pub fn cumulative(coords: &[Coordinate]) -> Vec<f64> {
    let mut curve = Vec::with_capacity(coords.len());
    let mut total = 0.0;
    for (k, &c) in coords.iter().enumerate() {
        if k > 0 {
            total += great_circle_miles(coords[k - 1], c);
        }
        curve.push(total);
    }
    curve
}

/// A non-empty route polyline paired with its cumulative-distance curve.
#[derive(Debug, Clone)]
pub struct RouteProfile {
    coords: Vec<Coordinate>,
    curve: Vec<f64>,
}

impl RouteProfile {
    pub fn new(coords: Vec<Coordinate>) -> PlanningResult<Self> {
        if coords.is_empty() {
            return Err(PlanningError::MalformedGeometry {
                position: 0,
                reason: "route has no points",
            });
        }
        let curve = cumulative(&coords);
        Ok(Self { coords, curve })
    }

    pub fn coords(&self) -> &[Coordinate] {
        &self.coords
    }

    pub fn curve(&self) -> &[f64] {
        &self.curve
    }

    /// Measured polyline length; may differ from the provider's road distance.
    pub fn length_miles(&self) -> f64 {
        self.curve.last().copied().unwrap_or(0.0)
    }

    pub fn cursor(&self) -> RouteCursor<'_> {
        RouteCursor {
            profile: self,
            index: 0,
        }
    }

    /// Position at `miles` along the route, scanning from the start.
    pub fn interpolate(&self, miles: f64) -> Coordinate {
        self.cursor().advance_to(miles)
    }
}

/// Forward-only position lookup for non-decreasing distance queries.
///
/// The bracketing index never moves backwards, so a whole simulation costs
/// one pass over the curve.
#[derive(Debug, Clone)]
pub struct RouteCursor<'a> {
    profile: &'a RouteProfile,
    index: usize,
}

impl RouteCursor<'_> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn advance_to(&mut self, miles: f64) -> Coordinate {
        let coords = &self.profile.coords;
        let curve = &self.profile.curve;
        let last = coords.len() - 1;

        while self.index < last && curve[self.index + 1] < miles {
            self.index += 1;
        }
        if self.index >= last {
            return coords[last];
        }

        let i = self.index;
        let span = curve[i + 1] - curve[i];
        if span <= 0.0 {
            return coords[i];
        }
        let frac = ((miles - curve[i]) / span).clamp(0.0, 1.0);
        coords[i].lerp(coords[i + 1], frac)
    }
}
