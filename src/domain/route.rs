// Trip route assembled from the two routed legs
use super::geometry::Coordinate;

pub const METERS_PER_MILE: f64 = 1609.34;
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// One routed leg, already converted to miles and hours.
#[derive(Debug, Clone)]
pub struct Leg {
    pub coords: Vec<Coordinate>,
    pub miles: f64,
    pub hours: f64,
}

impl Leg {
    pub fn from_provider(coords: Vec<Coordinate>, distance_m: f64, duration_s: f64) -> Self {
        Self {
            coords,
            miles: distance_m / METERS_PER_MILE,
            hours: duration_s / SECONDS_PER_HOUR,
        }
    }
}

/// Current → pickup → dropoff as a single polyline.
#[derive(Debug, Clone)]
pub struct Route {
    pub coords: Vec<Coordinate>,
    pub leg1_miles: f64,
    pub total_miles: f64,
    pub total_hours: f64,
}

impl Route {
    /// Join the legs, dropping the second leg's first point (the pickup
    /// junction already closes the first leg).
    pub fn join(to_pickup: Leg, to_dropoff: Leg) -> Self {
        let mut coords = to_pickup.coords;
        coords.extend(to_dropoff.coords.into_iter().skip(1));

        Self {
            coords,
            leg1_miles: to_pickup.miles,
            total_miles: to_pickup.miles + to_dropoff.miles,
            total_hours: to_pickup.hours + to_dropoff.hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leg_unit_conversion() {
        let leg = Leg::from_provider(Vec::new(), 160_934.0, 7_200.0);
        assert!((leg.miles - 100.0).abs() < 1e-9);
        assert!((leg.hours - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_join_drops_duplicate_junction() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 1.0);
        let c = Coordinate::new(2.0, 2.0);
        let route = Route::join(
            Leg::from_provider(vec![a, b], 10_000.0, 3_600.0),
            Leg::from_provider(vec![b, c], 20_000.0, 1_800.0),
        );
        assert_eq!(route.coords, vec![a, b, c]);
        assert!((route.total_miles - 30_000.0 / METERS_PER_MILE).abs() < 1e-9);
        assert!((route.total_hours - 1.5).abs() < 1e-9);
        assert!((route.leg1_miles - 10_000.0 / METERS_PER_MILE).abs() < 1e-9);
    }
}
