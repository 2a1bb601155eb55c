// Stops along the route: planned fueling, pickup/dropoff, and stops observed while simulating
use std::fmt;

use super::distance::RouteProfile;
use super::geometry::Coordinate;

/// Miles between refuelling stops.
pub const FUEL_INTERVAL_MI: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopKind {
    /// `at_mile` is set for stops planned from the distance curve and left
    /// empty for stops recorded at the driver's live position.
    Fueling { at_mile: Option<u32> },
    Pickup,
    Dropoff,
    Break,
    RestStop,
}

impl fmt::Display for StopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopKind::Fueling { at_mile: Some(mile) } => write!(f, "Fueling at {} mi", mile),
            StopKind::Fueling { at_mile: None } => f.write_str("Fueling"),
            StopKind::Pickup => f.write_str("Pickup"),
            StopKind::Dropoff => f.write_str("Dropoff"),
            StopKind::Break => f.write_str("Break"),
            StopKind::RestStop => f.write_str("Rest Stop"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub coordinate: Coordinate,
    pub kind: StopKind,
}

impl Stop {
    pub fn new(coordinate: Coordinate, kind: StopKind) -> Self {
        Self { coordinate, kind }
    }
}

/// Fueling stops at every whole multiple of the fuel interval strictly
/// below `total_miles`, then the pickup and dropoff.
///
/// Positions come from the measured polyline; a threshold beyond its end
/// is pinned to the final point.
pub fn plan_stops(
    profile: &RouteProfile,
    total_miles: f64,
    pickup: Coordinate,
    dropoff: Coordinate,
) -> Vec<Stop> {
    let mut stops = Vec::new();
    let mut cursor = profile.cursor();
    let mut next_fuel = FUEL_INTERVAL_MI;

    while next_fuel < total_miles {
        let at = cursor.advance_to(next_fuel);
        stops.push(Stop::new(
            at,
            StopKind::Fueling {
                at_mile: Some(next_fuel as u32),
            },
        ));
        next_fuel += FUEL_INTERVAL_MI;
    }

    stops.push(Stop::new(pickup, StopKind::Pickup));
    stops.push(Stop::new(dropoff, StopKind::Dropoff));
    stops
}
