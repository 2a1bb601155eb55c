// Mapper to convert trip plans to JSON transfer objects
use crate::application::trip_service::{RenderedLog, TripPlan, TripPlanError};
use crate::domain::geometry::Coordinate;
use crate::domain::stops::Stop;
use crate::infrastructure::png_canvas::png_data_url;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TripResponse {
    pub route: RouteDto,
    pub eld_logs: Vec<EldLogDto>,
}

#[derive(Debug, Serialize)]
pub struct RouteDto {
    /// `[lon, lat]` pairs.
    pub coordinates: Vec<[f64; 2]>,
    pub stops: Vec<StopDto>,
    pub distance: f64,
    pub duration: f64,
}

#[derive(Debug, Serialize)]
pub struct StopDto {
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct EldLogDto {
    pub day: String,
    pub image_url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub fn trip_plan_to_json(plan: TripPlan) -> TripResponse {
    TripResponse {
        route: RouteDto {
            coordinates: plan.route.coords.iter().map(coordinate_to_json).collect(),
            stops: plan.stops.iter().map(stop_to_json).collect(),
            distance: plan.route.total_miles,
            duration: plan.route.total_hours,
        },
        eld_logs: plan.logs.iter().map(log_to_json).collect(),
    }
}

fn coordinate_to_json(c: &Coordinate) -> [f64; 2] {
    [c.lon, c.lat]
}

fn stop_to_json(stop: &Stop) -> StopDto {
    StopDto {
        lat: stop.coordinate.lat,
        lon: stop.coordinate.lon,
        kind: stop.kind.to_string(),
    }
}

fn log_to_json(log: &RenderedLog) -> EldLogDto {
    EldLogDto {
        day: log.day.format("%Y-%m-%d").to_string(),
        image_url: png_data_url(&log.png),
    }
}

pub fn error_to_json(err: &TripPlanError) -> ErrorBody {
    let (api_error, details) = match err {
        TripPlanError::RouteFailed { message, .. } => (Some(message.clone()), None),
        TripPlanError::InvalidRouteResponse { message, .. } => (None, Some(message.clone())),
        TripPlanError::Geocoding { source, .. } => (None, Some(format!("{:#}", source))),
        _ => (None, None),
    };
    ErrorBody {
        error: err.to_string(),
        api_error,
        details,
    }
}
