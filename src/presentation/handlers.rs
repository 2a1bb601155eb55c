// HTTP request handlers
use crate::application::trip_service::{TripPlanError, TripRequest};
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::infrastructure::json_mapper::{ErrorBody, error_to_json, trip_plan_to_json};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequestBody {
    pub current_location: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    #[serde(default)]
    pub cycle_hours: Option<f64>,
    #[serde(default)]
    pub start_time: Option<String>,
}

/// Accepts `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DDTHH:MM`.
pub fn parse_start_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
}

impl TryFrom<TripRequestBody> for TripRequest {
    type Error = TripPlanError;

    fn try_from(body: TripRequestBody) -> Result<Self, Self::Error> {
        let start = match body.start_time.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(parse_start_time(raw).ok_or_else(|| {
                TripPlanError::InvalidInput(format!("startTime '{}' is not a local date-time", raw))
            })?),
        };
        Ok(TripRequest {
            current_location: body.current_location,
            pickup_location: body.pickup_location,
            dropoff_location: body.dropoff_location,
            cycle_hours: body.cycle_hours.unwrap_or(0.0),
            start,
        })
    }
}

pub fn status_for(err: &TripPlanError) -> StatusCode {
    match err {
        TripPlanError::InvalidInput(_)
        | TripPlanError::UnknownLocations(_)
        | TripPlanError::RouteFailed { .. } => StatusCode::BAD_REQUEST,
        TripPlanError::Geocoding { .. }
        | TripPlanError::MissingApiKey
        | TripPlanError::InvalidRouteResponse { .. }
        | TripPlanError::Planning(_)
        | TripPlanError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn respond<T: Serialize>(status: StatusCode, body: &T, compress: bool) -> Response {
    match json_response(status, body, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Plan a trip and render its daily logs
pub async fn create_trip(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TripRequestBody>, JsonRejection>,
) -> Response {
    let compress = accepts_brotli(&headers);

    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::warn!("Rejected trip request body: {}", rejection.body_text());
            let error = ErrorBody {
                error: "Invalid request body".to_string(),
                api_error: None,
                details: Some(rejection.body_text()),
            };
            return respond(StatusCode::BAD_REQUEST, &error, compress).await;
        }
    };

    let result = match TripRequest::try_from(body) {
        Ok(request) => state.trip_service.plan_trip(request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(plan) => respond(StatusCode::OK, &trip_plan_to_json(plan), compress).await,
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!("Trip planning failed: {}", e);
            } else {
                tracing::warn!("Trip request rejected: {}", e);
            }
            respond(status, &error_to_json(&e), compress).await
        }
    }
}
