// Trip service - Use case for planning a trip and its daily logs
use crate::application::geo_services::{Geocoder, RoutingError, RoutingProvider};
use crate::domain::daily_log::group_by_day;
use crate::domain::distance::RouteProfile;
use crate::domain::error::PlanningError;
use crate::domain::geometry::{self, Coordinate};
use crate::domain::hos::{HosRules, TripPlanInput, simulate};
use crate::domain::route::{Leg, Route};
use crate::domain::stops::{Stop, plan_stops};
use crate::infrastructure::png_canvas::render_png;
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripLeg {
    ToPickup,
    ToDropoff,
}

impl TripLeg {
    pub fn failure_message(self) -> &'static str {
        match self {
            TripLeg::ToPickup => "Route calculation failed",
            TripLeg::ToDropoff => "Second route calculation failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum TripPlanError {
    #[error("invalid request: {0}")]
    InvalidInput(String),

    #[error("Invalid locations: {}", .0.join(", "))]
    UnknownLocations(Vec<&'static str>),

    #[error("geocoding failed for '{place}': {source}")]
    Geocoding {
        place: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("OpenRouteService API key not configured")]
    MissingApiKey,

    #[error("{}", .leg.failure_message())]
    RouteFailed { leg: TripLeg, message: String },

    #[error("Invalid route response from API")]
    InvalidRouteResponse { leg: TripLeg, message: String },

    #[error(transparent)]
    Planning(#[from] PlanningError),

    #[error("trip planning task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone)]
pub struct TripRequest {
    pub current_location: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub cycle_hours: f64,
    pub start: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct RenderedLog {
    pub day: NaiveDate,
    pub png: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct TripPlan {
    pub route: Route,
    pub stops: Vec<Stop>,
    pub logs: Vec<RenderedLog>,
}

#[derive(Clone)]
pub struct TripService {
    geocoder: Arc<dyn Geocoder>,
    router: Arc<dyn RoutingProvider>,
    rules: HosRules,
    default_start: Option<NaiveDateTime>,
}

impl TripService {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        router: Arc<dyn RoutingProvider>,
        default_start: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            geocoder,
            router,
            rules: HosRules::default(),
            default_start,
        }
    }

    pub async fn plan_trip(&self, request: TripRequest) -> Result<TripPlan, TripPlanError> {
        if !request.cycle_hours.is_finite() || request.cycle_hours < 0.0 {
            return Err(TripPlanError::InvalidInput(format!(
                "cycleHours must be a non-negative number, got {}",
                request.cycle_hours
            )));
        }

        tracing::info!(
            current = %request.current_location,
            pickup = %request.pickup_location,
            dropoff = %request.dropoff_location,
            "Planning trip"
        );

        let (current, pickup, dropoff) = tokio::join!(
            self.locate(&request.current_location),
            self.locate(&request.pickup_location),
            self.locate(&request.dropoff_location),
        );
        let (current, pickup, dropoff) = (current?, pickup?, dropoff?);

        let (current, pickup, dropoff) = match (current, pickup, dropoff) {
            (Some(c), Some(p), Some(d)) => (c, p, d),
            (c, p, d) => {
                let missing = [(c, "current"), (p, "pickup"), (d, "dropoff")]
                    .into_iter()
                    .filter(|(coord, _)| coord.is_none())
                    .map(|(_, name)| name)
                    .collect();
                return Err(TripPlanError::UnknownLocations(missing));
            }
        };

        let to_pickup = self.route_leg(TripLeg::ToPickup, current, pickup).await?;
        let to_dropoff = self.route_leg(TripLeg::ToDropoff, pickup, dropoff).await?;
        let route = Route::join(to_pickup, to_dropoff);

        tracing::info!(
            "Total distance: {:.1} miles, duration: {:.1} hours",
            route.total_miles,
            route.total_hours
        );

        let input = TripPlanInput {
            leg1_miles: route.leg1_miles,
            total_miles: route.total_miles,
            total_hours: route.total_hours,
            cycle_hours_used: request.cycle_hours,
            start: request
                .start
                .or(self.default_start)
                .unwrap_or_else(|| Local::now().naive_local()),
            current_label: request.current_location,
            pickup_label: request.pickup_location,
            dropoff_label: request.dropoff_location,
        };

        let rules = self.rules;
        tokio::task::spawn_blocking(move || build_plan(route, &input, pickup, dropoff, rules))
            .await
            .map_err(|e| TripPlanError::Task(e.to_string()))?
    }

    async fn locate(&self, place: &str) -> Result<Option<Coordinate>, TripPlanError> {
        self.geocoder
            .geocode(place)
            .await
            .map_err(|source| TripPlanError::Geocoding {
                place: place.to_string(),
                source,
            })
    }

    async fn route_leg(
        &self,
        leg: TripLeg,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Leg, TripPlanError> {
        let routed = self.router.route(from, to).await.map_err(|e| {
            tracing::warn!("Routing {:?} failed: {}", leg, e);
            match e {
                RoutingError::MissingApiKey => TripPlanError::MissingApiKey,
                RoutingError::Rejected { message } => TripPlanError::RouteFailed { leg, message },
                RoutingError::NoRoutes => TripPlanError::InvalidRouteResponse {
                    leg,
                    message: "no routes in response".to_string(),
                },
                RoutingError::Transport(err) => TripPlanError::RouteFailed {
                    leg,
                    message: format!("{:#}", err),
                },
            }
        })?;

        let coords = geometry::decode(&routed.encoded_geometry)?;
        Ok(Leg::from_provider(coords, routed.distance_m, routed.duration_s))
    }
}

/// Stops, simulated timeline and one rendered chart per calendar day.
pub fn build_plan(
    route: Route,
    input: &TripPlanInput,
    pickup: Coordinate,
    dropoff: Coordinate,
    rules: HosRules,
) -> Result<TripPlan, TripPlanError> {
    let profile = RouteProfile::new(route.coords.clone())?;
    let mut stops = plan_stops(&profile, route.total_miles, pickup, dropoff);

    let timeline = simulate(input, &profile, rules)?;
    stops.extend(timeline.stops);

    let logs = group_by_day(&timeline.events)
        .iter()
        .map(|log| {
            Ok(RenderedLog {
                day: log.day,
                png: render_png(log)?,
            })
        })
        .collect::<Result<Vec<_>, PlanningError>>()?;

    tracing::debug!(
        "Planned {} stops and {} daily logs",
        stops.len(),
        logs.len()
    );

    Ok(TripPlan {
        route,
        stops,
        logs,
    })
}
