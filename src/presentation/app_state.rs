// Application state for HTTP handlers
use crate::application::trip_service::TripService;

#[derive(Clone)]
pub struct AppState {
    pub trip_service: TripService,
}
