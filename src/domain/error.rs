// Planning errors raised by the pure trip-planning core
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PlanningError {
    #[error("malformed route geometry at byte {position}: {reason}")]
    MalformedGeometry { position: usize, reason: &'static str },

    #[error("degenerate route: {total_miles:.2} mi over {total_hours:.2} h has no usable average speed")]
    DegenerateRoute { total_miles: f64, total_hours: f64 },

    #[error("no duty events to render for {day}")]
    EmptyDayEvents { day: NaiveDate },

    #[error("log chart rendering failed: {0}")]
    Render(String),
}

pub type PlanningResult<T> = Result<T, PlanningError>;
