// Domain layer - pure trip planning: geometry, HOS simulation, log charts
pub mod daily_log;
pub mod distance;
pub mod duty;
pub mod error;
pub mod geometry;
pub mod hos;
pub mod log_chart;
pub mod route;
pub mod stops;
