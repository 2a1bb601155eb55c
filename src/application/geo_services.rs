// Collaborator traits for place lookup and road routing
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::geometry::Coordinate;

/// A routed leg as the provider reports it: encoded polyline, meters, seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedLeg {
    pub encoded_geometry: String,
    pub distance_m: f64,
    pub duration_s: f64,
}

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("routing API key not configured")]
    MissingApiKey,

    #[error("routing provider rejected the request: {message}")]
    Rejected { message: String },

    #[error("routing provider returned no routes")]
    NoRoutes,

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the place is unknown.
    async fn geocode(&self, place: &str) -> anyhow::Result<Option<Coordinate>>;
}

#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<RoutedLeg, RoutingError>;
}
