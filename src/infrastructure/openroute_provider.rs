// OpenRouteService directions implementation
use crate::application::geo_services::{RoutedLeg, RoutingError, RoutingProvider};
use crate::domain::geometry::Coordinate;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Clone)]
pub struct OpenRouteProvider {
    client: reqwest::Client,
    base_url: String,
    profile: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    geometry: String,
    #[serde(default)]
    summary: RouteSummary,
}

// ORS omits zero-valued summary fields
#[derive(Debug, Deserialize, Default)]
struct RouteSummary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

impl OpenRouteProvider {
    pub fn new(base_url: String, profile: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            profile,
            api_key,
        }
    }

    fn directions_url(&self) -> String {
        format!("{}/v2/directions/{}", self.base_url, self.profile)
    }
}

fn error_message(error: &serde_json::Value) -> String {
    match error {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

fn interpret(response: DirectionsResponse) -> Result<RoutedLeg, RoutingError> {
    if let Some(error) = &response.error {
        return Err(RoutingError::Rejected {
            message: error_message(error),
        });
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(RoutingError::NoRoutes)?;

    Ok(RoutedLeg {
        encoded_geometry: route.geometry,
        distance_m: route.summary.distance,
        duration_s: route.summary.duration,
    })
}

#[async_trait]
impl RoutingProvider for OpenRouteProvider {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<RoutedLeg, RoutingError> {
        let Some(api_key) = &self.api_key else {
            return Err(RoutingError::MissingApiKey);
        };

        let body = json!({
            "coordinates": [[from.lon, from.lat], [to.lon, to.lat]]
        });

        let response = self
            .client
            .post(self.directions_url())
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .context("Failed to send request to OpenRouteService")?;

        let status = response.status();
        tracing::debug!("OpenRouteService response status: {}", status);
        let text = response
            .text()
            .await
            .context("Failed to read OpenRouteService response")?;

        match serde_json::from_str::<DirectionsResponse>(&text) {
            Ok(parsed) => interpret(parsed),
            Err(_) if !status.is_success() => Err(RoutingError::Rejected {
                message: format!("status {}: {}", status, text),
            }),
            Err(e) => Err(RoutingError::Transport(
                anyhow::Error::new(e).context("Failed to parse OpenRouteService response"),
            )),
        }
    }
}
