use chrono::NaiveDateTime;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub geocoding: GeocodingSettings,
    #[serde(default)]
    pub routing: RoutingSettings,
    #[serde(default)]
    pub trip: TripSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingSettings {
    #[serde(default = "default_geocoding_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_url(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoutingSettings {
    #[serde(default = "default_routing_url")]
    pub base_url: String,
    #[serde(default = "default_profile")]
    pub profile: String,
    /// Missing keys are reported per request, not at startup.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            base_url: default_routing_url(),
            profile: default_profile(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TripSettings {
    /// Simulation start used when a request carries none; local time.
    #[serde(default)]
    pub default_start: Option<NaiveDateTime>,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_geocoding_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    "TripPlanner/1.0".to_string()
}

fn default_routing_url() -> String {
    "https://api.openrouteservice.org".to_string()
}

fn default_profile() -> String {
    "driving-car".to_string()
}

/// Layered settings: optional `config/trip_planner.*` file, then
/// `TRIP_PLANNER__SECTION__KEY` environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/trip_planner").required(false))
        .add_source(
            config::Environment::with_prefix("TRIP_PLANNER")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Treat blank keys the same as absent ones.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
