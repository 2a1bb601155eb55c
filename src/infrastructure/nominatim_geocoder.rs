// Nominatim geocoder implementation
use crate::application::geo_services::Geocoder;
use crate::domain::geometry::Coordinate;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: String, user_agent: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent,
        }
    }

    fn build_search_url(&self, place: &str) -> String {
        format!(
            "{}/search?q={}&format=json",
            self.base_url,
            urlencoding::encode(place)
        )
    }
}

fn first_coordinate(results: &[SearchResult]) -> Result<Option<Coordinate>> {
    let Some(first) = results.first() else {
        return Ok(None);
    };
    let lat: f64 = first.lat.parse().context("Nominatim returned a non-numeric latitude")?;
    let lon: f64 = first.lon.parse().context("Nominatim returned a non-numeric longitude")?;
    Ok(Some(Coordinate::new(lon, lat)))
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, place: &str) -> Result<Option<Coordinate>> {
        let url = self.build_search_url(place);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to Nominatim")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Nominatim search failed with status {}: {}", status, body);
        }

        let results = response
            .json::<Vec<SearchResult>>()
            .await
            .context("Failed to parse Nominatim response")?;

        tracing::debug!("Geocoding '{}': {} results", place, results.len());
        let coordinate = first_coordinate(&results)?;
        if let Some(c) = coordinate {
            tracing::debug!("Coords for {}: ({}, {})", place, c.lat, c.lon);
        }
        Ok(coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_is_encoded() {
        let geocoder = NominatimGeocoder::new(
            "https://nominatim.example.org/".to_string(),
            "TripPlanner/1.0".to_string(),
        );
        assert_eq!(
            geocoder.build_search_url("Dallas, TX"),
            "https://nominatim.example.org/search?q=Dallas%2C%20TX&format=json"
        );
    }

    #[test]
    fn test_first_result_wins() {
        let results: Vec<SearchResult> = serde_json::from_str(
            r#"[{"lat": "32.7767", "lon": "-96.7970", "display_name": "Dallas"},
                {"lat": "0", "lon": "0"}]"#,
        )
        .unwrap();
        let c = first_coordinate(&results).unwrap().unwrap();
        assert_eq!(c, Coordinate::new(-96.7970, 32.7767));
    }

    #[test]
    fn test_no_results_is_not_found() {
        assert_eq!(first_coordinate(&[]).unwrap(), None);
    }

    #[test]
    fn test_bad_number_is_an_error() {
        let results = vec![SearchResult {
            lat: "north".to_string(),
            lon: "1".to_string(),
        }];
        assert!(first_coordinate(&results).is_err());
    }
}
