//! Geocoding client backed by the Nominatim search API

use std::str::FromStr;
use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::GpsCoordinates;

use crate::config::GeocodingConfig;

/// Nominatim geocoding client
#[derive(Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
    country_codes: String,
    user_agent: String,
}

/// One Nominatim search hit; coordinates arrive as strings
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl GeocodingClient {
    pub fn new(config: &GeocodingConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.api_endpoint.clone(),
            country_codes: config.country_codes.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// Resolve a free-text location to coordinates.
    ///
    /// Any upstream failure is logged and reads as "not found".
    pub async fn lookup(&self, location_text: &str) -> Option<GpsCoordinates> {
        match self.search(location_text).await {
            Ok(coords) => coords,
            Err(e) => {
                tracing::warn!(location = %location_text, "Geocoding failed: {}", e);
                None
            }
        }
    }

    async fn search(&self, location_text: &str) -> Result<Option<GpsCoordinates>, reqwest::Error> {
        let places: Vec<NominatimPlace> = self
            .client
            .get(&self.base_url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("q", location_text),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", self.country_codes.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(places.first().and_then(parse_place))
    }
}

fn parse_place(place: &NominatimPlace) -> Option<GpsCoordinates> {
    let latitude = Decimal::from_str(place.lat.trim()).ok()?;
    let longitude = Decimal::from_str(place.lon.trim()).ok()?;
    Some(GpsCoordinates::new(latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_place() {
        let places: Vec<NominatimPlace> =
            serde_json::from_str(r#"[{"lat": "-0.3031", "lon": "36.0800", "display_name": "Nakuru"}]"#)
                .unwrap();
        let coords = parse_place(&places[0]).unwrap();
        assert_eq!(coords.latitude, Decimal::new(-3031, 4));
        assert_eq!(coords.longitude, Decimal::new(360800, 4));
    }

    #[test]
    fn test_parse_place_rejects_garbage() {
        let place = NominatimPlace {
            lat: "north".to_string(),
            lon: "36.08".to_string(),
        };
        assert!(parse_place(&place).is_none());
    }

    #[test]
    fn test_unreachable_service_reads_as_not_found() {
        let client = GeocodingClient::new(&GeocodingConfig {
            api_endpoint: "http://127.0.0.1:9/search".to_string(),
            country_codes: "ke".to_string(),
            user_agent: "GreenFundTest/1.0".to_string(),
            timeout_secs: 1,
        });

        assert!(tokio_test::block_on(client.lookup("Nakuru")).is_none());
    }
}
