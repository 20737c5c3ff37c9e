use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{FallbackAqiSource, RoutingProvider, read_json};
use crate::error::ProviderError;
use crate::models::{Coordinate, EncodedRoute};

const DIRECTIONS: &str = "google-directions";
const AIR_QUALITY: &str = "google-air-quality";

pub struct GoogleParams {
    pub api_key: String,
    pub directions_url: String,
    pub air_quality_url: String,
}

/// Google Directions API, driving mode with alternatives.
pub struct GoogleDirections {
    api_key: String,
    url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    overview_polyline: OverviewPolyline,
}

#[derive(Debug, Deserialize)]
struct OverviewPolyline {
    points: String,
}

impl GoogleDirections {
    pub fn new(client: reqwest::Client, params: &GoogleParams) -> Self {
        Self {
            api_key: params.api_key.clone(),
            url: params.directions_url.clone(),
            client,
        }
    }
}

#[async_trait]
impl RoutingProvider for GoogleDirections {
    async fn driving_routes(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<EncodedRoute>, ProviderError> {
        let origin = format!("{},{}", origin.lat, origin.lon);
        let destination = format!("{},{}", destination.lat, destination.lon);
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("mode", "driving"),
                ("alternatives", "true"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let body: DirectionsResponse = read_json(DIRECTIONS, response).await?;
        routes_from_response(body)
    }
}

fn routes_from_response(body: DirectionsResponse) -> Result<Vec<EncodedRoute>, ProviderError> {
    match body.status.as_str() {
        "OK" => Ok(body
            .routes
            .into_iter()
            .map(|route| EncodedRoute {
                polyline: route.overview_polyline.points,
            })
            .collect()),
        "ZERO_RESULTS" | "NOT_FOUND" => Ok(Vec::new()),
        status => Err(ProviderError::Api {
            provider: DIRECTIONS,
            status: 200,
            message: match body.error_message {
                Some(message) => format!("{status}: {message}"),
                None => status.to_string(),
            },
        }),
    }
}

/// Google Air Quality `currentConditions:lookup`.
pub struct GoogleAirQuality {
    api_key: String,
    url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct LookupRequest {
    location: LatLng,
}

#[derive(Debug, Serialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    indexes: Vec<AirQualityIndex>,
}

#[derive(Debug, Deserialize)]
struct AirQualityIndex {
    #[serde(default)]
    aqi: Option<u32>,
}

impl GoogleAirQuality {
    pub fn new(client: reqwest::Client, params: &GoogleParams) -> Self {
        Self {
            api_key: params.api_key.clone(),
            url: params.air_quality_url.clone(),
            client,
        }
    }
}

#[async_trait]
impl FallbackAqiSource for GoogleAirQuality {
    async fn current_index(&self, point: Coordinate) -> Result<u32, ProviderError> {
        let request = LookupRequest {
            location: LatLng {
                latitude: point.lat,
                longitude: point.lon,
            },
        };
        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let body: LookupResponse = read_json(AIR_QUALITY, response).await?;
        Ok(index_from_response(&body))
    }
}

/// AQI of the first reported index, or 0 when there is none.
fn index_from_response(body: &LookupResponse) -> u32 {
    body.indexes
        .first()
        .and_then(|index| index.aqi)
        .unwrap_or(0)
}
