//! External collaborators of the route planner.
//!
//! The planner only talks to these traits so the scoring engine can run
//! against fakes in tests. Each HTTP implementation is a thin single-shot
//! client: no retries, no caching, no rate limiting.

#[cfg(test)]
pub(crate) mod fakes;
pub mod google;
pub mod nominatim;
pub mod openaq;

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::models::{Coordinate, EncodedRoute, MonitoringStation, StationQuery};

pub use google::{GoogleAirQuality, GoogleDirections};
pub use nominatim::NominatimGeocoder;
pub use openaq::OpenAqDirectory;

/// Resolves a free-text address to a coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the address matched nothing.
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ProviderError>;
}

/// Returns alternative driving routes between two points.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn driving_routes(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<EncodedRoute>, ProviderError>;
}

/// Ground monitoring stations and their latest readings.
#[async_trait]
pub trait SensorDirectory: Send + Sync {
    async fn find_stations_near(
        &self,
        point: Coordinate,
        query: &StationQuery,
    ) -> Result<Vec<MonitoringStation>, ProviderError>;

    /// Latest value reported by any of `sensor_ids` at `station_id`.
    async fn fetch_latest_value(
        &self,
        station_id: u64,
        sensor_ids: &[u64],
    ) -> Result<Option<f64>, ProviderError>;
}

/// Secondary air-quality source keyed only by coordinate.
#[async_trait]
pub trait FallbackAqiSource: Send + Sync {
    /// Current AQI at `point`; 0 means the source has no data.
    async fn current_index(&self, point: Coordinate) -> Result<u32, ProviderError>;
}

pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Deserialize a successful response body, or turn a non-success status into
/// [`ProviderError::Api`].
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api {
            provider,
            status: status.as_u16(),
            message,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| ProviderError::Malformed {
        provider,
        message: err.to_string(),
    })
}
