//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use geo_types::Coord;

use super::{FallbackAqiSource, Geocoder, RoutingProvider, SensorDirectory};
use crate::error::ProviderError;
use crate::geo::POLYLINE_PRECISION;
use crate::models::{Coordinate, EncodedRoute, MonitoringStation, StationQuery};

pub fn provider_failure(provider: &'static str) -> ProviderError {
    ProviderError::Api {
        provider,
        status: 503,
        message: "unavailable".into(),
    }
}

#[derive(Default)]
pub struct StaticGeocoder {
    pub places: HashMap<String, Coordinate>,
}

impl StaticGeocoder {
    pub fn with(places: &[(&str, Coordinate)]) -> Self {
        Self {
            places: places
                .iter()
                .map(|(name, coord)| (name.to_string(), *coord))
                .collect(),
        }
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ProviderError> {
        Ok(self.places.get(address).copied())
    }
}

pub struct StaticRoutes(pub Vec<EncodedRoute>);

impl StaticRoutes {
    pub fn from_paths(paths: &[Vec<Coordinate>]) -> Self {
        Self(
            paths
                .iter()
                .map(|path| EncodedRoute {
                    polyline: encode_polyline(path),
                })
                .collect(),
        )
    }
}

#[async_trait]
impl RoutingProvider for StaticRoutes {
    async fn driving_routes(
        &self,
        _origin: Coordinate,
        _destination: Coordinate,
    ) -> Result<Vec<EncodedRoute>, ProviderError> {
        Ok(self.0.clone())
    }
}

/// Returns the same stations for every point and serves latest values by
/// station id. Fails every station search whose point has
/// `lat == fail_at_lat` and every value lookup for `fail_value_for`.
#[derive(Default)]
pub struct FakeSensors {
    pub stations: Vec<MonitoringStation>,
    pub values: HashMap<u64, f64>,
    pub fail_at_lat: Option<f64>,
    pub fail_value_for: Option<u64>,
    pub station_calls: AtomicUsize,
    pub value_calls: AtomicUsize,
}

#[async_trait]
impl SensorDirectory for FakeSensors {
    async fn find_stations_near(
        &self,
        point: Coordinate,
        _query: &StationQuery,
    ) -> Result<Vec<MonitoringStation>, ProviderError> {
        self.station_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at_lat == Some(point.lat) {
            return Err(provider_failure("fake-sensors"));
        }
        Ok(self.stations.clone())
    }

    async fn fetch_latest_value(
        &self,
        station_id: u64,
        _sensor_ids: &[u64],
    ) -> Result<Option<f64>, ProviderError> {
        self.value_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_value_for == Some(station_id) {
            return Err(provider_failure("fake-sensors"));
        }
        Ok(self.values.get(&station_id).copied())
    }
}

pub struct FnFallback<F>(F);

impl<F> FnFallback<F>
where
    F: Fn(Coordinate) -> Result<u32, ProviderError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> FallbackAqiSource for FnFallback<F>
where
    F: Fn(Coordinate) -> Result<u32, ProviderError> + Send + Sync,
{
    async fn current_index(&self, point: Coordinate) -> Result<u32, ProviderError> {
        (self.0)(point)
    }
}

pub fn encode_polyline(path: &[Coordinate]) -> String {
    let coords = path.iter().map(|c| Coord { x: c.lon, y: c.lat });
    polyline::encode_coordinates(coords, POLYLINE_PRECISION).unwrap()
}
