use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{SensorDirectory, read_json};
use crate::error::ProviderError;
use crate::models::{Coordinate, MonitoringStation, Sensor, StationQuery};

const PROVIDER: &str = "openaq";

pub struct OpenAqParams {
    pub base_url: String,
    pub api_key: String,
}

/// OpenAQ v3 locations API.
pub struct OpenAqDirectory {
    params: OpenAqParams,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    id: u64,
    #[serde(default)]
    coordinates: Option<LatLon>,
    #[serde(default)]
    sensors: Vec<LocationSensor>,
    #[serde(default)]
    datetime_last: Option<Timestamp>,
    #[serde(default)]
    distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct LatLon {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct LocationSensor {
    id: u64,
    parameter: Parameter,
}

#[derive(Debug, Deserialize)]
struct Parameter {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Timestamp {
    #[serde(default)]
    utc: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Latest {
    sensors_id: u64,
    #[serde(default)]
    value: Option<f64>,
}

impl OpenAqDirectory {
    pub fn new(client: reqwest::Client, params: OpenAqParams) -> Self {
        Self { params, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.params.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl SensorDirectory for OpenAqDirectory {
    async fn find_stations_near(
        &self,
        point: Coordinate,
        query: &StationQuery,
    ) -> Result<Vec<MonitoringStation>, ProviderError> {
        let response = self
            .client
            .get(self.url("/locations"))
            .header("X-API-Key", self.params.api_key.as_str())
            .query(&[
                ("coordinates", format!("{},{}", point.lat, point.lon)),
                ("radius", query.radius_m.to_string()),
                ("limit", query.limit.to_string()),
                ("parameter", query.parameter.clone()),
                ("isMonitor", query.monitors_only.to_string()),
            ])
            .send()
            .await?;

        let page: Page<Location> = read_json(PROVIDER, response).await?;
        Ok(page.results.into_iter().map(into_station).collect())
    }

    async fn fetch_latest_value(
        &self,
        station_id: u64,
        sensor_ids: &[u64],
    ) -> Result<Option<f64>, ProviderError> {
        let response = self
            .client
            .get(self.url(&format!("/locations/{station_id}/latest")))
            .header("X-API-Key", self.params.api_key.as_str())
            .query(&[("parameter", "pm25")])
            .send()
            .await?;

        let page: Page<Latest> = read_json(PROVIDER, response).await?;
        Ok(matching_value(&page.results, sensor_ids))
    }
}

fn into_station(location: Location) -> MonitoringStation {
    MonitoringStation {
        id: location.id,
        coordinates: location
            .coordinates
            .map(|c| Coordinate::new(c.latitude, c.longitude)),
        sensors: location
            .sensors
            .into_iter()
            .map(|sensor| Sensor {
                id: sensor.id,
                parameter: sensor.parameter.name,
            })
            .collect(),
        last_observed: location
            .datetime_last
            .and_then(|ts| ts.utc)
            .and_then(|raw| parse_timestamp(&raw)),
        distance_m: location.distance,
    }
}

/// Unparseable timestamps count as "no observation".
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(err) => {
            tracing::debug!("ignoring unparseable station timestamp {raw:?}: {err}");
            None
        }
    }
}

/// Value of the first latest reading that belongs to one of `sensor_ids`.
fn matching_value(readings: &[Latest], sensor_ids: &[u64]) -> Option<f64> {
    readings
        .iter()
        .find(|reading| sensor_ids.contains(&reading.sensors_id))
        .and_then(|reading| reading.value)
}
