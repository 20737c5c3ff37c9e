use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePlanRequest {
    pub origin: String,
    pub destination: String,
}

/// Where a waypoint's AQI value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AqiSource {
    /// Ground station PM2.5 reading converted to an index.
    Sensor,
    /// Commercial air-quality lookup keyed by coordinate.
    Fallback,
    /// Neither source had data; contributes 0.
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledWaypoint {
    pub lat: f64,
    pub lon: f64,
    pub pm25: Option<f64>,
    pub aqi: u32,
    pub source: AqiSource,
}

impl SampledWaypoint {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteScore {
    pub route_index: usize,
    pub waypoints: Vec<SampledWaypoint>,
    pub total_aqi: u32,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePlanResponse {
    pub polyline: Vec<String>,
    pub aqi_points: Vec<SampledWaypoint>,
    pub routes: Vec<RouteScore>,
    pub best_aqi_path_index: usize,
    #[serde(rename = "debugMode")]
    pub debug_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}
