use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use shared::{
    ApiError, AqiSource, Coordinate, RoutePlanRequest, RoutePlanResponse, RouteScore,
    SampledWaypoint,
};

pub const PM25: &str = "pm25";

/// One sensor hosted by a monitoring station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: u64,
    pub parameter: String,
}

/// A ground monitoring station as reported for one query point.
///
/// `distance_m` is supplied by the directory relative to the point the
/// stations were searched around; `None` when the provider omitted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringStation {
    pub id: u64,
    pub coordinates: Option<Coordinate>,
    pub sensors: Vec<Sensor>,
    pub last_observed: Option<DateTime<Utc>>,
    pub distance_m: Option<f64>,
}

impl MonitoringStation {
    pub fn sensor_ids_for(&self, parameter: &str) -> Vec<u64> {
        self.sensors
            .iter()
            .filter(|sensor| sensor.parameter == parameter)
            .map(|sensor| sensor.id)
            .collect()
    }
}

/// Search parameters for the ground-sensor directory.
#[derive(Debug, Clone, PartialEq)]
pub struct StationQuery {
    pub radius_m: u32,
    pub parameter: String,
    pub monitors_only: bool,
    pub limit: u32,
}

impl Default for StationQuery {
    fn default() -> Self {
        Self {
            radius_m: 20_000,
            parameter: PM25.to_string(),
            monitors_only: true,
            limit: 20,
        }
    }
}

/// A candidate driving route as returned by the routing provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedRoute {
    pub polyline: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_ids_filter_by_parameter() {
        let station = MonitoringStation {
            id: 7,
            coordinates: None,
            sensors: vec![
                Sensor {
                    id: 1,
                    parameter: "pm25".into(),
                },
                Sensor {
                    id: 2,
                    parameter: "o3".into(),
                },
                Sensor {
                    id: 3,
                    parameter: "pm25".into(),
                },
            ],
            last_observed: None,
            distance_m: None,
        };
        assert_eq!(station.sensor_ids_for(PM25), vec![1, 3]);
        assert!(station.sensor_ids_for("no2").is_empty());
    }
}
