use std::{net::SocketAddr, str::FromStr, time::Duration};

use chrono::TimeDelta;

use crate::error::ConfigError;
use crate::models::{PM25, StationQuery};
use crate::stations::DEFAULT_MAX_AGE_DAYS;

pub const MAX_SENSOR_AGE_DAYS: i64 = 3_650;
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_GEOCODER_USER_AGENT: &str = "AQIMaps";
pub const DEFAULT_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
pub const DEFAULT_OPENAQ_URL: &str = "https://api.openaq.org/v3";
pub const DEFAULT_AIR_QUALITY_URL: &str =
    "https://airquality.googleapis.com/v1/currentConditions:lookup";

/// Process configuration, read once at startup and handed to the
/// collaborator constructors.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub google_maps_api_key: String,
    pub openaq_api_key: String,
    pub debug: bool,
    pub bind_addr: SocketAddr,
    pub nominatim_url: String,
    pub geocoder_user_agent: String,
    pub directions_url: String,
    pub openaq_url: String,
    pub air_quality_url: String,
    pub http_timeout: Duration,
    pub sensor_radius_m: u32,
    pub sensor_limit: u32,
    pub sensor_max_age_days: i64,
}

impl AppConfig {
    /// Read configuration from the process environment, after loading a
    /// `.env` file from the working directory if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));
        let or_default = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            google_maps_api_key: required("GOOGLE_MAPS_API_KEY")?,
            openaq_api_key: required("OPENAQ_API_KEY")?,
            debug: var("DEBUG").is_some(),
            bind_addr: parse_or(var("BIND_ADDR"), "BIND_ADDR", || {
                SocketAddr::from(([0, 0, 0, 0], 8080))
            })?,
            nominatim_url: or_default("NOMINATIM_URL", DEFAULT_NOMINATIM_URL),
            geocoder_user_agent: or_default("GEOCODER_USER_AGENT", DEFAULT_GEOCODER_USER_AGENT),
            directions_url: or_default("DIRECTIONS_URL", DEFAULT_DIRECTIONS_URL),
            openaq_url: or_default("OPENAQ_URL", DEFAULT_OPENAQ_URL),
            air_quality_url: or_default("AIR_QUALITY_URL", DEFAULT_AIR_QUALITY_URL),
            http_timeout: Duration::from_secs(parse_or(
                var("HTTP_TIMEOUT_SECS"),
                "HTTP_TIMEOUT_SECS",
                || 10,
            )?),
            sensor_radius_m: parse_or(var("SENSOR_RADIUS_M"), "SENSOR_RADIUS_M", || 20_000)?,
            sensor_limit: parse_or(var("SENSOR_LIMIT"), "SENSOR_LIMIT", || 20)?,
            sensor_max_age_days: parse_max_age(var("SENSOR_MAX_AGE_DAYS"))?,
        })
    }

    pub fn station_query(&self) -> StationQuery {
        StationQuery {
            radius_m: self.sensor_radius_m,
            parameter: PM25.to_string(),
            monitors_only: true,
            limit: self.sensor_limit,
        }
    }

    pub fn sensor_max_age(&self) -> TimeDelta {
        TimeDelta::try_days(self.sensor_max_age_days)
            .unwrap_or_else(|| TimeDelta::days(DEFAULT_MAX_AGE_DAYS))
    }

    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "aqi_backend=debug,tower_http=debug"
        } else {
            "aqi_backend=info,tower_http=info"
        }
    }
}

/// Freshness window in days, limited to `1..=MAX_SENSOR_AGE_DAYS`.
fn parse_max_age(raw: Option<String>) -> Result<i64, ConfigError> {
    const VAR: &str = "SENSOR_MAX_AGE_DAYS";
    let days = parse_or(raw, VAR, || DEFAULT_MAX_AGE_DAYS)?;
    if !(1..=MAX_SENSOR_AGE_DAYS).contains(&days) {
        return Err(ConfigError::Invalid {
            var: VAR,
            value: days.to_string(),
        });
    }
    Ok(days)
}

fn parse_or<T: FromStr>(
    raw: Option<String>,
    var: &'static str,
    default: impl FnOnce() -> T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const KEYS: [(&str, &str); 2] = [("GOOGLE_MAPS_API_KEY", "g-key"), ("OPENAQ_API_KEY", "aq-key")];

    #[test]
    fn defaults_apply_when_only_keys_are_set() {
        let config = AppConfig::from_lookup(lookup(&KEYS)).unwrap();
        assert_eq!(config.google_maps_api_key, "g-key");
        assert_eq!(config.openaq_api_key, "aq-key");
        assert!(!config.debug);
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.directions_url, DEFAULT_DIRECTIONS_URL);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.station_query(), StationQuery::default());
        assert_eq!(config.sensor_max_age_days, 30);
    }

    #[test]
    fn missing_key_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[("GOOGLE_MAPS_API_KEY", "g")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("OPENAQ_API_KEY")));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let err = AppConfig::from_lookup(lookup(&[
            ("GOOGLE_MAPS_API_KEY", "  "),
            ("OPENAQ_API_KEY", "aq"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("GOOGLE_MAPS_API_KEY")));
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = KEYS.to_vec();
        pairs.extend([
            ("DEBUG", "1"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("SENSOR_RADIUS_M", "5000"),
            ("SENSOR_MAX_AGE_DAYS", "7"),
        ]);
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert!(config.debug);
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.station_query().radius_m, 5000);
        assert_eq!(config.sensor_max_age_days, 7);
        assert_eq!(config.default_log_filter(), "aqi_backend=debug,tower_http=debug");
    }

    #[test]
    fn bad_number_is_rejected() {
        let mut pairs = KEYS.to_vec();
        pairs.push(("SENSOR_LIMIT", "twenty"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "SENSOR_LIMIT", .. }));
    }

    #[test]
    fn max_age_outside_window_is_rejected() {
        for days in ["0", "-5", "3651", "200000000", "9223372036854775807"] {
            let mut pairs = KEYS.to_vec();
            pairs.push(("SENSOR_MAX_AGE_DAYS", days));
            let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { var: "SENSOR_MAX_AGE_DAYS", ref value } if value == days),
                "{days} accepted"
            );
        }
    }

    #[test]
    fn max_age_window_edges_are_accepted() {
        for (raw, days) in [("1", 1), ("3650", 3_650)] {
            let mut pairs = KEYS.to_vec();
            pairs.push(("SENSOR_MAX_AGE_DAYS", raw));
            let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
            assert_eq!(config.sensor_max_age(), TimeDelta::days(days));
        }
    }
}
