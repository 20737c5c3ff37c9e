use chrono::{DateTime, TimeDelta, Utc};

use crate::models::MonitoringStation;

pub const DEFAULT_MAX_AGE_DAYS: i64 = 30;

/// Pick the station whose reading best represents the point the candidates
/// were searched around.
///
/// Only stations with an observation no older than `max_age` before `now`
/// are considered; stale or timestamp-less stations are never compared on
/// distance. Among the fresh ones the smallest provider-reported distance
/// wins, and the first in input order wins a tie. A station without a finite
/// distance cannot be selected. A window reaching past the earliest
/// representable instant admits every timestamped station.
pub fn select_station(
    candidates: &[MonitoringStation],
    now: DateTime<Utc>,
    max_age: TimeDelta,
) -> Option<&MonitoringStation> {
    let cutoff = now
        .checked_sub_signed(max_age)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut best: Option<&MonitoringStation> = None;
    let mut shortest = f64::INFINITY;

    for station in candidates {
        let Some(last_observed) = station.last_observed else {
            continue;
        };
        if last_observed < cutoff {
            continue;
        }
        let Some(distance) = station.distance_m else {
            continue;
        };
        if distance < shortest {
            shortest = distance;
            best = Some(station);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sensor;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn station(id: u64, distance_m: Option<f64>, age_days: Option<i64>) -> MonitoringStation {
        MonitoringStation {
            id,
            coordinates: None,
            sensors: vec![Sensor {
                id: id * 10,
                parameter: "pm25".into(),
            }],
            last_observed: age_days.map(|days| now() - TimeDelta::days(days)),
            distance_m,
        }
    }

    fn max_age() -> TimeDelta {
        TimeDelta::days(DEFAULT_MAX_AGE_DAYS)
    }

    #[test]
    fn stale_station_is_excluded_even_when_nearer() {
        let candidates = vec![
            station(1, Some(500.0), Some(5)),
            station(2, Some(200.0), Some(40)),
        ];
        let chosen = select_station(&candidates, now(), max_age()).unwrap();
        assert_eq!(chosen.id, 1);
    }

    #[test]
    fn nearest_fresh_station_wins() {
        let candidates = vec![
            station(1, Some(900.0), Some(1)),
            station(2, Some(300.0), Some(2)),
            station(3, Some(600.0), Some(3)),
        ];
        assert_eq!(select_station(&candidates, now(), max_age()).unwrap().id, 2);
    }

    #[test]
    fn missing_timestamp_is_never_selected() {
        let candidates = vec![station(1, Some(10.0), None), station(2, Some(800.0), Some(0))];
        assert_eq!(select_station(&candidates, now(), max_age()).unwrap().id, 2);
    }

    #[test]
    fn nothing_fresh_selects_nothing() {
        let candidates = vec![
            station(1, Some(100.0), Some(31)),
            station(2, Some(200.0), None),
        ];
        assert!(select_station(&candidates, now(), max_age()).is_none());
        assert!(select_station(&[], now(), max_age()).is_none());
    }

    #[test]
    fn observation_exactly_at_cutoff_is_fresh() {
        let candidates = vec![station(1, Some(100.0), Some(30))];
        assert_eq!(select_station(&candidates, now(), max_age()).unwrap().id, 1);
    }

    #[test]
    fn first_station_wins_a_distance_tie() {
        let candidates = vec![
            station(4, Some(250.0), Some(1)),
            station(5, Some(250.0), Some(1)),
        ];
        assert_eq!(select_station(&candidates, now(), max_age()).unwrap().id, 4);
    }

    #[test]
    fn station_without_distance_is_skipped() {
        let candidates = vec![station(1, None, Some(1)), station(2, Some(5_000.0), Some(1))];
        assert_eq!(select_station(&candidates, now(), max_age()).unwrap().id, 2);

        let only_unknown = vec![station(3, None, Some(1)), station(4, Some(f64::NAN), Some(1))];
        assert!(select_station(&only_unknown, now(), max_age()).is_none());
    }

    #[test]
    fn window_past_earliest_instant_admits_every_timestamp() {
        let candidates = vec![station(1, Some(100.0), Some(40)), station(2, None, Some(1))];
        let chosen = select_station(&candidates, now(), TimeDelta::days(200_000_000));
        assert_eq!(chosen.unwrap().id, 1);
    }
}
