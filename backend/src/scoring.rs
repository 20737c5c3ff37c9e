use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    aqi::pm25_to_aqi,
    error::{PlanError, ProviderError},
    geo::path_length_km,
    models::{AqiSource, Coordinate, PM25, RouteScore, SampledWaypoint, StationQuery},
    providers::{FallbackAqiSource, SensorDirectory},
    sampling::sample_waypoints,
    stations::{DEFAULT_MAX_AGE_DAYS, select_station},
};

#[derive(Debug, Clone)]
pub struct ScoringOptions {
    pub station_query: StationQuery,
    pub max_age: TimeDelta,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            station_query: StationQuery::default(),
            max_age: TimeDelta::days(DEFAULT_MAX_AGE_DAYS),
        }
    }
}

/// Outcome of comparing every candidate route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRanking {
    pub best_index: usize,
    pub scores: Vec<RouteScore>,
}

/// Scores routes by summing the AQI observed at sampled waypoints.
///
/// Each waypoint is resolved from the nearest fresh ground station first. When
/// that yields no index, or an index of exactly 0, the fallback source is
/// asked instead. A 0 from the fallback means no data and still counts as 0.
/// Lookups run one at a time in waypoint order.
pub struct RouteScorer {
    sensors: Arc<dyn SensorDirectory>,
    fallback: Arc<dyn FallbackAqiSource>,
    options: ScoringOptions,
}

impl RouteScorer {
    pub fn new(
        sensors: Arc<dyn SensorDirectory>,
        fallback: Arc<dyn FallbackAqiSource>,
        options: ScoringOptions,
    ) -> Self {
        Self {
            sensors,
            fallback,
            options,
        }
    }

    /// Score every route in order and pick the lowest total.
    ///
    /// Fails with [`PlanError::NoRoutes`] when `routes` is empty.
    pub async fn rank_routes(
        &self,
        routes: &[Vec<Coordinate>],
        start: Coordinate,
        end: Coordinate,
        now: DateTime<Utc>,
    ) -> Result<RouteRanking, PlanError> {
        let mut scores = Vec::with_capacity(routes.len());
        for (index, path) in routes.iter().enumerate() {
            scores.push(self.score_route(index, path, start, end, now).await);
        }

        let best_index = lowest_total(&scores).ok_or(PlanError::NoRoutes)?;
        Ok(RouteRanking { best_index, scores })
    }

    pub async fn score_route(
        &self,
        route_index: usize,
        path: &[Coordinate],
        start: Coordinate,
        end: Coordinate,
        now: DateTime<Utc>,
    ) -> RouteScore {
        let sampled = sample_waypoints(path, start, end);
        tracing::info!(
            "scoring route {route_index}: {} polyline points, {} waypoints",
            path.len(),
            sampled.len()
        );

        let mut waypoints = Vec::with_capacity(sampled.len());
        let mut total_aqi = 0u32;
        for point in sampled {
            let waypoint = self.score_waypoint(point, now).await;
            tracing::debug!(
                "route {route_index} lat={} lon={} pm25={:?} aqi={} source={:?}",
                waypoint.lat,
                waypoint.lon,
                waypoint.pm25,
                waypoint.aqi,
                waypoint.source
            );
            total_aqi = total_aqi.saturating_add(waypoint.aqi);
            waypoints.push(waypoint);
        }

        RouteScore {
            route_index,
            waypoints,
            total_aqi,
            distance_km: path_length_km(path),
        }
    }

    async fn score_waypoint(&self, point: Coordinate, now: DateTime<Utc>) -> SampledWaypoint {
        let pm25 = match self.sensor_pm25(point, now).await {
            Ok(pm25) => pm25,
            Err(err) => {
                tracing::warn!("sensor lookup failed at {},{}: {err}", point.lat, point.lon);
                None
            }
        };

        // A zero index is indistinguishable from missing data here, so it
        // also goes to the fallback.
        let (aqi, source) = match pm25_to_aqi(pm25) {
            Some(aqi) if aqi > 0 => (aqi, AqiSource::Sensor),
            _ => match self.fallback.current_index(point).await {
                Ok(0) => (0, AqiSource::None),
                Ok(aqi) => (aqi, AqiSource::Fallback),
                Err(err) => {
                    tracing::warn!(
                        "fallback AQI lookup failed at {},{}: {err}",
                        point.lat,
                        point.lon
                    );
                    (0, AqiSource::None)
                }
            },
        };

        SampledWaypoint {
            lat: point.lat,
            lon: point.lon,
            pm25,
            aqi,
            source,
        }
    }

    /// Latest PM2.5 reading of the best station near `point`, if any.
    async fn sensor_pm25(
        &self,
        point: Coordinate,
        now: DateTime<Utc>,
    ) -> Result<Option<f64>, ProviderError> {
        let stations = self
            .sensors
            .find_stations_near(point, &self.options.station_query)
            .await?;
        let Some(station) = select_station(&stations, now, self.options.max_age) else {
            return Ok(None);
        };

        let sensor_ids = station.sensor_ids_for(PM25);
        self.sensors
            .fetch_latest_value(station.id, &sensor_ids)
            .await
    }
}

/// Index of the route with the strictly lowest total; the earliest route wins
/// a tie. `None` for an empty slice.
pub fn lowest_total(scores: &[RouteScore]) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (index, score) in scores.iter().enumerate() {
        match best {
            Some((_, lowest)) if score.total_aqi >= lowest => {}
            _ => best = Some((index, score.total_aqi)),
        }
    }
    best.map(|(index, _)| index)
}
