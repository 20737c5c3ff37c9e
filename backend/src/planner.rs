use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    config::AppConfig,
    error::{PlanError, ProviderError},
    geo::decode_polyline,
    models::{Coordinate, RoutePlanResponse},
    providers::{
        Geocoder, GoogleAirQuality, GoogleDirections, NominatimGeocoder, OpenAqDirectory,
        RoutingProvider, google::GoogleParams, http_client, nominatim::NominatimParams,
        openaq::OpenAqParams,
    },
    scoring::{RouteScorer, ScoringOptions},
};

/// Turns an origin/destination pair into the least polluted driving route.
pub struct RoutePlanner {
    geocoder: Arc<dyn Geocoder>,
    routing: Arc<dyn RoutingProvider>,
    scorer: RouteScorer,
    debug: bool,
}

impl RoutePlanner {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        routing: Arc<dyn RoutingProvider>,
        scorer: RouteScorer,
    ) -> Self {
        Self {
            geocoder,
            routing,
            scorer,
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Wire the HTTP collaborators described by `config` around one shared
    /// client.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let client = http_client(config.http_timeout)?;
        let google = GoogleParams {
            api_key: config.google_maps_api_key.clone(),
            directions_url: config.directions_url.clone(),
            air_quality_url: config.air_quality_url.clone(),
        };

        let geocoder = NominatimGeocoder::new(
            client.clone(),
            NominatimParams {
                base_url: config.nominatim_url.clone(),
                user_agent: config.geocoder_user_agent.clone(),
            },
        );
        let sensors = OpenAqDirectory::new(
            client.clone(),
            OpenAqParams {
                base_url: config.openaq_url.clone(),
                api_key: config.openaq_api_key.clone(),
            },
        );
        let scorer = RouteScorer::new(
            Arc::new(sensors),
            Arc::new(GoogleAirQuality::new(client.clone(), &google)),
            ScoringOptions {
                station_query: config.station_query(),
                max_age: config.sensor_max_age(),
            },
        );

        Ok(Self::new(
            Arc::new(geocoder),
            Arc::new(GoogleDirections::new(client, &google)),
            scorer,
        )
        .with_debug(config.debug))
    }

    pub async fn plan_route(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<RoutePlanResponse, PlanError> {
        self.plan_route_at(origin, destination, Utc::now()).await
    }

    /// Same as [`plan_route`](Self::plan_route) with an explicit clock for
    /// sensor freshness.
    pub async fn plan_route_at(
        &self,
        origin: &str,
        destination: &str,
        now: DateTime<Utc>,
    ) -> Result<RoutePlanResponse, PlanError> {
        tracing::info!("planning route {origin:?} -> {destination:?}");

        let start = self.resolve(origin).await?;
        let end = self.resolve(destination).await?;

        let encoded = self.routing.driving_routes(start, end).await?;
        if encoded.is_empty() {
            return Err(PlanError::NoRoutes);
        }
        tracing::info!("routing provider returned {} alternatives", encoded.len());

        let paths = encoded
            .iter()
            .map(|route| decode_polyline(&route.polyline))
            .collect::<Result<Vec<_>, _>>()?;

        let ranking = self.scorer.rank_routes(&paths, start, end, now).await?;
        tracing::info!(
            "route {} wins with total AQI {}",
            ranking.best_index,
            ranking.scores[ranking.best_index].total_aqi
        );

        Ok(RoutePlanResponse {
            polyline: encoded.into_iter().map(|route| route.polyline).collect(),
            aqi_points: ranking
                .scores
                .iter()
                .flat_map(|score| score.waypoints.iter().cloned())
                .collect(),
            routes: ranking.scores,
            best_aqi_path_index: ranking.best_index,
            debug_mode: self.debug,
        })
    }

    async fn resolve(&self, address: &str) -> Result<Coordinate, PlanError> {
        self.geocoder
            .geocode(address)
            .await?
            .ok_or_else(|| PlanError::Geocoding {
                address: address.to_string(),
            })
    }
}
