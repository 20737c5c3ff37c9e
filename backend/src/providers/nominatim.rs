use async_trait::async_trait;
use serde::Deserialize;

use super::{Geocoder, read_json};
use crate::error::ProviderError;
use crate::models::Coordinate;

const PROVIDER: &str = "nominatim";

pub struct NominatimParams {
    pub base_url: String,
    pub user_agent: String,
}

/// OpenStreetMap Nominatim search client.
pub struct NominatimGeocoder {
    params: NominatimParams,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(client: reqwest::Client, params: NominatimParams) -> Self {
        Self { params, client }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ProviderError> {
        let url = format!("{}/search", self.params.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, self.params.user_agent.as_str())
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let places: Vec<Place> = read_json(PROVIDER, response).await?;
        first_place(&places)
    }
}

fn first_place(places: &[Place]) -> Result<Option<Coordinate>, ProviderError> {
    let Some(place) = places.first() else {
        return Ok(None);
    };
    let parse = |raw: &str| {
        raw.parse::<f64>().map_err(|_| ProviderError::Malformed {
            provider: PROVIDER,
            message: format!("non-numeric coordinate {raw:?}"),
        })
    };
    Ok(Some(Coordinate {
        lat: parse(&place.lat)?,
        lon: parse(&place.lon)?,
    }))
}
