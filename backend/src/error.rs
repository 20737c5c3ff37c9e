use thiserror::Error;

use crate::geo::PolylineError;

/// Failure of a single call to an external collaborator.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{provider} returned status {status}: {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },
    #[error("{provider} returned a malformed payload: {message}")]
    Malformed {
        provider: &'static str,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("could not geocode address {address:?}")]
    Geocoding { address: String },
    #[error("no driving routes found between origin and destination")]
    NoRoutes,
    #[error("upstream provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("invalid route polyline: {0}")]
    Polyline(#[from] PolylineError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}
