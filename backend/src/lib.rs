pub mod aqi;
pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod planner;
pub mod providers;
pub mod sampling;
pub mod scoring;
pub mod stations;

use std::sync::Arc;

use axum::{
    Json, Router, async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request, State},
    http::{StatusCode, request::Parts},
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::PlanError;
use crate::models::{ApiError, RoutePlanRequest, RoutePlanResponse};
use crate::planner::RoutePlanner;

#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<RoutePlanner>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/get_route", get(get_route_handler))
        .route("/api/route", post(route_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

type ApiRejection = (StatusCode, Json<ApiError>);

/// [`Query`] that rejects with an [`ApiError`] body instead of plain text.
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(bad_request(rejection.status(), rejection.body_text())),
        }
    }
}

/// [`Json`] that rejects with an [`ApiError`] body instead of plain text.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(bad_request(rejection.status(), rejection.body_text())),
        }
    }
}

fn bad_request(status: StatusCode, error: String) -> ApiRejection {
    tracing::warn!("rejected request: {error}");
    (status, Json(ApiError { error }))
}

/// GET /get_route?origin=..&destination=..
async fn get_route_handler(
    State(state): State<AppState>,
    ApiQuery(req): ApiQuery<RoutePlanRequest>,
) -> Result<Json<RoutePlanResponse>, ApiRejection> {
    plan(&state, &req).await
}

/// POST /api/route
async fn route_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RoutePlanRequest>,
) -> Result<Json<RoutePlanResponse>, ApiRejection> {
    plan(&state, &req).await
}

async fn plan(
    state: &AppState,
    req: &RoutePlanRequest,
) -> Result<Json<RoutePlanResponse>, ApiRejection> {
    state
        .planner
        .plan_route(&req.origin, &req.destination)
        .await
        .map(Json)
        .map_err(plan_error_response)
}

fn plan_error_response(err: PlanError) -> ApiRejection {
    let status = match err {
        PlanError::Geocoding { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PlanError::NoRoutes => StatusCode::NOT_FOUND,
        PlanError::Provider(_) | PlanError::Polyline(_) => StatusCode::BAD_GATEWAY,
    };
    if status.is_server_error() {
        tracing::error!("route planning failed: {err}");
    } else {
        tracing::warn!("route planning rejected: {err}");
    }

    (
        status,
        Json(ApiError {
            error: err.to_string(),
        }),
    )
}
