use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Extension,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use crate::app::dto::accounts::{read_credentials, read_token};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

use super::common::route_both;

pub fn router() -> Router {
    let router = Router::new();
    let router = route_both(router, "/auth/token", post(obtain_pair));
    let router = route_both(router, "/auth/token/refresh", post(refresh));
    route_both(router, "/auth/token/verify", post(verify))
}

pub async fn obtain_pair(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let credentials = read_credentials(&body)?;
    let pair = services
        .obtain_token_pair(&credentials.username, credentials.password)
        .await?;
    tracing::info!(username = %credentials.username, "issued token pair");
    Ok(Json(pair).into_response())
}

pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let token = read_token(&body, "refresh")?;
    let access = services.refresh_access(&token)?;
    Ok(Json(json!({ "access": access })).into_response())
}

pub async fn verify(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let token = read_token(&body, "token")?;
    services.verify_token(&token)?;
    Ok(Json(json!({})).into_response())
}
