use std::collections::HashMap;

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::MethodRouter,
    Json, Router,
};
use core::str::FromStr;
use serde::Serialize;

use fitclub_core::DomainError;

use crate::app::dto;
use crate::app::errors::ApiError;

/// Register `path` both with and without a trailing slash.
pub fn route_both(router: Router, path: &str, method: MethodRouter) -> Router {
    router
        .route(path, method.clone())
        .route(&format!("{path}/"), method)
}

/// Path ids that don't parse are indistinguishable from unknown ones.
pub fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    Ok(raw.parse::<T>()?)
}

/// Serialize a list, paginated when a page size is configured.
pub fn list_response<T: Serialize>(
    items: Vec<T>,
    page_size: Option<usize>,
    params: &HashMap<String, String>,
    uri: &Uri,
) -> Result<Response, ApiError> {
    let Some(page_size) = page_size else {
        return Ok(Json(items).into_response());
    };
    let page = dto::paginate(
        items,
        page_size,
        params.get("page").map(String::as_str),
        uri.path(),
        uri.query(),
    )?;
    Ok(Json(page).into_response())
}

pub fn created<T: Serialize>(body: T) -> Response {
    (StatusCode::CREATED, Json(body)).into_response()
}

pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
