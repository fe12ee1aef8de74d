use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, OriginalUri, Path, Query},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use fitclub_club::WriteMode;
use fitclub_core::MemberId;

use crate::app::dto::{self, MemberPayload, MembershipPayload};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

use super::common::{created, list_response, no_content, parse_id, route_both};

pub fn router() -> Router {
    let router = Router::new();
    let router = route_both(router, "/members", get(list_members).post(create_member));
    let router = route_both(
        router,
        "/members/:id",
        get(get_member)
            .put(replace_member)
            .patch(patch_member)
            .delete(delete_member),
    );
    route_both(router, "/members/:id/memberships", get(member_memberships))
}

pub async fn list_members(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<HashMap<String, String>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, ApiError> {
    let items = services
        .list_members()
        .await?
        .iter()
        .map(MemberPayload::from)
        .collect::<Vec<_>>();
    list_response(items, services.page_size, &params, &uri)
}

pub async fn get_member(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: MemberId = parse_id(&id)?;
    let member = services.get_member(id).await?;
    Ok(Json(MemberPayload::from(&member)).into_response())
}

pub async fn create_member(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let (input, errors) = dto::members::read_member(&body)?;
    let member = services.create_member(input, errors).await?;
    tracing::info!(member_id = %member.id, "member created");
    Ok(created(MemberPayload::from(&member)))
}

pub async fn replace_member(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    update_member(services, id, body, WriteMode::Replace).await
}

pub async fn patch_member(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    update_member(services, id, body, WriteMode::Patch).await
}

pub async fn delete_member(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: MemberId = parse_id(&id)?;
    services.delete_member(id).await?;
    tracing::info!(member_id = %id, "member deleted with its memberships");
    Ok(no_content())
}

/// Every membership of one member; never paginated.
pub async fn member_memberships(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: MemberId = parse_id(&id)?;
    let items = services
        .member_memberships(id)
        .await?
        .iter()
        .map(MembershipPayload::from)
        .collect::<Vec<_>>();
    Ok(Json(items).into_response())
}

async fn update_member(
    services: Arc<AppServices>,
    id: String,
    body: Bytes,
    mode: WriteMode,
) -> Result<Response, ApiError> {
    let id: MemberId = parse_id(&id)?;
    let (input, errors) = dto::members::read_member(&body)?;
    let member = services.update_member(id, input, errors, mode).await?;
    Ok(Json(MemberPayload::from(&member)).into_response())
}
