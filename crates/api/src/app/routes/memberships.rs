use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, OriginalUri, Path, Query},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use fitclub_club::{MembershipFilter, WriteMode};
use fitclub_core::MembershipId;

use crate::app::dto::{self, MembershipListItem, MembershipPayload};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

use super::common::{created, list_response, no_content, parse_id, route_both};

pub fn router() -> Router {
    let router = Router::new();
    let router = route_both(
        router,
        "/memberships",
        get(list_memberships).post(create_membership),
    );
    let router = route_both(router, "/memberships/active", get(active_memberships));
    route_both(
        router,
        "/memberships/:id",
        get(get_membership)
            .put(replace_membership)
            .patch(patch_membership)
            .delete(delete_membership),
    )
}

fn read_filter(params: &HashMap<String, String>) -> Result<MembershipFilter, ApiError> {
    let mut query = dto::QueryParams::new(params);
    let filter = MembershipFilter {
        member_id: query.id("member_id"),
        trainer_id: query.id("trainer_id"),
        status: query.text("status"),
        membership_type: query.text("membership_type"),
        active_only: false,
    };
    query.finish()?;
    Ok(filter)
}

pub async fn list_memberships(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<HashMap<String, String>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, ApiError> {
    let filter = read_filter(&params)?;
    let items = services
        .list_memberships(&filter)
        .await?
        .iter()
        .map(MembershipListItem::from)
        .collect::<Vec<_>>();
    list_response(items, services.page_size, &params, &uri)
}

/// Same filters as the list, restricted to active memberships, full payload.
pub async fn active_memberships(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<HashMap<String, String>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, ApiError> {
    let filter = read_filter(&params)?.active();
    let items = services
        .list_memberships(&filter)
        .await?
        .iter()
        .map(MembershipPayload::from)
        .collect::<Vec<_>>();
    list_response(items, services.page_size, &params, &uri)
}

pub async fn get_membership(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: MembershipId = parse_id(&id)?;
    let membership = services.get_membership(id).await?;
    Ok(Json(MembershipPayload::from(&membership)).into_response())
}

pub async fn create_membership(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let (input, errors) = dto::memberships::read_membership(&body)?;
    let membership = services.create_membership(input, errors).await?;
    tracing::info!(
        membership_id = %membership.id,
        member_id = %membership.member.id,
        membership_type = membership.membership_type.as_str(),
        "membership created"
    );
    Ok(created(MembershipPayload::from(&membership)))
}

pub async fn replace_membership(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    update_membership(services, id, body, WriteMode::Replace).await
}

pub async fn patch_membership(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    update_membership(services, id, body, WriteMode::Patch).await
}

pub async fn delete_membership(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: MembershipId = parse_id(&id)?;
    services.delete_membership(id).await?;
    tracing::info!(membership_id = %id, "membership deleted");
    Ok(no_content())
}

async fn update_membership(
    services: Arc<AppServices>,
    id: String,
    body: Bytes,
    mode: WriteMode,
) -> Result<Response, ApiError> {
    let id: MembershipId = parse_id(&id)?;
    let (input, errors) = dto::memberships::read_membership(&body)?;
    let membership = services.update_membership(id, input, errors, mode).await?;
    Ok(Json(MembershipPayload::from(&membership)).into_response())
}
