use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, OriginalUri, Path, Query},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use fitclub_club::{TrainerFilter, WriteMode};
use fitclub_core::TrainerId;

use crate::app::dto::{self, TrainerPayload};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

use super::common::{created, list_response, no_content, parse_id, route_both};

pub fn router() -> Router {
    let router = Router::new();
    let router = route_both(router, "/trainers", get(list_trainers).post(create_trainer));
    route_both(
        router,
        "/trainers/:id",
        get(get_trainer)
            .put(replace_trainer)
            .patch(patch_trainer)
            .delete(delete_trainer),
    )
}

pub async fn list_trainers(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<HashMap<String, String>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, ApiError> {
    let query = dto::QueryParams::new(&params);
    let filter = TrainerFilter {
        specialization: query.raw("specialization"),
    };
    query.finish()?;

    let items = services
        .list_trainers(&filter)
        .await?
        .iter()
        .map(TrainerPayload::from)
        .collect::<Vec<_>>();
    list_response(items, services.page_size, &params, &uri)
}

pub async fn get_trainer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: TrainerId = parse_id(&id)?;
    let trainer = services.get_trainer(id).await?;
    Ok(Json(TrainerPayload::from(&trainer)).into_response())
}

pub async fn create_trainer(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let (input, errors) = dto::trainers::read_trainer(&body)?;
    let trainer = services.create_trainer(input, errors).await?;
    tracing::info!(trainer_id = %trainer.id, "trainer created");
    Ok(created(TrainerPayload::from(&trainer)))
}

pub async fn replace_trainer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    update_trainer(services, id, body, WriteMode::Replace).await
}

pub async fn patch_trainer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    update_trainer(services, id, body, WriteMode::Patch).await
}

pub async fn delete_trainer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id: TrainerId = parse_id(&id)?;
    services.delete_trainer(id).await?;
    tracing::info!(trainer_id = %id, "trainer deleted");
    Ok(no_content())
}

async fn update_trainer(
    services: Arc<AppServices>,
    id: String,
    body: Bytes,
    mode: WriteMode,
) -> Result<Response, ApiError> {
    let id: TrainerId = parse_id(&id)?;
    let (input, errors) = dto::trainers::read_trainer(&body)?;
    let trainer = services.update_trainer(id, input, errors, mode).await?;
    Ok(Json(TrainerPayload::from(&trainer)).into_response())
}
