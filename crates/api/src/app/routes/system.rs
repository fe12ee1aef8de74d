use axum::{extract::Extension, http::StatusCode, Json};

use crate::app::dto::UserPayload;
use crate::context::AuthenticatedUser;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(user): Extension<AuthenticatedUser>) -> Json<UserPayload> {
    Json(UserPayload::from(user.profile()))
}
