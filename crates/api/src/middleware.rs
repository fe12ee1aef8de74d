use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use fitclub_auth::TokenService;
use fitclub_infra::ClubStore;

use crate::app::errors::ApiError;
use crate::context::AuthenticatedUser;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
    pub store: Arc<dyn ClubStore>,
}

/// Require a valid access token that belongs to an active account.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())?;

    let claims = state.tokens.validate_access(token).map_err(|e| {
        tracing::debug!(error = %e, "access token rejected");
        ApiError::bearer_not_valid()
    })?;
    let user_id = claims.user_id().map_err(|_| ApiError::bearer_not_valid())?;

    let account = state
        .store
        .get_user(user_id)
        .await?
        .ok_or_else(ApiError::user_not_found)?;
    if !account.is_active {
        return Err(ApiError::user_inactive());
    }

    req.extensions_mut()
        .insert(AuthenticatedUser::new(account.profile));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(ApiError::not_authenticated)?;

    let header = header.to_str().map_err(|_| ApiError::not_authenticated())?;

    // Any other scheme is treated as no credentials at all.
    let header = header
        .strip_prefix("Bearer ")
        .ok_or_else(ApiError::not_authenticated)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(ApiError::bearer_not_valid());
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn bearer_token_is_extracted() {
        let h = headers("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(&h).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_or_foreign_scheme_is_unauthenticated() {
        assert!(matches!(
            extract_bearer(&HeaderMap::new()),
            Err(ApiError::Unauthorized { .. })
        ));
        assert!(matches!(
            extract_bearer(&headers("Basic dXNlcjpwdw==")),
            Err(ApiError::Unauthorized { .. })
        ));
    }
}
