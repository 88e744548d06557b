use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::api_key::{self, API_KEY_HEADER, Unauthorized};
use crate::error::AppError;
use crate::state::SharedState;

/// Proof that the request carried the configured `x-api-key`.
///
/// Put it before any body extractor so unauthenticated requests are rejected
/// without reading the body.
#[derive(Debug, Clone, Copy)]
pub struct ApiKey;

impl FromRequestParts<SharedState> for ApiKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        api_key::authorize(state.config.api_key.as_deref(), provided).map_err(|reason| {
            if reason == Unauthorized::NotConfigured {
                tracing::warn!("Rejected {} {}: {reason}", parts.method, parts.uri.path());
            }
            AppError::from(reason)
        })?;

        Ok(ApiKey)
    }
}
