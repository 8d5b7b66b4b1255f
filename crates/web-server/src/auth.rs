use axum::{
    Json, async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use core_types::UserRole;
use serde_json::json;

/// Name of the role header injected by the upstream auth gateway once it has
/// validated the caller's session. Authorization itself (sessions, tokens)
/// lives entirely outside this service.
const ROLE_HEADER: &str = "x-user-role";

/// Extractor that rejects any request not carrying the admin role.
///
/// # Usage
///
/// ```rust,ignore
/// async fn admin_only_handler(_admin: RequireAdmin) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing role header")]
    MissingRole,
    #[error("Unknown role")]
    UnknownRole,
    #[error("Admin role required")]
    Forbidden,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::MissingRole | AuthError::UnknownRole => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
        };
        let body = Json(json!({ "success": false, "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingRole)?;

        let role: UserRole = raw.parse().map_err(|_| AuthError::UnknownRole)?;
        if role != UserRole::Admin {
            return Err(AuthError::Forbidden);
        }

        Ok(RequireAdmin)
    }
}
