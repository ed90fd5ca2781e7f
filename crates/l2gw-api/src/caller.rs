//! Caller identity extractor
//!
//! Authentication happens upstream; the proxy in front of this service
//! forwards the resolved identity as headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use l2gw_core::RequestContext;

use crate::error::ApiError;

/// Header naming the caller's tenant
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Comma-separated role list; `admin` grants administrator access
pub const ROLES_HEADER: &str = "x-roles";

const ADMIN_ROLE: &str = "admin";

/// Resolved caller for a request
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant_id = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", TENANT_HEADER)))?;

        let is_admin = parts
            .headers
            .get_all(ROLES_HEADER)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .any(|role| role.trim().eq_ignore_ascii_case(ADMIN_ROLE));

        Ok(Caller(RequestContext {
            tenant_id: tenant_id.to_string(),
            is_admin,
        }))
    }
}
