//! Caller identity for control-service operations

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{L2gwError, L2gwResult};

/// Kind of access being requested, used in the admin-check message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Get,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Create => "CREATE",
            Action::Update => "UPDATE",
            Action::Get => "GET",
            Action::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// Identity of the caller, resolved by the (external) authentication layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Tenant the caller acts for
    pub tenant_id: String,
    /// Whether the caller holds the administrator role
    pub is_admin: bool,
}

impl RequestContext {
    /// Administrator context for the given tenant
    pub fn admin(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            is_admin: true,
        }
    }

    /// Regular (non-admin) tenant context
    pub fn tenant(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            is_admin: false,
        }
    }

    /// Fail with `AdminRequired` unless the caller is an administrator.
    ///
    /// Every control-service operation calls this before any other check.
    pub fn check_admin(&self, action: Action) -> L2gwResult<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(L2gwError::AdminRequired(format!(
                "Cannot {} resource for non admin tenant",
                action
            )))
        }
    }

    /// Tenant that owns a resource created by this caller.
    ///
    /// Administrators may create on behalf of another tenant.
    pub fn tenant_for_create(&self, requested: Option<&str>) -> String {
        match requested {
            Some(tenant) if self.is_admin && !tenant.is_empty() => tenant.to_string(),
            _ => self.tenant_id.clone(),
        }
    }
}
