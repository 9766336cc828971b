//! Request authorization: API key → session → fresh user record → access policy.
//!
//! The user record is looked up on every request, never cached with the
//! session, so admin or organization changes take effect immediately. Failure
//! ordering follows the request path:
//!
//! 1. missing or unknown key, or a session whose user is gone: `NotAuthenticated`
//! 2. non-admin caller on an admin operation: `PermissionDenied`
//! 3. unknown project: `NotFound`
//! 4. project of another organization: `PermissionDenied`
//!
//! A foreign project is reported as denied, not missing.

use std::future::Future;
use std::sync::Arc;

use om_core::entities::User;

use crate::error::AuthError;
use crate::session::SessionCache;

/// Lookups the guard needs from the store.
pub trait Directory: Send + Sync {
    /// Current user record, or `None` if the user no longer exists.
    fn get_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<User>, AuthError>> + Send;

    /// Organization owning `project_id`, or `None` if the project does not exist.
    fn project_organization(
        &self,
        project_id: &str,
    ) -> impl Future<Output = Result<Option<String>, AuthError>> + Send;
}

/// What an operation is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// The caller's own organization (listing or creating projects).
    Caller,
    /// One project, which must belong to the caller's organization.
    Project(String),
}

/// Access policy for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Access {
    pub requires_admin: bool,
    pub scope: Scope,
}

impl Access {
    /// Any authenticated member of the caller's organization.
    #[must_use]
    pub const fn member() -> Self {
        Self {
            requires_admin: false,
            scope: Scope::Caller,
        }
    }

    /// An admin of the caller's organization.
    #[must_use]
    pub const fn admin() -> Self {
        Self {
            requires_admin: true,
            scope: Scope::Caller,
        }
    }

    /// Any member of the organization owning `project_id`.
    #[must_use]
    pub fn project(project_id: impl Into<String>) -> Self {
        Self {
            requires_admin: false,
            scope: Scope::Project(project_id.into()),
        }
    }

    /// An admin of the organization owning `project_id`.
    #[must_use]
    pub fn admin_of(project_id: impl Into<String>) -> Self {
        Self {
            requires_admin: true,
            scope: Scope::Project(project_id.into()),
        }
    }
}

/// The authenticated caller, handed to every downstream operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user: User,
    /// Set when the access check was scoped to a project.
    pub project_id: Option<String>,
}

impl AuthContext {
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user.user_id
    }

    #[must_use]
    pub fn organization_id(&self) -> &str {
        &self.user.organization_id
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.user.is_admin
    }
}

#[derive(Debug, Clone, Default)]
pub struct Guard {
    sessions: Arc<SessionCache>,
}

impl Guard {
    #[must_use]
    pub const fn new(sessions: Arc<SessionCache>) -> Self {
        Self { sessions }
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionCache {
        &self.sessions
    }

    /// Resolve an API key to the user id bound to it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` for a missing, empty or unknown key.
    pub fn verify_api_key(&self, api_key: Option<&str>) -> Result<String, AuthError> {
        match api_key {
            Some(key) if !key.is_empty() => {
                self.sessions.get(key).ok_or(AuthError::NotAuthenticated)
            }
            _ => Err(AuthError::NotAuthenticated),
        }
    }

    /// Resolve the caller and load their current user record.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` if the key is not bound or the
    /// user no longer exists, or `AuthError::Directory` if the lookup fails.
    pub async fn authenticate<D: Directory>(
        &self,
        directory: &D,
        api_key: Option<&str>,
    ) -> Result<AuthContext, AuthError> {
        let user_id = self.verify_api_key(api_key)?;
        let Some(user) = directory.get_user(&user_id).await? else {
            tracing::warn!(%user_id, "session refers to a user that no longer exists");
            return Err(AuthError::NotAuthenticated);
        };
        Ok(AuthContext {
            user,
            project_id: None,
        })
    }

    /// Authenticate the caller, then apply `access`.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated`, `PermissionDenied` or `NotFound` per the
    /// module-level ordering, or `Directory` if a lookup fails.
    pub async fn authorize<D: Directory>(
        &self,
        directory: &D,
        api_key: Option<&str>,
        access: Access,
    ) -> Result<AuthContext, AuthError> {
        let mut ctx = self.authenticate(directory, api_key).await?;

        if access.requires_admin && !ctx.is_admin() {
            tracing::debug!(user_id = ctx.user_id(), "admin access denied");
            return Err(AuthError::PermissionDenied);
        }

        if let Scope::Project(project_id) = access.scope {
            let organization = directory
                .project_organization(&project_id)
                .await?
                .ok_or_else(|| AuthError::NotFound {
                    entity_type: "project".into(),
                    id: project_id.clone(),
                })?;
            if organization != ctx.organization_id() {
                tracing::debug!(
                    user_id = ctx.user_id(),
                    %project_id,
                    "project belongs to another organization"
                );
                return Err(AuthError::PermissionDenied);
            }
            ctx.project_id = Some(project_id);
        }

        Ok(ctx)
    }
}
