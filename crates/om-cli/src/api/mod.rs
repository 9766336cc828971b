//! Request boundary: authorize the caller, run one store operation, and turn
//! the outcome into a `{data, message}` envelope with a status code.
//!
//! Each operation declares its [`Access`] policy. Read operations need any
//! member of the project's organization; every write needs an admin of it.

pub mod error;
pub mod request;


use std::sync::Arc;

use om_auth::password::verify_password;
use om_auth::{Access, AuthContext, AuthError, Guard, SessionCache};
use om_core::entities::{BoundaryPartner, Challenge, NewProject, ProgressMarker, Project, Strategy};
use om_core::responses::{MESSAGE_LOGIN_SUCCESS, MESSAGE_SUCCESS, Response};
use om_db::OmService;
use serde::Serialize;
use serde_json::Value;

pub use error::ApiError;
pub use request::{Operation, Reply, Request};

pub struct Api {
    service: Arc<OmService>,
    guard: Guard,
    secret: String,
}

impl Api {
    #[must_use]
    pub fn new(service: Arc<OmService>, sessions: Arc<SessionCache>, secret: String) -> Self {
        Self {
            service,
            guard: Guard::new(sessions),
            secret,
        }
    }

    /// Decode and answer one request line. Never fails: every outcome is a reply.
    pub async fn handle_line(&self, line: &str) -> Reply {
        match Request::parse_line(line) {
            Ok(request) => self.handle(request).await,
            Err(reply) => {
                tracing::warn!(status = reply.status, message = %reply.message, "rejected request line");
                reply
            }
        }
    }

    pub async fn handle(&self, request: Request) -> Reply {
        let Request {
            id,
            api_key,
            operation,
        } = request;
        let op = operation.name();

        match self.execute(api_key.as_deref(), operation).await {
            Ok(response) => {
                tracing::debug!(request_id = ?id, op, "request succeeded");
                Reply::from_response(id, response)
            }
            Err(error) => {
                let status = error.status();
                if status.code() >= 500 {
                    tracing::error!(request_id = ?id, op, %error, "request failed");
                } else {
                    tracing::warn!(request_id = ?id, op, %status, %error, "request rejected");
                }
                Reply::from_error(id, &error)
            }
        }
    }

    async fn execute(
        &self,
        key: Option<&str>,
        operation: Operation,
    ) -> Result<Response<Value>, ApiError> {
        match operation {
            Operation::Login { email, password } => {
                let api_key = self.login(&email, &password).await?;
                Ok(Response::ok_with_message(
                    Some(Value::String(api_key)),
                    MESSAGE_LOGIN_SUCCESS,
                ))
            }
            Operation::ListProjects => success(self.list_projects(key).await?),
            Operation::AddProject { project } => success(self.add_project(key, &project).await?),
            Operation::DeleteProject { project_id } => {
                self.delete_project(key, &project_id).await?;
                done()
            }
            Operation::AddBoundaryPartner {
                project_id,
                partner_name,
            } => success(
                self.add_boundary_partner(key, &project_id, &partner_name)
                    .await?,
            ),
            Operation::GetBoundaryPartner {
                project_id,
                boundary_partner_id,
            } => success(
                self.get_boundary_partner(key, &project_id, &boundary_partner_id)
                    .await?,
            ),
            Operation::DeleteBoundaryPartner {
                project_id,
                boundary_partner_id,
            } => {
                self.delete_boundary_partner(key, &project_id, &boundary_partner_id)
                    .await?;
                done()
            }
            Operation::AddProgressMarker {
                project_id,
                boundary_partner_id,
                title,
                kind,
            } => success(
                self.add_progress_marker(key, &project_id, &boundary_partner_id, &title, kind)
                    .await?,
            ),
            Operation::MoveProgressMarker {
                project_id,
                progress_marker_id,
                order_number,
                title,
                kind,
            } => {
                self.move_progress_marker(
                    key,
                    &project_id,
                    &progress_marker_id,
                    order_number,
                    title.as_deref(),
                    kind,
                )
                .await?;
                done()
            }
            Operation::DeleteProgressMarker {
                project_id,
                progress_marker_id,
            } => {
                self.delete_progress_marker(key, &project_id, &progress_marker_id)
                    .await?;
                done()
            }
            Operation::AddChallenge {
                project_id,
                progress_marker_id,
                challenge_name,
            } => success(
                self.add_challenge(key, &project_id, &progress_marker_id, &challenge_name)
                    .await?,
            ),
            Operation::DeleteChallenge {
                project_id,
                challenge_id,
            } => {
                self.delete_challenge(key, &project_id, &challenge_id)
                    .await?;
                done()
            }
            Operation::AddStrategy {
                project_id,
                progress_marker_id,
                strategy_name,
            } => success(
                self.add_strategy(key, &project_id, &progress_marker_id, &strategy_name)
                    .await?,
            ),
            Operation::DeleteStrategy {
                project_id,
                strategy_id,
            } => {
                self.delete_strategy(key, &project_id, &strategy_id).await?;
                done()
            }
        }
    }

    async fn authorize(&self, api_key: Option<&str>, access: Access) -> Result<AuthContext, ApiError> {
        Ok(self
            .guard
            .authorize(&*self.service, api_key, access)
            .await?)
    }

    /// Verify a password and bind the user's API key in the session cache.
    ///
    /// An unknown email and a wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let credentials = self
            .service
            .find_credentials_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, &credentials.password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }
        let api_key = self
            .guard
            .sessions()
            .issue(&self.secret, &credentials.user_id)?;
        tracing::info!(user_id = %credentials.user_id, "login");
        Ok(api_key)
    }

    pub async fn list_projects(&self, api_key: Option<&str>) -> Result<Vec<Project>, ApiError> {
        let ctx = self.authorize(api_key, Access::member()).await?;
        Ok(self.service.list_projects(ctx.organization_id()).await?)
    }

    pub async fn add_project(
        &self,
        api_key: Option<&str>,
        project: &NewProject,
    ) -> Result<Project, ApiError> {
        let ctx = self.authorize(api_key, Access::admin()).await?;
        Ok(self
            .service
            .create_project(ctx.organization_id(), project)
            .await?)
    }

    pub async fn delete_project(&self, api_key: Option<&str>, project_id: &str) -> Result<(), ApiError> {
        self.authorize(api_key, Access::admin_of(project_id)).await?;
        Ok(self.service.delete_project(project_id).await?)
    }

    pub async fn add_boundary_partner(
        &self,
        api_key: Option<&str>,
        project_id: &str,
        partner_name: &str,
    ) -> Result<BoundaryPartner, ApiError> {
        self.authorize(api_key, Access::admin_of(project_id)).await?;
        Ok(self
            .service
            .create_boundary_partner(project_id, partner_name)
            .await?)
    }

    pub async fn get_boundary_partner(
        &self,
        api_key: Option<&str>,
        project_id: &str,
        partner_id: &str,
    ) -> Result<BoundaryPartner, ApiError> {
        self.authorize(api_key, Access::project(project_id)).await?;
        Ok(self
            .service
            .get_boundary_partner(project_id, partner_id)
            .await?)
    }

    pub async fn delete_boundary_partner(
        &self,
        api_key: Option<&str>,
        project_id: &str,
        partner_id: &str,
    ) -> Result<(), ApiError> {
        self.authorize(api_key, Access::admin_of(project_id)).await?;
        Ok(self
            .service
            .delete_boundary_partner(project_id, partner_id)
            .await?)
    }

    pub async fn add_progress_marker(
        &self,
        api_key: Option<&str>,
        project_id: &str,
        partner_id: &str,
        title: &str,
        kind: i64,
    ) -> Result<ProgressMarker, ApiError> {
        self.authorize(api_key, Access::admin_of(project_id)).await?;
        Ok(self
            .service
            .add_progress_marker(project_id, partner_id, title, kind)
            .await?)
    }

    pub async fn move_progress_marker(
        &self,
        api_key: Option<&str>,
        project_id: &str,
        marker_id: &str,
        order_number: u32,
        title: Option<&str>,
        kind: Option<i64>,
    ) -> Result<(), ApiError> {
        self.authorize(api_key, Access::admin_of(project_id)).await?;
        Ok(self
            .service
            .move_progress_marker(project_id, marker_id, order_number, title, kind)
            .await?)
    }

    pub async fn delete_progress_marker(
        &self,
        api_key: Option<&str>,
        project_id: &str,
        marker_id: &str,
    ) -> Result<(), ApiError> {
        self.authorize(api_key, Access::admin_of(project_id)).await?;
        Ok(self
            .service
            .delete_progress_marker(project_id, marker_id)
            .await?)
    }

    pub async fn add_challenge(
        &self,
        api_key: Option<&str>,
        project_id: &str,
        marker_id: &str,
        challenge_name: &str,
    ) -> Result<Challenge, ApiError> {
        self.authorize(api_key, Access::admin_of(project_id)).await?;
        Ok(self
            .service
            .add_challenge(project_id, marker_id, challenge_name)
            .await?)
    }

    pub async fn delete_challenge(
        &self,
        api_key: Option<&str>,
        project_id: &str,
        challenge_id: &str,
    ) -> Result<(), ApiError> {
        self.authorize(api_key, Access::admin_of(project_id)).await?;
        Ok(self
            .service
            .delete_challenge(project_id, challenge_id)
            .await?)
    }

    pub async fn add_strategy(
        &self,
        api_key: Option<&str>,
        project_id: &str,
        marker_id: &str,
        strategy_name: &str,
    ) -> Result<Strategy, ApiError> {
        self.authorize(api_key, Access::admin_of(project_id)).await?;
        Ok(self
            .service
            .add_strategy(project_id, marker_id, strategy_name)
            .await?)
    }

    pub async fn delete_strategy(
        &self,
        api_key: Option<&str>,
        project_id: &str,
        strategy_id: &str,
    ) -> Result<(), ApiError> {
        self.authorize(api_key, Access::admin_of(project_id)).await?;
        Ok(self
            .service
            .delete_strategy(project_id, strategy_id)
            .await?)
    }
}

fn success<T: Serialize>(data: T) -> Result<Response<Value>, ApiError> {
    Ok(Response::ok(serde_json::to_value(data)?))
}

fn done() -> Result<Response<Value>, ApiError> {
    Ok(Response::ok_with_message(None, MESSAGE_SUCCESS))
}
