//! User repository: seeding, lookup, credential lookup for login.

use om_auth::{AuthError, Directory};
use om_core::entities::User;
use om_core::ids::PREFIX_USER;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{get_bool, now_timestamp};
use crate::service::OmService;

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        user_id: row.get::<String>(0)?,
        organization_id: row.get::<String>(1)?,
        full_name: row.get::<String>(2)?,
        is_admin: get_bool(row, 3)?,
    })
}

/// Stored login credentials for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub password_hash: String,
}

impl OmService {
    /// Create a user. `password_hash` must already be hashed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for an empty email, or
    /// `DatabaseError::Conflict` if the email is already registered.
    pub async fn create_user(
        &self,
        organization_id: &str,
        email: &str,
        full_name: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User, DatabaseError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(DatabaseError::Validation("email must not be empty".into()));
        }

        let conn = self.db().conn().await?;
        if find_user_id_by_email(&conn, &email).await?.is_some() {
            return Err(DatabaseError::Conflict(format!(
                "email already registered: {email}"
            )));
        }

        let user_id = generate_id(&conn, PREFIX_USER).await?;
        conn.execute(
            "INSERT INTO users (user_id, organization_id, email, password_hash, full_name, is_admin, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            libsql::params![
                user_id.as_str(),
                organization_id,
                email.as_str(),
                password_hash,
                full_name,
                i64::from(is_admin),
                now_timestamp()
            ],
        )
        .await?;
        tracing::debug!(%user_id, organization_id, "user created");

        Ok(User {
            user_id,
            organization_id: organization_id.to_string(),
            full_name: full_name.to_string(),
            is_admin,
        })
    }

    /// Current record for `user_id`, or `None` if it does not exist.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, DatabaseError> {
        let conn = self.db().conn().await?;
        let mut rows = conn
            .query(
                "SELECT user_id, organization_id, full_name, is_admin FROM users WHERE user_id = ?1",
                [user_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Credentials for `email`, compared case-insensitively.
    pub async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Credentials>, DatabaseError> {
        let conn = self.db().conn().await?;
        let mut rows = conn
            .query(
                "SELECT user_id, password_hash FROM users WHERE lower(email) = lower(?1)",
                [email.trim()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Credentials {
                user_id: row.get::<String>(0)?,
                password_hash: row.get::<String>(1)?,
            })),
            None => Ok(None),
        }
    }

    /// Set or clear the admin flag.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the user does not exist.
    pub async fn set_user_admin(&self, user_id: &str, is_admin: bool) -> Result<(), DatabaseError> {
        let conn = self.db().conn().await?;
        let changed = conn
            .execute(
                "UPDATE users SET is_admin = ?1 WHERE user_id = ?2",
                libsql::params![i64::from(is_admin), user_id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::not_found("user", user_id));
        }
        Ok(())
    }
}

async fn find_user_id_by_email(
    conn: &libsql::Connection,
    email: &str,
) -> Result<Option<String>, DatabaseError> {
    let mut rows = conn
        .query("SELECT user_id FROM users WHERE lower(email) = ?1", [email])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row.get::<String>(0)?)),
        None => Ok(None),
    }
}

impl Directory for OmService {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AuthError> {
        Self::get_user(self, user_id)
            .await
            .map_err(|e| AuthError::Directory(e.to_string()))
    }

    async fn project_organization(&self, project_id: &str) -> Result<Option<String>, AuthError> {
        Self::project_organization(self, project_id)
            .await
            .map_err(|e| AuthError::Directory(e.to_string()))
    }
}
