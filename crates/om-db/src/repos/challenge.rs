//! Challenge repository.

use om_core::entities::Challenge;
use om_core::ids::PREFIX_CHALLENGE;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::now_timestamp;
use crate::service::OmService;

impl OmService {
    /// Attach a challenge to a marker reached through `project_id`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank name, or
    /// `DatabaseError::NotFound` if the marker does not exist under `project_id`.
    pub async fn add_challenge(
        &self,
        project_id: &str,
        marker_id: &str,
        challenge_name: &str,
    ) -> Result<Challenge, DatabaseError> {
        if challenge_name.trim().is_empty() {
            return Err(DatabaseError::Validation(
                "challenge_name must not be empty".into(),
            ));
        }

        let conn = self.db().conn().await?;
        let challenge_id = generate_id(&conn, PREFIX_CHALLENGE).await?;
        let inserted = conn
            .execute(
                "INSERT INTO challenges (challenge_id, progress_marker_id, challenge_name, created_at)
                 SELECT ?1, pm.progress_marker_id, ?2, ?3
                 FROM progress_markers pm
                 JOIN boundary_partners bp ON bp.boundary_partner_id = pm.boundary_partner_id
                 WHERE pm.progress_marker_id = ?4 AND bp.project_id = ?5",
                libsql::params![
                    challenge_id.as_str(),
                    challenge_name,
                    now_timestamp(),
                    marker_id,
                    project_id
                ],
            )
            .await?;
        if inserted == 0 {
            return Err(DatabaseError::not_found("progress marker", marker_id));
        }

        Ok(Challenge {
            challenge_id,
            progress_marker_id: marker_id.to_string(),
            challenge_name: challenge_name.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the challenge does not exist under `project_id`.
    pub async fn delete_challenge(
        &self,
        project_id: &str,
        challenge_id: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.db().conn().await?;
        let deleted = conn
            .execute(
                "DELETE FROM challenges
                 WHERE challenge_id = ?1
                   AND progress_marker_id IN (
                     SELECT pm.progress_marker_id
                     FROM progress_markers pm
                     JOIN boundary_partners bp ON bp.boundary_partner_id = pm.boundary_partner_id
                     WHERE bp.project_id = ?2)",
                [challenge_id, project_id],
            )
            .await?;
        if deleted == 0 {
            return Err(DatabaseError::not_found("challenge", challenge_id));
        }
        Ok(())
    }
}
