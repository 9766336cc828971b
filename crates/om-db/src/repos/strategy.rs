//! Strategy repository.

use om_core::entities::Strategy;
use om_core::ids::PREFIX_STRATEGY;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::now_timestamp;
use crate::service::OmService;

impl OmService {
    /// Attach a strategy to a marker reached through `project_id`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank name, or
    /// `DatabaseError::NotFound` if the marker does not exist under `project_id`.
    pub async fn add_strategy(
        &self,
        project_id: &str,
        marker_id: &str,
        strategy_name: &str,
    ) -> Result<Strategy, DatabaseError> {
        if strategy_name.trim().is_empty() {
            return Err(DatabaseError::Validation(
                "strategy_name must not be empty".into(),
            ));
        }

        let conn = self.db().conn().await?;
        let strategy_id = generate_id(&conn, PREFIX_STRATEGY).await?;
        let inserted = conn
            .execute(
                "INSERT INTO strategies (strategy_id, progress_marker_id, strategy_name, created_at)
                 SELECT ?1, pm.progress_marker_id, ?2, ?3
                 FROM progress_markers pm
                 JOIN boundary_partners bp ON bp.boundary_partner_id = pm.boundary_partner_id
                 WHERE pm.progress_marker_id = ?4 AND bp.project_id = ?5",
                libsql::params![
                    strategy_id.as_str(),
                    strategy_name,
                    now_timestamp(),
                    marker_id,
                    project_id
                ],
            )
            .await?;
        if inserted == 0 {
            return Err(DatabaseError::not_found("progress marker", marker_id));
        }

        Ok(Strategy {
            strategy_id,
            progress_marker_id: marker_id.to_string(),
            strategy_name: strategy_name.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the strategy does not exist under `project_id`.
    pub async fn delete_strategy(
        &self,
        project_id: &str,
        strategy_id: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.db().conn().await?;
        let deleted = conn
            .execute(
                "DELETE FROM strategies
                 WHERE strategy_id = ?1
                   AND progress_marker_id IN (
                     SELECT pm.progress_marker_id
                     FROM progress_markers pm
                     JOIN boundary_partners bp ON bp.boundary_partner_id = pm.boundary_partner_id
                     WHERE bp.project_id = ?2)",
                [strategy_id, project_id],
            )
            .await?;
        if deleted == 0 {
            return Err(DatabaseError::not_found("strategy", strategy_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::error::DatabaseError;
    use crate::test_support::helpers::{seed_markers, seed_partner, seed_project, test_service};

    #[tokio::test]
    async fn add_and_delete_strategy() {
        let svc = test_service().await;
        let (project_id, partner_id) = seed_partner(&svc, "org-1").await;
        let markers = seed_markers(&svc, &project_id, &partner_id, 1).await;

        let strategy = svc
            .add_strategy(&project_id, &markers[0], "Share meeting minutes")
            .await
            .unwrap();
        assert!(strategy.strategy_id.starts_with("stg-"));
        assert_eq!(strategy.progress_marker_id, markers[0]);

        let bp = svc.get_boundary_partner(&project_id, &partner_id).await.unwrap();
        assert_eq!(bp.progress_markers[0].strategies, vec![strategy.clone()]);

        svc.delete_strategy(&project_id, &strategy.strategy_id)
            .await
            .unwrap();
        let bp = svc.get_boundary_partner(&project_id, &partner_id).await.unwrap();
        assert!(bp.progress_markers[0].strategies.is_empty());
    }

    #[tokio::test]
    async fn strategy_scoped_to_project() {
        let svc = test_service().await;
        let (project_id, partner_id) = seed_partner(&svc, "org-1").await;
        let other = seed_project(&svc, "org-1").await;
        let markers = seed_markers(&svc, &project_id, &partner_id, 1).await;

        let result = svc.add_strategy(&other, &markers[0], "s").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));

        let strategy = svc.add_strategy(&project_id, &markers[0], "s").await.unwrap();
        let result = svc.delete_strategy(&other, &strategy.strategy_id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn blank_strategy_name_is_rejected() {
        let svc = test_service().await;
        let (project_id, partner_id) = seed_partner(&svc, "org-1").await;
        let markers = seed_markers(&svc, &project_id, &partner_id, 1).await;
        let result = svc.add_strategy(&project_id, &markers[0], "").await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }
}
