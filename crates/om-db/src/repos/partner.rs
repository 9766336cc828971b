//! Boundary partner repository: create, assembled read, delete.

use om_core::assembly::{FlatRow, LeafColumns, MarkerColumns, PartnerColumns, TreeAssembler};
use om_core::entities::BoundaryPartner;
use om_core::ids::PREFIX_PARTNER;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{get_opt_order, get_opt_string, now_timestamp};
use crate::service::OmService;

/// One partner, fanned out across markers × challenges × strategies.
const PARTNER_TREE_SQL: &str = "
    SELECT bp.boundary_partner_id, bp.project_id, bp.partner_name, coalesce(bp.outcome_statement, ''),
           pm.progress_marker_id, pm.title, pm.type, pm.order_number,
           ch.challenge_id, ch.challenge_name,
           st.strategy_id, st.strategy_name
    FROM boundary_partners bp
    LEFT JOIN progress_markers pm ON pm.boundary_partner_id = bp.boundary_partner_id
    LEFT JOIN challenges ch ON ch.progress_marker_id = pm.progress_marker_id
    LEFT JOIN strategies st ON st.progress_marker_id = pm.progress_marker_id
    WHERE bp.boundary_partner_id = ?1 AND bp.project_id = ?2
    ORDER BY pm.created_at, pm.rowid, ch.created_at, ch.rowid, st.created_at, st.rowid";

fn leaf(row: &libsql::Row, id_idx: i32) -> Result<Option<LeafColumns>, DatabaseError> {
    match get_opt_string(row, id_idx)? {
        Some(id) => Ok(Some(LeafColumns {
            id,
            name: row.get::<Option<String>>(id_idx + 1)?.unwrap_or_default(),
        })),
        None => Ok(None),
    }
}

fn row_to_flat_row(row: &libsql::Row) -> Result<FlatRow, DatabaseError> {
    let marker = match (get_opt_string(row, 4)?, get_opt_order(row, 7)?) {
        (Some(progress_marker_id), Some(order_number)) => Some(MarkerColumns {
            progress_marker_id,
            title: row.get::<Option<String>>(5)?.unwrap_or_default(),
            kind: row.get::<Option<i64>>(6)?.unwrap_or_default(),
            order_number,
        }),
        _ => None,
    };

    Ok(FlatRow {
        partner: PartnerColumns {
            boundary_partner_id: row.get::<String>(0)?,
            project_id: row.get::<String>(1)?,
            partner_name: row.get::<String>(2)?,
            outcome_statement: row.get::<String>(3)?,
        },
        marker,
        challenge: leaf(row, 8)?,
        strategy: leaf(row, 10)?,
    })
}

impl OmService {
    /// Create a boundary partner under `project_id`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank name, or
    /// `DatabaseError::NotFound` if the project does not exist.
    pub async fn create_boundary_partner(
        &self,
        project_id: &str,
        partner_name: &str,
    ) -> Result<BoundaryPartner, DatabaseError> {
        if partner_name.trim().is_empty() {
            return Err(DatabaseError::Validation(
                "partner_name must not be empty".into(),
            ));
        }

        let conn = self.db().conn().await?;
        let boundary_partner_id = generate_id(&conn, PREFIX_PARTNER).await?;
        let inserted = conn
            .execute(
                "INSERT INTO boundary_partners (boundary_partner_id, project_id, partner_name, created_at)
                 SELECT ?1, project_id, ?2, ?3 FROM projects WHERE project_id = ?4",
                libsql::params![
                    boundary_partner_id.as_str(),
                    partner_name,
                    now_timestamp(),
                    project_id
                ],
            )
            .await?;
        if inserted == 0 {
            return Err(DatabaseError::not_found("project", project_id));
        }
        tracing::debug!(%boundary_partner_id, project_id, "boundary partner created");

        Ok(BoundaryPartner {
            boundary_partner_id,
            project_id: project_id.to_string(),
            partner_name: partner_name.to_string(),
            outcome_statement: String::new(),
            progress_markers: Vec::new(),
        })
    }

    /// Read one partner with its markers, challenges and strategies.
    ///
    /// Markers come in creation order. Their `order_number` is reported as
    /// stored, not used for sorting.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the partner does not exist under `project_id`.
    pub async fn get_boundary_partner(
        &self,
        project_id: &str,
        partner_id: &str,
    ) -> Result<BoundaryPartner, DatabaseError> {
        let conn = self.db().conn().await?;
        let mut rows = conn
            .query(PARTNER_TREE_SQL, [partner_id, project_id])
            .await?;

        let mut assembler = TreeAssembler::new();
        let mut row_count = 0usize;
        while let Some(row) = rows.next().await? {
            assembler.push(row_to_flat_row(&row)?);
            row_count += 1;
        }
        tracing::debug!(partner_id, row_count, "partner tree assembled");

        assembler
            .finish()
            .ok_or_else(|| DatabaseError::not_found("boundary partner", partner_id))
    }

    /// Delete a partner; markers, challenges and strategies go with it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the partner does not exist under `project_id`.
    pub async fn delete_boundary_partner(
        &self,
        project_id: &str,
        partner_id: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.db().conn().await?;
        let deleted = conn
            .execute(
                "DELETE FROM boundary_partners WHERE boundary_partner_id = ?1 AND project_id = ?2",
                [partner_id, project_id],
            )
            .await?;
        if deleted == 0 {
            return Err(DatabaseError::not_found("boundary partner", partner_id));
        }
        tracing::debug!(partner_id, project_id, "boundary partner deleted");
        Ok(())
    }
}
