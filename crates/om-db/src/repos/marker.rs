//! Progress marker repository: append, move, delete, all keeping each
//! partner's `order_number`s dense.
//!
//! Every write runs in one immediate transaction that re-reads the partner's
//! ordering, applies the planned statements and verifies density before
//! committing. Two writers on the same partner therefore never interleave.

use libsql::Connection;
use om_core::entities::ProgressMarker;
use om_core::ids::PREFIX_MARKER;
use om_core::sequencer::{self, OrderUpdate, Plan};

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{get_count, get_order, now_timestamp};
use crate::service::{OmService, begin_immediate, finish};

/// Where a marker sits: its partner and current order.
struct Located {
    partner_id: String,
    order: u32,
}

async fn locate_marker(
    conn: &Connection,
    project_id: &str,
    marker_id: &str,
) -> Result<Located, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT pm.boundary_partner_id, pm.order_number
             FROM progress_markers pm
             JOIN boundary_partners bp ON bp.boundary_partner_id = pm.boundary_partner_id
             WHERE pm.progress_marker_id = ?1 AND bp.project_id = ?2",
            [marker_id, project_id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("progress marker", marker_id))?;
    Ok(Located {
        partner_id: row.get::<String>(0)?,
        order: get_order(&row, 1)?,
    })
}

async fn partner_in_project(
    conn: &Connection,
    project_id: &str,
    partner_id: &str,
) -> Result<bool, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT 1 FROM boundary_partners WHERE boundary_partner_id = ?1 AND project_id = ?2",
            [partner_id, project_id],
        )
        .await?;
    Ok(rows.next().await?.is_some())
}

async fn sibling_count(conn: &Connection, partner_id: &str) -> Result<u32, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT count(*) FROM progress_markers WHERE boundary_partner_id = ?1",
            [partner_id],
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    get_count(&row, 0)
}

async fn orders_of(conn: &Connection, partner_id: &str) -> Result<Vec<(String, u32)>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT progress_marker_id, order_number FROM progress_markers
             WHERE boundary_partner_id = ?1
             ORDER BY order_number, rowid",
            [partner_id],
        )
        .await?;
    let mut orders = Vec::new();
    while let Some(row) = rows.next().await? {
        orders.push((row.get::<String>(0)?, get_order(&row, 1)?));
    }
    Ok(orders)
}

/// Run `plan` against the partner it is scoped to.
async fn execute_plan(
    conn: &Connection,
    plan: &Plan,
    moved_id: Option<&str>,
) -> Result<(), DatabaseError> {
    for update in &plan.updates {
        match *update {
            OrderUpdate::Shift { from, to, delta } => {
                conn.execute(
                    "UPDATE progress_markers SET order_number = order_number + ?1
                     WHERE boundary_partner_id = ?2 AND order_number BETWEEN ?3 AND ?4",
                    libsql::params![
                        i64::from(delta),
                        plan.scope.as_str(),
                        i64::from(from),
                        i64::from(to)
                    ],
                )
                .await?;
            }
            OrderUpdate::Set { order } => {
                let marker_id = moved_id.ok_or_else(|| {
                    DatabaseError::InvalidState("plan sets an order without a moved marker".into())
                })?;
                conn.execute(
                    "UPDATE progress_markers SET order_number = ?1 WHERE progress_marker_id = ?2",
                    libsql::params![i64::from(order), marker_id],
                )
                .await?;
            }
        }
    }
    Ok(())
}

async fn ensure_dense(conn: &Connection, partner_id: &str) -> Result<(), DatabaseError> {
    let orders = orders_of(conn, partner_id).await?;
    if sequencer::is_dense(orders.iter().map(|(_, order)| *order)) {
        return Ok(());
    }
    tracing::warn!(partner_id, ?orders, "ordering not dense after write, rolling back");
    Err(DatabaseError::Conflict(format!(
        "progress marker order of {partner_id} is not contiguous"
    )))
}

async fn append_in_tx(
    conn: &Connection,
    project_id: &str,
    partner_id: &str,
    title: &str,
    kind: i64,
) -> Result<ProgressMarker, DatabaseError> {
    if !partner_in_project(conn, project_id, partner_id).await? {
        return Err(DatabaseError::not_found("boundary partner", partner_id));
    }

    let order_number = sequencer::next_order(sibling_count(conn, partner_id).await?);
    let progress_marker_id = generate_id(conn, PREFIX_MARKER).await?;
    conn.execute(
        "INSERT INTO progress_markers (progress_marker_id, boundary_partner_id, title, type, order_number, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        libsql::params![
            progress_marker_id.as_str(),
            partner_id,
            title,
            kind,
            i64::from(order_number),
            now_timestamp()
        ],
    )
    .await?;
    ensure_dense(conn, partner_id).await?;

    Ok(ProgressMarker {
        progress_marker_id,
        boundary_partner_id: partner_id.to_string(),
        title: title.to_string(),
        kind,
        order_number,
        challenges: Vec::new(),
        strategies: Vec::new(),
    })
}

async fn move_in_tx(
    conn: &Connection,
    project_id: &str,
    marker_id: &str,
    target: u32,
    title: Option<&str>,
    kind: Option<i64>,
) -> Result<Plan, DatabaseError> {
    let located = locate_marker(conn, project_id, marker_id).await?;
    let len = sibling_count(conn, &located.partner_id).await?;
    let plan = sequencer::plan_move(&located.partner_id, located.order, target, len)?;

    execute_plan(conn, &plan, Some(marker_id)).await?;
    if title.is_some() || kind.is_some() {
        conn.execute(
            "UPDATE progress_markers SET title = coalesce(?1, title), type = coalesce(?2, type)
             WHERE progress_marker_id = ?3",
            libsql::params![title, kind, marker_id],
        )
        .await?;
    }
    ensure_dense(conn, &located.partner_id).await?;
    Ok(plan)
}

async fn delete_in_tx(
    conn: &Connection,
    project_id: &str,
    marker_id: &str,
) -> Result<Plan, DatabaseError> {
    let located = locate_marker(conn, project_id, marker_id).await?;
    let len = sibling_count(conn, &located.partner_id).await?;
    let plan = sequencer::plan_remove(&located.partner_id, located.order, len)?;

    conn.execute(
        "DELETE FROM progress_markers WHERE progress_marker_id = ?1",
        [marker_id],
    )
    .await?;
    execute_plan(conn, &plan, None).await?;
    ensure_dense(conn, &located.partner_id).await?;
    Ok(plan)
}

impl OmService {
    /// Append a marker at the end of its partner's ordering (`count + 1`).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank title, or
    /// `DatabaseError::NotFound` if the partner does not exist under `project_id`.
    pub async fn add_progress_marker(
        &self,
        project_id: &str,
        partner_id: &str,
        title: &str,
        kind: i64,
    ) -> Result<ProgressMarker, DatabaseError> {
        if title.trim().is_empty() {
            return Err(DatabaseError::Validation("title must not be empty".into()));
        }

        let conn = self.db().conn().await?;
        let tx = begin_immediate(&conn).await?;
        let result = append_in_tx(&tx, project_id, partner_id, title, kind).await;
        let marker = finish(tx, result).await?;
        tracing::debug!(
            progress_marker_id = %marker.progress_marker_id,
            partner_id,
            order_number = marker.order_number,
            "progress marker appended"
        );
        Ok(marker)
    }

    /// Move a marker to `target` within its partner, optionally updating its
    /// title and type in the same transaction.
    ///
    /// Moving a marker to its current position writes no order changes.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the marker does not exist under
    /// `project_id`, `DatabaseError::Validation` if `target` is outside
    /// `1..=N`, or `DatabaseError::Conflict` if the result would not be dense.
    pub async fn move_progress_marker(
        &self,
        project_id: &str,
        marker_id: &str,
        target: u32,
        title: Option<&str>,
        kind: Option<i64>,
    ) -> Result<(), DatabaseError> {
        let conn = self.db().conn().await?;
        let tx = begin_immediate(&conn).await?;
        let result = move_in_tx(&tx, project_id, marker_id, target, title, kind).await;
        let plan = finish(tx, result).await?;
        tracing::debug!(
            marker_id,
            partner_id = %plan.scope,
            from = ?plan.moved_from,
            target,
            statements = plan.updates.len(),
            "progress marker moved"
        );
        Ok(())
    }

    /// Delete a marker, its challenges and strategies, and close the gap it
    /// leaves in the ordering.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the marker does not exist under `project_id`.
    pub async fn delete_progress_marker(
        &self,
        project_id: &str,
        marker_id: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.db().conn().await?;
        let tx = begin_immediate(&conn).await?;
        let result = delete_in_tx(&tx, project_id, marker_id).await;
        let plan = finish(tx, result).await?;
        tracing::debug!(marker_id, partner_id = %plan.scope, "progress marker deleted");
        Ok(())
    }

    /// `(marker id, order_number)` pairs of a partner, in order.
    pub async fn marker_orders(&self, partner_id: &str) -> Result<Vec<(String, u32)>, DatabaseError> {
        let conn = self.db().conn().await?;
        orders_of(&conn, partner_id).await
    }
}
