//! Project repository: create, list per organization, ownership lookup, delete.

use std::collections::HashMap;

use om_core::entities::{NewProject, Project};
use om_core::ids::PREFIX_PROJECT;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{get_opt_string, now_timestamp, parse_optional_datetime};
use crate::service::OmService;

fn row_to_project(row: &libsql::Row) -> Result<Project, DatabaseError> {
    Ok(Project {
        project_id: row.get::<String>(0)?,
        project_name: row.get::<String>(1)?,
        logo_url: get_opt_string(row, 2)?,
        description: row.get::<String>(3)?,
        budget: row.get::<f64>(4)?,
        donor: row.get::<String>(5)?,
        vision: row.get::<String>(6)?,
        mission: row.get::<String>(7)?,
        timeline_from: parse_optional_datetime(get_opt_string(row, 8)?.as_deref())?,
        timeline_to: parse_optional_datetime(get_opt_string(row, 9)?.as_deref())?,
        boundary_partner_ids: Vec::new(),
        boundary_partner_names: Vec::new(),
    })
}

impl OmService {
    /// Create a project owned by `organization_id`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` if the name is blank or the budget
    /// is not a finite number.
    pub async fn create_project(
        &self,
        organization_id: &str,
        input: &NewProject,
    ) -> Result<Project, DatabaseError> {
        if input.project_name.trim().is_empty() {
            return Err(DatabaseError::Validation(
                "project_name must not be empty".into(),
            ));
        }
        if !input.budget.is_finite() {
            return Err(DatabaseError::Validation("budget must be a finite number".into()));
        }

        let conn = self.db().conn().await?;
        let project_id = generate_id(&conn, PREFIX_PROJECT).await?;
        conn.execute(
            "INSERT INTO projects (project_id, organization_id, project_name, description, budget, donor, vision, mission, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            libsql::params![
                project_id.as_str(),
                organization_id,
                input.project_name.as_str(),
                input.description.as_str(),
                input.budget,
                input.donor.as_str(),
                input.vision.as_str(),
                input.mission.as_str(),
                now_timestamp()
            ],
        )
        .await?;
        tracing::debug!(%project_id, organization_id, "project created");

        Ok(Project {
            project_id,
            project_name: input.project_name.clone(),
            logo_url: None,
            description: input.description.clone(),
            budget: input.budget,
            donor: input.donor.clone(),
            vision: input.vision.clone(),
            mission: input.mission.clone(),
            timeline_from: None,
            timeline_to: None,
            boundary_partner_ids: Vec::new(),
            boundary_partner_names: Vec::new(),
        })
    }

    /// Every project of `organization_id`, oldest first, with the ids and
    /// names of its boundary partners in creation order.
    pub async fn list_projects(&self, organization_id: &str) -> Result<Vec<Project>, DatabaseError> {
        let conn = self.db().conn().await?;

        let mut rows = conn
            .query(
                "SELECT project_id, project_name, logo_url, description, budget, donor, vision, mission,
                        timeline_from, timeline_to
                 FROM projects
                 WHERE organization_id = ?1
                 ORDER BY created_at, rowid",
                [organization_id],
            )
            .await?;
        let mut projects = Vec::new();
        let mut index = HashMap::new();
        while let Some(row) = rows.next().await? {
            let project = row_to_project(&row)?;
            index.insert(project.project_id.clone(), projects.len());
            projects.push(project);
        }

        let mut rows = conn
            .query(
                "SELECT bp.project_id, bp.boundary_partner_id, bp.partner_name
                 FROM boundary_partners bp
                 JOIN projects p ON p.project_id = bp.project_id
                 WHERE p.organization_id = ?1
                 ORDER BY bp.created_at, bp.rowid",
                [organization_id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            let project_id = row.get::<String>(0)?;
            if let Some(&idx) = index.get(&project_id) {
                projects[idx].boundary_partner_ids.push(row.get::<String>(1)?);
                projects[idx].boundary_partner_names.push(row.get::<String>(2)?);
            }
        }

        Ok(projects)
    }

    /// Organization owning `project_id`, or `None` if the project does not exist.
    pub async fn project_organization(
        &self,
        project_id: &str,
    ) -> Result<Option<String>, DatabaseError> {
        let conn = self.db().conn().await?;
        let mut rows = conn
            .query(
                "SELECT organization_id FROM projects WHERE project_id = ?1",
                [project_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<String>(0)?)),
            None => Ok(None),
        }
    }

    /// Delete a project and, through cascading keys, its whole hierarchy.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the project does not exist.
    pub async fn delete_project(&self, project_id: &str) -> Result<(), DatabaseError> {
        let conn = self.db().conn().await?;
        let deleted = conn
            .execute("DELETE FROM projects WHERE project_id = ?1", [project_id])
            .await?;
        if deleted == 0 {
            return Err(DatabaseError::not_found("project", project_id));
        }
        tracing::debug!(%project_id, "project deleted");
        Ok(())
    }
}
