//! Shared test utilities for om-db unit tests.

pub(crate) mod helpers {
    use om_core::entities::{NewProject, User};

    use crate::OmDb;
    use crate::service::OmService;

    /// Create an in-memory OmService.
    pub async fn test_service() -> OmService {
        let db = OmDb::open_local(":memory:").await.unwrap();
        OmService::from_db(db)
    }

    /// Create an admin user in `org`.
    pub async fn seed_admin(svc: &OmService, org: &str) -> User {
        svc.create_user(org, &format!("admin@{org}.test"), "Admin", "unused-hash", true)
            .await
            .unwrap()
    }

    /// Create a project in `org` and return its id.
    pub async fn seed_project(svc: &OmService, org: &str) -> String {
        svc.create_project(
            org,
            &NewProject {
                project_name: format!("Project of {org}"),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .project_id
    }

    /// Create a project with one partner; returns `(project_id, partner_id)`.
    pub async fn seed_partner(svc: &OmService, org: &str) -> (String, String) {
        let project_id = seed_project(svc, org).await;
        let partner = svc
            .create_boundary_partner(&project_id, "Partner")
            .await
            .unwrap();
        (project_id, partner.boundary_partner_id)
    }

    /// Append `count` markers titled `M1..Mn` and return their ids in order.
    pub async fn seed_markers(
        svc: &OmService,
        project_id: &str,
        partner_id: &str,
        count: usize,
    ) -> Vec<String> {
        let mut ids = Vec::with_capacity(count);
        for i in 1..=count {
            let marker = svc
                .add_progress_marker(project_id, partner_id, &format!("M{i}"), 1)
                .await
                .unwrap();
            ids.push(marker.progress_marker_id);
        }
        ids
    }
}
