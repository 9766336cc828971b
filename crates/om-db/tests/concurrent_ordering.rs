//! Ordering under concurrency, against a file-backed database with a real pool.
//!
//! `:memory:` cannot be used here: it would collapse the pool to a single
//! connection and serialize everything before it reaches SQLite.

use std::sync::Arc;

use om_config::DatabaseConfig;
use om_core::entities::NewProject;
use om_core::sequencer::is_dense;
use om_db::OmService;

async fn file_service(dir: &tempfile::TempDir) -> Arc<OmService> {
    let config = DatabaseConfig {
        path: dir.path().join("omap.db").to_string_lossy().into_owned(),
        max_connections: 8,
        busy_timeout_ms: 10_000,
    };
    Arc::new(OmService::open(&config).await.unwrap())
}

async fn seed(svc: &OmService) -> (String, String) {
    let project = svc
        .create_project(
            "org-1",
            &NewProject {
                project_name: "Concurrent".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let partner = svc
        .create_boundary_partner(&project.project_id, "Partner")
        .await
        .unwrap();
    (project.project_id, partner.boundary_partner_id)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_get_distinct_dense_orders() {
    let dir = tempfile::tempdir().unwrap();
    let svc = file_service(&dir).await;
    let (project_id, partner_id) = seed(&svc).await;

    let tasks: Vec<_> = (0..24)
        .map(|i| {
            let svc = Arc::clone(&svc);
            let project_id = project_id.clone();
            let partner_id = partner_id.clone();
            tokio::spawn(async move {
                svc.add_progress_marker(&project_id, &partner_id, &format!("M{i}"), 1)
                    .await
                    .unwrap()
                    .order_number
            })
        })
        .collect();

    let mut assigned = Vec::new();
    for task in tasks {
        assigned.push(task.await.unwrap());
    }
    assigned.sort_unstable();
    assert_eq!(assigned, (1..=24).collect::<Vec<u32>>());

    let stored = svc.marker_orders(&partner_id).await.unwrap();
    assert_eq!(stored.len(), 24);
    assert!(is_dense(stored.iter().map(|(_, order)| *order)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_appends_after_three_markers_take_four_and_five() {
    let dir = tempfile::tempdir().unwrap();
    let svc = file_service(&dir).await;
    let (project_id, partner_id) = seed(&svc).await;
    for title in ["A", "B", "C"] {
        svc.add_progress_marker(&project_id, &partner_id, title, 1)
            .await
            .unwrap();
    }

    let append = |title: &'static str| {
        let svc = Arc::clone(&svc);
        let project_id = project_id.clone();
        let partner_id = partner_id.clone();
        tokio::spawn(async move {
            svc.add_progress_marker(&project_id, &partner_id, title, 1)
                .await
                .unwrap()
                .order_number
        })
    };
    let (first, second) = (append("D"), append("E"));
    let mut assigned = vec![first.await.unwrap(), second.await.unwrap()];
    assigned.sort_unstable();
    assert_eq!(assigned, vec![4, 5]);

    let stored = svc.marker_orders(&partner_id).await.unwrap();
    assert_eq!(stored.len(), 5);
    assert!(is_dense(stored.iter().map(|(_, order)| *order)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_moves_keep_density() {
    let dir = tempfile::tempdir().unwrap();
    let svc = file_service(&dir).await;
    let (project_id, partner_id) = seed(&svc).await;

    let mut ids = Vec::new();
    for i in 0..8 {
        let marker = svc
            .add_progress_marker(&project_id, &partner_id, &format!("M{i}"), 1)
            .await
            .unwrap();
        ids.push(marker.progress_marker_id);
    }

    let tasks: Vec<_> = (0..32u32)
        .map(|i| {
            let svc = Arc::clone(&svc);
            let project_id = project_id.clone();
            let marker_id = ids[(i as usize * 3) % ids.len()].clone();
            let target = (i * 5) % 8 + 1;
            tokio::spawn(async move {
                svc.move_progress_marker(&project_id, &marker_id, target, None, None)
                    .await
                    .unwrap();
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let stored = svc.marker_orders(&partner_id).await.unwrap();
    assert_eq!(stored.len(), 8);
    assert!(is_dense(stored.iter().map(|(_, order)| *order)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_deletes_and_appends_keep_density() {
    let dir = tempfile::tempdir().unwrap();
    let svc = file_service(&dir).await;
    let (project_id, partner_id) = seed(&svc).await;

    let mut ids = Vec::new();
    for i in 0..10 {
        let marker = svc
            .add_progress_marker(&project_id, &partner_id, &format!("M{i}"), 1)
            .await
            .unwrap();
        ids.push(marker.progress_marker_id);
    }

    let mut tasks = Vec::new();
    for id in ids.iter().step_by(2).cloned() {
        let svc = Arc::clone(&svc);
        let project_id = project_id.clone();
        tasks.push(tokio::spawn(async move {
            svc.delete_progress_marker(&project_id, &id).await.unwrap();
        }));
    }
    for i in 0..5 {
        let svc = Arc::clone(&svc);
        let project_id = project_id.clone();
        let partner_id = partner_id.clone();
        tasks.push(tokio::spawn(async move {
            svc.add_progress_marker(&project_id, &partner_id, &format!("N{i}"), 2)
                .await
                .unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let stored = svc.marker_orders(&partner_id).await.unwrap();
    assert_eq!(stored.len(), 10);
    assert!(is_dense(stored.iter().map(|(_, order)| *order)));
}
