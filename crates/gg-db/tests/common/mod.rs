//! Seeding helpers shared by the gg-db integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tempfile::TempDir;

use gg_core::entities::{Equipment, MaintenanceRequest, NewRequest, Team, User};
use gg_core::enums::{RequestKind, UserRole};
use gg_db::GearService;
use gg_db::service::GearServiceBuilder;

/// Open a database in a fresh temp dir and hand back a builder over it.
pub async fn builder() -> (TempDir, GearServiceBuilder) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gear.db");
    let db = gg_db::GearDb::open_local(path.to_str().unwrap(), Duration::from_secs(5))
        .await
        .unwrap();
    (dir, GearService::builder(Arc::new(db)))
}

pub async fn service() -> (TempDir, GearService) {
    let (dir, builder) = builder().await;
    (dir, builder.build())
}

/// A team with a manager, two member technicians, one outside technician,
/// one piece of equipment, and one corrective request in `NEW`.
pub struct Floor {
    pub team: Team,
    pub manager: User,
    pub tech_a: User,
    pub tech_b: User,
    pub outsider: User,
    pub equipment: Equipment,
    pub request: MaintenanceRequest,
}

pub async fn seed(svc: &GearService) -> Floor {
    let team = svc.create_team("Hydraulics", Some("Presses and pumps")).await.unwrap();
    let manager = svc
        .create_user("Morgan", Some("morgan@plant.test"), UserRole::Manager)
        .await
        .unwrap();
    let tech_a = svc
        .create_user("Avery", Some("avery@plant.test"), UserRole::Technician)
        .await
        .unwrap();
    let tech_b = svc
        .create_user("Blake", Some("blake@plant.test"), UserRole::Technician)
        .await
        .unwrap();
    let outsider = svc
        .create_user("Casey", Some("casey@plant.test"), UserRole::Technician)
        .await
        .unwrap();
    svc.add_team_member(&team.id, &tech_a.id).await.unwrap();
    svc.add_team_member(&team.id, &tech_b.id).await.unwrap();

    let equipment = svc
        .create_equipment("Press 4", Some("PR-0004"), &team.id)
        .await
        .unwrap();
    let request = svc
        .create_request(corrective(&equipment.id, &manager.id))
        .await
        .unwrap();

    Floor {
        team,
        manager,
        tech_a,
        tech_b,
        outsider,
        equipment,
        request,
    }
}

pub fn corrective(equipment_id: &str, created_by: &str) -> NewRequest {
    NewRequest {
        equipment_id: equipment_id.to_string(),
        kind: RequestKind::Corrective,
        title: "Hydraulic leak".into(),
        description: "Fluid pooling under the main cylinder".into(),
        priority: None,
        scheduled_at: Some(Utc::now() - chrono::Duration::hours(1)),
        sla_hours: None,
        created_by: created_by.to_string(),
    }
}

/// Count the stored assignment rows for a request.
pub async fn assignment_rows(svc: &GearService, request_id: &str) -> i64 {
    let mut rows = svc
        .db()
        .conn()
        .query(
            "SELECT COUNT(*) FROM request_assignments WHERE request_id = ?1",
            [request_id],
        )
        .await
        .unwrap();
    rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
}
