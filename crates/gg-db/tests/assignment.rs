//! Assignment coordinator integration tests.
//!
//! Covers the precondition order, the single-assignment guarantee under
//! concurrency, rollback on rejected attempts, and audit isolation.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;

use gg_core::entities::AuditEvent;
use gg_core::enums::{AuditAction, RequestStatus, UserRole};
use gg_db::ports::{AuditSink, TeamMembership};
use gg_db::repos::audit::AuditFilter;
use gg_db::{ErrorKind, LifecycleError};

struct FailingSink {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl AuditSink for FailingSink {
    async fn append(&self, _event: &AuditEvent) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("audit store offline")
    }
}

struct NobodyIsMember;

#[async_trait::async_trait]
impl TeamMembership for NobodyIsMember {
    async fn is_member(&self, _user_id: &str, _team_id: &str) -> anyhow::Result<bool> {
        Ok(false)
    }
}

#[tokio::test]
async fn assign_moves_request_to_in_progress() {
    let (_dir, svc) = common::service().await;
    let floor = common::seed(&svc).await;

    let receipt = svc
        .assign_technician(&floor.request.id, &floor.tech_a.id, &floor.manager.id)
        .await
        .unwrap();

    assert_eq!(receipt.request_status, RequestStatus::InProgress);
    assert_eq!(receipt.assigned_to_name, "Avery");
    assert_eq!(receipt.assigned_by_name, "Morgan");
    assert_eq!(receipt.assigned_to_email.as_deref(), Some("avery@plant.test"));
    assert!(receipt.assignment.completed_at.is_none());

    let view = svc.get_request(&floor.request.id).await.unwrap();
    assert_eq!(view.request.status, RequestStatus::InProgress);
    assert_eq!(view.assignment.map(|a| a.id), Some(receipt.assignment.id));
}

#[tokio::test]
async fn second_assignment_conflicts_and_keeps_first() {
    let (_dir, svc) = common::service().await;
    let floor = common::seed(&svc).await;

    svc.assign_technician(&floor.request.id, &floor.tech_a.id, &floor.manager.id)
        .await
        .unwrap();
    let err = svc
        .assign_technician(&floor.request.id, &floor.tech_b.id, &floor.manager.id)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("Avery"), "{err}");
    let assignment = svc
        .assignment_for_request(&floor.request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(assignment.assigned_to, floor.tech_a.id);
    assert_eq!(common::assignment_rows(&svc, &floor.request.id).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_assignments_have_one_winner() {
    let (_dir, svc) = common::service().await;
    let floor = common::seed(&svc).await;

    let mut technicians = vec![floor.tech_a.id.clone(), floor.tech_b.id.clone()];
    for i in 0..6 {
        let tech = svc
            .create_user(&format!("Tech {i}"), None, UserRole::Technician)
            .await
            .unwrap();
        svc.add_team_member(&floor.team.id, &tech.id).await.unwrap();
        technicians.push(tech.id);
    }

    let svc = Arc::new(svc);
    let mut handles = Vec::new();
    for tech in technicians {
        let svc = Arc::clone(&svc);
        let request_id = floor.request.id.clone();
        let manager_id = floor.manager.id.clone();
        handles.push(tokio::spawn(async move {
            svc.assign_technician(&request_id, &tech, &manager_id).await
        }));
    }

    let mut winners = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => {
                assert_eq!(e.kind(), ErrorKind::Conflict, "{e}");
                conflicts += 1;
            }
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(common::assignment_rows(&svc, &floor.request.id).await, 1);
    let view = svc.get_request(&floor.request.id).await.unwrap();
    assert_eq!(view.request.status, RequestStatus::InProgress);
}

#[tokio::test]
async fn request_must_be_new() {
    let (_dir, svc) = common::service().await;
    let floor = common::seed(&svc).await;

    let other = svc
        .create_request(common::corrective(&floor.equipment.id, &floor.manager.id))
        .await
        .unwrap();
    svc.db()
        .execute_write(
            "UPDATE maintenance_requests SET status = 'REPAIRED' WHERE id = ?1",
            [other.id.as_str()],
        )
        .await
        .unwrap();

    let err = svc
        .assign_technician(&other.id, &floor.tech_b.id, &floor.manager.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("Only NEW requests can be assigned"), "{err}");
    assert_eq!(common::assignment_rows(&svc, &other.id).await, 0);
}

#[tokio::test]
async fn technician_outside_team_is_rejected() {
    let (_dir, svc) = common::service().await;
    let floor = common::seed(&svc).await;

    let err = svc
        .assign_technician(&floor.request.id, &floor.outsider.id, &floor.manager.id)
        .await
        .unwrap_err();

    assert!(matches!(err, LifecycleError::TeamMismatch { .. }), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::Validation);
    let view = svc.get_request(&floor.request.id).await.unwrap();
    assert_eq!(view.request.status, RequestStatus::New);
    assert!(view.assignment.is_none());
}

#[tokio::test]
async fn removed_member_can_no_longer_be_assigned() {
    let (_dir, svc) = common::service().await;
    let floor = common::seed(&svc).await;

    svc.remove_team_member(&floor.team.id, &floor.tech_a.id)
        .await
        .unwrap();
    let err = svc
        .assign_technician(&floor.request.id, &floor.tech_a.id, &floor.manager.id)
        .await
        .unwrap_err();

    assert!(matches!(err, LifecycleError::TeamMismatch { .. }), "{err:?}");
    assert_eq!(common::assignment_rows(&svc, &floor.request.id).await, 0);

    svc.assign_technician(&floor.request.id, &floor.tech_b.id, &floor.manager.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn membership_port_decides_team_check() {
    let (_dir, builder) = common::builder().await;
    let svc = builder.membership(Arc::new(NobodyIsMember)).build();
    let floor = common::seed(&svc).await;

    let err = svc
        .assign_technician(&floor.request.id, &floor.tech_a.id, &floor.manager.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::TeamMismatch { .. }), "{err:?}");
}

#[tokio::test]
async fn self_assignment_is_rejected_without_side_effects() {
    let (_dir, svc) = common::service().await;
    let floor = common::seed(&svc).await;

    let err = svc
        .assign_technician(&floor.request.id, &floor.tech_a.id, &floor.tech_a.id)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("Cannot self-assign"), "{err}");
    let view = svc.get_request(&floor.request.id).await.unwrap();
    assert_eq!(view.request.status, RequestStatus::New);
    assert_eq!(common::assignment_rows(&svc, &floor.request.id).await, 0);
}

#[tokio::test]
async fn target_must_be_active_technician() {
    let (_dir, svc) = common::service().await;
    let floor = common::seed(&svc).await;

    let err = svc
        .assign_technician(&floor.request.id, &floor.manager.id, &floor.tech_a.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Authorization(_)), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::Validation);

    svc.set_user_active(&floor.tech_b.id, false).await.unwrap();
    let err = svc
        .assign_technician(&floor.request.id, &floor.tech_b.id, &floor.manager.id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Cannot assign to inactive technician");
}

#[tokio::test]
async fn assigner_must_exist_and_be_active() {
    let (_dir, svc) = common::service().await;
    let floor = common::seed(&svc).await;

    let err = svc
        .assign_technician(&floor.request.id, &floor.tech_a.id, "usr-00000000")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    svc.set_user_active(&floor.manager.id, false).await.unwrap();
    let err = svc
        .assign_technician(&floor.request.id, &floor.tech_a.id, &floor.manager.id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Assigner user is inactive");
}

#[tokio::test]
async fn unknown_request_is_not_found() {
    let (_dir, svc) = common::service().await;
    let floor = common::seed(&svc).await;

    let err = svc
        .assign_technician("req-00000000", &floor.tech_a.id, &floor.manager.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn failing_audit_sink_does_not_fail_assignment() {
    let sink = Arc::new(FailingSink {
        calls: AtomicUsize::new(0),
    });
    let (_dir, builder) = common::builder().await;
    let svc = builder.audit_sink(sink.clone()).build();
    let floor = common::seed(&svc).await;

    let receipt = svc
        .assign_technician(&floor.request.id, &floor.tech_a.id, &floor.manager.id)
        .await
        .unwrap();
    svc.flush_audit().await;

    assert_eq!(receipt.request_status, RequestStatus::InProgress);
    assert_eq!(sink.calls.load(Ordering::SeqCst), 2, "created + assigned");
    let entries = svc.query_audit(&AuditFilter::default()).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn assignment_is_audited_after_commit() {
    let (_dir, svc) = common::service().await;
    let floor = common::seed(&svc).await;

    let receipt = svc
        .assign_technician(&floor.request.id, &floor.tech_a.id, &floor.manager.id)
        .await
        .unwrap();
    svc.flush_audit().await;

    let entries = svc
        .query_audit(&AuditFilter {
            request_id: Some(floor.request.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    let actions: Vec<_> = entries.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![AuditAction::RequestCreated, AuditAction::RequestAssigned]
    );

    let assigned = &entries[1];
    assert_eq!(assigned.user_id.as_deref(), Some(floor.manager.id.as_str()));
    let details = assigned.details.as_ref().unwrap();
    assert_eq!(details["assignment_id"], receipt.assignment.id.as_str());
    assert_eq!(details["previous_status"], "NEW");
    assert_eq!(details["new_status"], "IN_PROGRESS");
}

#[tokio::test]
async fn rejected_attempt_writes_no_audit() {
    let (_dir, svc) = common::service().await;
    let floor = common::seed(&svc).await;

    let _ = svc
        .assign_technician(&floor.request.id, &floor.outsider.id, &floor.manager.id)
        .await
        .unwrap_err();
    svc.flush_audit().await;

    let entries = svc
        .query_audit(&AuditFilter {
            action: Some(AuditAction::RequestAssigned),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(entries.is_empty());
}
