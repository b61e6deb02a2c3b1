//! End-to-end workflow tests with stubbed collaborators and virtual time.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use procure_api::config::PurchasingConfig;
use procure_api::errors::ServiceError;
use procure_api::models::VendorCandidate;
use procure_api::services::calls::{CallHandle, OutboundDialer};
use procure_api::services::purchase_orders::PurchaseOrderGenerator;
use procure_api::services::vendor_search::VendorDirectory;
use procure_api::services::workflow::{
    OrderWorkflowService, TokioPacer, WorkflowPhase, WorkflowSettings, WorkflowSnapshot,
};
use uuid::Uuid;

struct StaticDirectory(Vec<VendorCandidate>);

#[async_trait]
impl VendorDirectory for StaticDirectory {
    async fn search(&self, _query: &str) -> Result<Vec<VendorCandidate>, ServiceError> {
        Ok(self.0.clone())
    }
}

struct FailingDirectory;

#[async_trait]
impl VendorDirectory for FailingDirectory {
    async fn search(&self, _query: &str) -> Result<Vec<VendorCandidate>, ServiceError> {
        Err(ServiceError::VendorSearchFailed("upstream timeout".into()))
    }
}

struct NoopDialer;

#[async_trait]
impl OutboundDialer for NoopDialer {
    async fn initiate_call(
        &self,
        _phone: &str,
        _script_prompt: &str,
        _opening_line: &str,
    ) -> Result<CallHandle, ServiceError> {
        Ok(CallHandle {
            call_id: "stub".into(),
        })
    }
}

fn discovery_candidates() -> Vec<VendorCandidate> {
    [
        "Industrial Motors Pro",
        "CNC Solutions Inc",
        "Precision Spindle Co",
        "Advanced Machine Parts",
        "Eastern Motors Supply",
    ]
    .iter()
    .map(|n| VendorCandidate::named(*n))
    .collect()
}

fn house_vendor() -> VendorCandidate {
    VendorCandidate {
        name: "Keystone Supply Co".into(),
        website: None,
        email: Some("orders@keystonesupply.com".into()),
        phone: Some("(215) 555-0188".into()),
    }
}

fn service(
    directory: impl VendorDirectory + 'static,
    settings: WorkflowSettings,
) -> Arc<OrderWorkflowService> {
    Arc::new(OrderWorkflowService::new(
        Arc::new(directory),
        Arc::new(NoopDialer),
        Arc::new(PurchaseOrderGenerator::new(PurchasingConfig::default())),
        Arc::new(TokioPacer),
        settings,
    ))
}

async fn wait_for_phase(
    service: &Arc<OrderWorkflowService>,
    session: Uuid,
    phase: WorkflowPhase,
) -> WorkflowSnapshot {
    for _ in 0..2000 {
        let snap = service.snapshot(session).await.unwrap();
        if snap.phase == phase {
            return snap;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("workflow never reached {:?}", phase);
}

#[tokio::test(start_paused = true)]
async fn guaranteed_vendor_wins_the_order() {
    let settings = WorkflowSettings {
        house_vendor: Some(house_vendor()),
        priority_vendor: Some("Keystone Supply Co".into()),
        ..Default::default()
    };
    let service = service(StaticDirectory(discovery_candidates()), settings);
    let session = service.create_session();

    service.start_search(session, "ball bearings").await.unwrap();
    let snap = wait_for_phase(&service, session, WorkflowPhase::OrderIssued).await;

    assert_eq!(snap.vendors.len(), 6, "five discovered plus the house vendor");
    let order = snap.purchase_order.expect("order issued");
    assert_eq!(order.vendor.name, "Keystone Supply Co");
    assert!(order.totals_consistent());

    // every candidate was called, in candidate order
    assert_eq!(snap.call_messages.len(), 1 + 2 * 6);
    assert!(snap.call_messages[1].contains("Industrial Motors Pro"));
    assert!(snap.call_messages[2].contains("Industrial Motors Pro"));
    assert!(snap.call_messages[11].contains("Keystone Supply Co"));
}

#[tokio::test(start_paused = true)]
async fn discovery_failure_resets_to_idle() {
    let service = service(FailingDirectory, WorkflowSettings::default());
    let session = service.create_session();

    service.start_search(session, "ball bearings").await.unwrap();

    // phase passes through Searching, then falls back to Idle
    let snap = wait_for_phase(&service, session, WorkflowPhase::Idle).await;
    assert!(snap.purchase_order.is_none());
    assert!(snap.vendors.is_empty());
    assert!(snap.call_messages.is_empty());
    assert!(snap
        .last_error
        .as_deref()
        .unwrap()
        .contains("upstream timeout"));
}

#[tokio::test(start_paused = true)]
async fn empty_query_leaves_session_idle() {
    let service = service(
        StaticDirectory(discovery_candidates()),
        WorkflowSettings::default(),
    );
    let session = service.create_session();

    assert!(service.start_search(session, "").await.is_err());
    assert!(service.start_search(session, "  \t ").await.is_err());

    let snap = service.snapshot(session).await.unwrap();
    assert_eq!(snap.phase, WorkflowPhase::Idle);
    assert!(snap.search_messages.is_empty());
}

#[tokio::test(start_paused = true)]
async fn new_search_supersedes_in_flight_invocation() {
    let service = service(
        StaticDirectory(discovery_candidates()),
        WorkflowSettings::default(),
    );
    let session = service.create_session();

    service.start_search(session, "first query").await.unwrap();
    service.start_search(session, "second query").await.unwrap();

    let snap = wait_for_phase(&service, session, WorkflowPhase::OrderIssued).await;

    assert_eq!(snap.query, "second query");
    // the superseded driver's reveals were all discarded
    assert_eq!(snap.search_messages.len(), 3);
    assert!(snap.search_messages[0].contains("second query"));
    assert_eq!(
        snap.purchase_order.unwrap().lines[0].description,
        "second query"
    );
}

#[tokio::test(start_paused = true)]
async fn phases_advance_in_order() {
    let service = service(
        StaticDirectory(discovery_candidates()),
        WorkflowSettings::default(),
    );
    let session = service.create_session();

    service.start_search(session, "spindle motors").await.unwrap();

    let mut seen = vec![WorkflowPhase::Idle];
    for _ in 0..2000 {
        let snap = service.snapshot(session).await.unwrap();
        if *seen.last().unwrap() != snap.phase {
            seen.push(snap.phase);
        }
        if snap.phase == WorkflowPhase::OrderIssued {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    // no skipping, no re-entry
    let expected = [
        WorkflowPhase::Idle,
        WorkflowPhase::Searching,
        WorkflowPhase::ResultsReady,
        WorkflowPhase::Calling,
        WorkflowPhase::OrderIssued,
    ];
    assert_eq!(seen, expected, "phases observed out of order");
}
