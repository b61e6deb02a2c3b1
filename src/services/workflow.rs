use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use strum::Display;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::WorkflowConfig;
use crate::errors::ServiceError;
use crate::models::{PurchaseOrder, VendorCandidate};
use crate::services::calls::OutboundDialer;
use crate::services::purchase_orders::PurchaseOrderGenerator;
use crate::services::vendor_search::VendorDirectory;

/// One stage of the new-order orchestration. Strictly ordered; a session
/// never skips a phase and never re-enters one within an invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Idle,
    Searching,
    ResultsReady,
    Calling,
    OrderIssued,
}

/// Point-in-time view of one workflow session, as polled by the UI.
#[derive(Clone, Debug, Serialize)]
pub struct WorkflowSnapshot {
    pub phase: WorkflowPhase,
    pub query: String,
    pub search_messages: Vec<String>,
    pub vendors: Vec<VendorCandidate>,
    pub call_messages: Vec<String>,
    pub purchase_order: Option<PurchaseOrder>,
    pub last_error: Option<String>,
}

#[derive(Debug)]
struct WorkflowState {
    /// Bumped on every accepted start; stale driver tasks check it before
    /// applying any delayed update.
    generation: u64,
    phase: WorkflowPhase,
    query: String,
    search_messages: Vec<String>,
    vendors: Vec<VendorCandidate>,
    call_messages: Vec<String>,
    purchase_order: Option<PurchaseOrder>,
    last_error: Option<String>,
}

impl WorkflowState {
    fn new() -> Self {
        Self {
            generation: 0,
            phase: WorkflowPhase::Idle,
            query: String::new(),
            search_messages: Vec::new(),
            vendors: Vec::new(),
            call_messages: Vec::new(),
            purchase_order: None,
            last_error: None,
        }
    }

    /// Clears all downstream state and enters Searching for a new query.
    fn begin(&mut self, query: &str) -> u64 {
        self.generation += 1;
        self.phase = WorkflowPhase::Searching;
        self.query = query.to_string();
        self.search_messages.clear();
        self.vendors.clear();
        self.call_messages.clear();
        self.purchase_order = None;
        self.last_error = None;
        self.generation
    }

    /// Full reset after a failed discovery: a partial vendor list with no
    /// result is not meaningful to show.
    fn abort(&mut self, error: String) {
        self.phase = WorkflowPhase::Idle;
        self.search_messages.clear();
        self.vendors.clear();
        self.call_messages.clear();
        self.purchase_order = None;
        self.last_error = Some(error);
    }

    fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            phase: self.phase,
            query: self.query.clone(),
            search_messages: self.search_messages.clone(),
            vendors: self.vendors.clone(),
            call_messages: self.call_messages.clone(),
            purchase_order: self.purchase_order.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Scheduler seam for the paced message reveals: a real timer in
/// production, virtual or elided time in tests.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, interval: Duration);
}

pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, interval: Duration) {
        tokio::time::sleep(interval).await;
    }
}

/// Pacer that never waits. For tests that drive a workflow to completion
/// without a clock.
pub struct InstantPacer;

#[async_trait]
impl Pacer for InstantPacer {
    async fn pause(&self, _interval: Duration) {}
}

/// Resolved workflow policy: pacing intervals plus vendor selection rules.
#[derive(Clone, Debug)]
pub struct WorkflowSettings {
    pub search_step_interval: Duration,
    pub call_step_interval: Duration,
    pub settle_delay: Duration,
    /// Guaranteed vendor appended to every successful discovery result
    pub house_vendor: Option<VendorCandidate>,
    /// Vendor name that wins selection whenever present among candidates
    pub priority_vendor: Option<String>,
    pub call_script_prompt: String,
    pub call_opening_line: String,
}

impl WorkflowSettings {
    pub fn from_config(cfg: &WorkflowConfig) -> Self {
        let house_vendor = cfg.house_vendor_name.as_ref().map(|name| VendorCandidate {
            name: name.clone(),
            website: None,
            email: cfg.house_vendor_email.clone(),
            phone: cfg.house_vendor_phone.clone(),
        });
        Self {
            search_step_interval: Duration::from_millis(cfg.search_step_interval_ms),
            call_step_interval: Duration::from_millis(cfg.call_step_interval_ms),
            settle_delay: Duration::from_millis(cfg.settle_delay_ms),
            house_vendor,
            priority_vendor: cfg.priority_vendor.clone(),
            call_script_prompt: cfg.call_script_prompt.clone(),
            call_opening_line: cfg.call_opening_line.clone(),
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self::from_config(&WorkflowConfig::default())
    }
}

/// Orchestrates the new-order workflow. Each session owns its state; the
/// only writer is the session's own driver task, and superseded drivers
/// are fenced out by the generation counter.
pub struct OrderWorkflowService {
    sessions: DashMap<Uuid, Arc<Mutex<WorkflowState>>>,
    directory: Arc<dyn VendorDirectory>,
    dialer: Arc<dyn OutboundDialer>,
    generator: Arc<PurchaseOrderGenerator>,
    pacer: Arc<dyn Pacer>,
    settings: WorkflowSettings,
}

impl OrderWorkflowService {
    pub fn new(
        directory: Arc<dyn VendorDirectory>,
        dialer: Arc<dyn OutboundDialer>,
        generator: Arc<PurchaseOrderGenerator>,
        pacer: Arc<dyn Pacer>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            directory,
            dialer,
            generator,
            pacer,
            settings,
        }
    }

    pub fn create_session(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .insert(id, Arc::new(Mutex::new(WorkflowState::new())));
        id
    }

    /// Drops a session. Any in-flight driver keeps running but every one
    /// of its remaining updates is discarded.
    pub fn discard_session(&self, session: Uuid) -> Result<(), ServiceError> {
        self.sessions
            .remove(&session)
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound(format!("workflow session {}", session)))
    }

    pub async fn snapshot(&self, session: Uuid) -> Result<WorkflowSnapshot, ServiceError> {
        let state = self.session(session)?;
        let guard = state.lock().await;
        Ok(guard.snapshot())
    }

    /// Starts the workflow for a query. An empty or whitespace-only query
    /// is rejected without touching session state; a real query fully
    /// resets downstream state and kicks off the driver task.
    #[instrument(skip(self))]
    pub async fn start_search(
        self: &Arc<Self>,
        session: Uuid,
        query: &str,
    ) -> Result<(), ServiceError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::ValidationError(
                "search query must not be empty".to_string(),
            ));
        }

        let state = self.session(session)?;
        let generation = {
            let mut guard = state.lock().await;
            guard.begin(trimmed)
        };
        info!(%session, generation, "workflow search started");

        let service = Arc::clone(self);
        let query = trimmed.to_string();
        tokio::spawn(async move {
            service.run(session, generation, query).await;
        });
        Ok(())
    }

    fn session(&self, session: Uuid) -> Result<Arc<Mutex<WorkflowState>>, ServiceError> {
        self.sessions
            .get(&session)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ServiceError::NotFound(format!("workflow session {}", session)))
    }

    async fn run(self: Arc<Self>, session: Uuid, generation: u64, query: String) {
        if let Err(err) = self.drive(session, generation, &query).await {
            warn!(%session, generation, error = %err, "workflow aborted, resetting to idle");
            self.apply(session, generation, |s| s.abort(err.to_string()))
                .await;
        }
    }

    /// The single thread of control for one invocation. Suspension points
    /// are the paced reveals and the one discovery call; every resumption
    /// re-checks the generation before mutating state.
    async fn drive(
        &self,
        session: Uuid,
        generation: u64,
        query: &str,
    ) -> Result<(), ServiceError> {
        for message in search_stage_messages(query) {
            self.pacer.pause(self.settings.search_step_interval).await;
            if !self
                .apply(session, generation, |s| s.search_messages.push(message.clone()))
                .await
            {
                return Ok(());
            }
        }

        let mut vendors = self.directory.search(query).await?;
        if let Some(house) = &self.settings.house_vendor {
            if !vendors.iter().any(|v| v.name == house.name) {
                vendors.push(house.clone());
            }
        }
        if vendors.is_empty() {
            return Err(ServiceError::VendorSearchFailed(
                "discovery returned no candidates".to_string(),
            ));
        }

        let applied = self
            .apply(session, generation, |s| {
                s.vendors = vendors.clone();
                s.phase = WorkflowPhase::ResultsReady;
            })
            .await;
        if !applied {
            return Ok(());
        }

        self.pacer.pause(self.settings.settle_delay).await;
        if !self
            .apply(session, generation, |s| s.phase = WorkflowPhase::Calling)
            .await
        {
            return Ok(());
        }

        self.spawn_priority_call(&vendors);

        for message in call_stage_messages(&vendors) {
            self.pacer.pause(self.settings.call_step_interval).await;
            if !self
                .apply(session, generation, |s| s.call_messages.push(message.clone()))
                .await
            {
                return Ok(());
            }
        }

        let winner = pick_winner(&vendors, self.settings.priority_vendor.as_deref());
        let order = self.generator.generate(winner, query);
        info!(%session, po_number = %order.po_number, vendor = %winner.name, "purchase order issued");
        self.apply(session, generation, |s| {
            s.purchase_order = Some(order.clone());
            s.phase = WorkflowPhase::OrderIssued;
        })
        .await;
        Ok(())
    }

    /// Fire-and-forget outbound call to the priority vendor. Never joined
    /// into the phase sequence; failure is logged and swallowed.
    fn spawn_priority_call(&self, vendors: &[VendorCandidate]) {
        let Some(priority) = self.settings.priority_vendor.as_deref() else {
            return;
        };
        let Some(target) = vendors
            .iter()
            .find(|v| v.name == priority)
            .and_then(|v| v.phone.clone())
        else {
            return;
        };

        let dialer = Arc::clone(&self.dialer);
        let prompt = self.settings.call_script_prompt.clone();
        let opening = self.settings.call_opening_line.clone();
        tokio::spawn(async move {
            match dialer.initiate_call(&target, &prompt, &opening).await {
                Ok(handle) => info!(call_id = %handle.call_id, "priority vendor call initiated"),
                Err(err) => warn!(error = %err, "priority vendor call failed"),
            }
        });
    }

    /// Runs a mutation only if the driver's generation is still current.
    /// Returns false when the invocation has been superseded or the
    /// session discarded.
    async fn apply<F>(&self, session: Uuid, generation: u64, mutate: F) -> bool
    where
        F: FnOnce(&mut WorkflowState),
    {
        let Ok(state) = self.session(session) else {
            return false;
        };
        let mut guard = state.lock().await;
        if guard.generation != generation {
            return false;
        }
        mutate(&mut guard);
        true
    }
}

fn search_stage_messages(query: &str) -> Vec<String> {
    vec![
        format!("Searching for vendors matching \"{}\"...", query),
        "Ranking candidates by quality and availability...".to_string(),
        "Compiling contact list of vendors...".to_string(),
    ]
}

fn call_stage_messages(vendors: &[VendorCandidate]) -> Vec<String> {
    let mut messages = vec![
        "I will now call each vendor to find out who has the best prices and will negotiate down as much as possible..."
            .to_string(),
    ];
    for vendor in vendors {
        messages.push(format!("Now calling {}...", vendor.name));
        messages.push(format!("Call in progress with {}...", vendor.name));
    }
    messages
}

fn pick_winner<'a>(
    vendors: &'a [VendorCandidate],
    priority: Option<&str>,
) -> &'a VendorCandidate {
    priority
        .and_then(|name| vendors.iter().find(|v| v.name == name))
        .unwrap_or(&vendors[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PurchasingConfig;
    use crate::services::calls::{CallHandle, MockDialer};
    use crate::services::vendor_search::MockDirectory;
    use assert_matches::assert_matches;

    fn candidates(names: &[&str]) -> Vec<VendorCandidate> {
        names.iter().map(|n| VendorCandidate::named(*n)).collect()
    }

    fn service_with(
        directory: MockDirectory,
        dialer: MockDialer,
        settings: WorkflowSettings,
    ) -> Arc<OrderWorkflowService> {
        Arc::new(OrderWorkflowService::new(
            Arc::new(directory),
            Arc::new(dialer),
            Arc::new(PurchaseOrderGenerator::new(PurchasingConfig::default())),
            Arc::new(InstantPacer),
            settings,
        ))
    }

    async fn wait_for_phase(
        service: &Arc<OrderWorkflowService>,
        session: Uuid,
        phase: WorkflowPhase,
    ) -> WorkflowSnapshot {
        for _ in 0..200 {
            let snap = service.snapshot(session).await.unwrap();
            if snap.phase == phase {
                return snap;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("workflow never reached {:?}", phase);
    }

    #[tokio::test]
    async fn empty_query_is_rejected_without_state_change() {
        let service = service_with(
            MockDirectory::new(),
            MockDialer::new(),
            WorkflowSettings::default(),
        );
        let session = service.create_session();

        let result = service.start_search(session, "   ").await;
        assert_matches!(result, Err(ServiceError::ValidationError(_)));

        let snap = service.snapshot(session).await.unwrap();
        assert_eq!(snap.phase, WorkflowPhase::Idle);
        assert!(snap.search_messages.is_empty());
    }

    #[tokio::test]
    async fn discovery_failure_resets_to_idle_with_no_order() {
        let mut directory = MockDirectory::new();
        directory
            .expect_search()
            .returning(|_| Err(ServiceError::VendorSearchFailed("timeout".into())));
        let service = service_with(directory, MockDialer::new(), WorkflowSettings::default());
        let session = service.create_session();

        service.start_search(session, "ball bearings").await.unwrap();
        let snap = wait_for_phase(&service, session, WorkflowPhase::Idle).await;

        assert!(snap.purchase_order.is_none());
        assert!(snap.vendors.is_empty());
        assert!(snap.search_messages.is_empty());
        assert!(snap.last_error.as_deref().unwrap().contains("timeout"));
    }

    #[tokio::test]
    async fn full_run_issues_order_to_first_candidate() {
        let mut directory = MockDirectory::new();
        directory
            .expect_search()
            .returning(|_| Ok(candidates(&["CNC Solutions Inc", "Precision Spindle Co"])));
        let service = service_with(directory, MockDialer::new(), WorkflowSettings::default());
        let session = service.create_session();

        service.start_search(session, "spindle motors").await.unwrap();
        let snap = wait_for_phase(&service, session, WorkflowPhase::OrderIssued).await;

        let order = snap.purchase_order.expect("order issued");
        assert_eq!(order.vendor.name, "CNC Solutions Inc");
        assert!(order.totals_consistent());
        assert_eq!(snap.search_messages.len(), 3);
        // intro message plus two messages per candidate
        assert_eq!(snap.call_messages.len(), 1 + 2 * snap.vendors.len());
    }

    #[tokio::test]
    async fn house_vendor_is_appended_and_wins_when_priority() {
        let mut directory = MockDirectory::new();
        directory.expect_search().returning(|_| {
            Ok(candidates(&[
                "Industrial Motors Pro",
                "CNC Solutions Inc",
                "Precision Spindle Co",
                "Advanced Machine Parts",
                "Eastern Motors Supply",
            ]))
        });
        let mut dialer = MockDialer::new();
        dialer.expect_initiate_call().returning(|_, _, _| {
            Ok(CallHandle {
                call_id: "call-1".into(),
            })
        });

        let settings = WorkflowSettings {
            house_vendor: Some(VendorCandidate {
                name: "Keystone Supply Co".into(),
                website: None,
                email: Some("orders@keystonesupply.com".into()),
                phone: Some("(215) 555-0188".into()),
            }),
            priority_vendor: Some("Keystone Supply Co".into()),
            ..Default::default()
        };
        let service = service_with(directory, dialer, settings);
        let session = service.create_session();

        service.start_search(session, "ball bearings").await.unwrap();
        let snap = wait_for_phase(&service, session, WorkflowPhase::OrderIssued).await;

        assert_eq!(snap.vendors.len(), 6);
        assert_eq!(snap.vendors.last().unwrap().name, "Keystone Supply Co");
        assert_eq!(
            snap.purchase_order.unwrap().vendor.name,
            "Keystone Supply Co"
        );
    }

    #[tokio::test]
    async fn failed_priority_call_does_not_stall_the_workflow() {
        let mut directory = MockDirectory::new();
        directory
            .expect_search()
            .returning(|_| Ok(candidates(&["Eastern Motors Supply"])));
        let mut dialer = MockDialer::new();
        dialer
            .expect_initiate_call()
            .returning(|_, _, _| Err(ServiceError::CallInitiationFailed("busy".into())));

        let settings = WorkflowSettings {
            house_vendor: Some(VendorCandidate {
                name: "Keystone Supply Co".into(),
                website: None,
                email: None,
                phone: Some("(215) 555-0188".into()),
            }),
            priority_vendor: Some("Keystone Supply Co".into()),
            ..Default::default()
        };
        let service = service_with(directory, dialer, settings);
        let session = service.create_session();

        service.start_search(session, "v-belts").await.unwrap();
        let snap = wait_for_phase(&service, session, WorkflowPhase::OrderIssued).await;
        assert!(snap.purchase_order.is_some());
    }

    #[tokio::test]
    async fn discarded_session_swallows_late_updates() {
        let mut directory = MockDirectory::new();
        directory
            .expect_search()
            .returning(|_| Ok(candidates(&["CNC Solutions Inc"])));
        let service = service_with(directory, MockDialer::new(), WorkflowSettings::default());
        let session = service.create_session();

        service.start_search(session, "spindles").await.unwrap();
        service.discard_session(session).unwrap();

        assert_matches!(
            service.snapshot(session).await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[test]
    fn winner_defaults_to_first_candidate() {
        let vendors = candidates(&["A", "B"]);
        assert_eq!(pick_winner(&vendors, None).name, "A");
        assert_eq!(pick_winner(&vendors, Some("B")).name, "B");
        assert_eq!(pick_winner(&vendors, Some("missing")).name, "A");
    }
}
