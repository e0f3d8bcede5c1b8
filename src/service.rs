//! Service layer API for the maker/checker workflow.
//!
//! Owns the mutable [`WorkflowState`] behind a single lock, so `submit` and
//! `resolve` are mutually exclusive and the pending/queue correspondence can
//! never be observed mid-transition. When opened over a sled database every
//! successful mutation is committed before the call returns.
use crate::eligibility::{self, EligibilityReport};
use crate::engine::{ApprovalItem, WorkflowState};
use crate::entities::{AccountDraft, Application, ApplicationDraft, Client, ClientDraft, SipDraft};
use crate::projection::{self, ProjectionPoint, SipParameters};
use crate::store;
use crate::types::Decision;
use crate::views::{self, ClientView, DashboardStats, ReportFilters};
use anyhow::Context;
use chrono::{Local, NaiveTime, Utc};
use sled::Db;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct WorkflowService {
    state: Mutex<WorkflowState>,
    instance: Option<Arc<Db>>,
}

impl WorkflowService {
    /// Purely in-memory service; nothing survives the process.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WorkflowState::new()),
            instance: None,
        }
    }

    /// Service backed by a sled database. Restores prior state if present.
    pub fn open(instance: Arc<Db>) -> anyhow::Result<Self> {
        let state = store::load(&instance)
            .context("failed to restore workflow state")?
            .unwrap_or_default();
        Ok(Self {
            state: Mutex::new(state),
            instance: Some(instance),
        })
    }

    fn lock(&self) -> MutexGuard<'_, WorkflowState> {
        self.state.lock().expect("workflow state lock poisoned")
    }

    fn commit(&self, state: &WorkflowState) -> anyhow::Result<()> {
        if let Some(db) = &self.instance {
            store::save(db, state).context("failed to persist workflow state")?;
        }
        Ok(())
    }

    pub fn submit_client(&self, draft: ClientDraft, submitted_by: &str) -> anyhow::Result<String> {
        let mut state = self.lock();
        let id = state.submit_client(draft, submitted_by)?;
        self.commit(&state)?;
        Ok(id)
    }

    pub fn submit_account(&self, draft: AccountDraft, submitted_by: &str) -> anyhow::Result<String> {
        let mut state = self.lock();
        let id = state.submit_account(draft, submitted_by)?;
        self.commit(&state)?;
        Ok(id)
    }

    /// Submits a buy/sell application, gated against the current local
    /// civil time.
    pub fn submit_application(
        &self,
        draft: ApplicationDraft,
        submitted_by: &str,
    ) -> anyhow::Result<String> {
        self.submit_application_at(draft, submitted_by, Local::now().time())
    }

    /// Same as [`submit_application`](Self::submit_application) with an
    /// explicit submission time, for callers that carry their own clock.
    pub fn submit_application_at(
        &self,
        draft: ApplicationDraft,
        submitted_by: &str,
        now: NaiveTime,
    ) -> anyhow::Result<String> {
        let mut state = self.lock();
        let id = state.submit_application(draft, submitted_by, now)?;
        self.commit(&state)?;
        Ok(id)
    }

    pub fn submit_sip_plan(&self, draft: SipDraft, submitted_by: &str) -> anyhow::Result<String> {
        let mut state = self.lock();
        let id = state.submit_sip_plan(draft, submitted_by)?;
        self.commit(&state)?;
        Ok(id)
    }

    /// Applies a checker decision to one queued approval item.
    pub fn resolve(
        &self,
        approval_id: &str,
        decision: Decision,
        actor: &str,
    ) -> anyhow::Result<()> {
        let mut state = self.lock();
        state.resolve(approval_id, decision, actor)?;
        self.commit(&state)?;
        Ok(())
    }

    /// The approval queue in submission order.
    pub fn approval_queue(&self) -> Vec<ApprovalItem> {
        self.lock().approval_queue().to_vec()
    }

    /// Runs the eligibility gates for a prospective order against the given
    /// account, without submitting anything.
    pub fn check_eligibility(
        &self,
        account_id: &str,
        waiver_attached: bool,
        now: NaiveTime,
    ) -> anyhow::Result<EligibilityReport> {
        let state = self.lock();
        let account = state
            .accounts
            .get(account_id)
            .with_context(|| format!("unknown account id {account_id}"))?;
        let client_risk = state
            .clients
            .get(&account.client_id)
            .with_context(|| format!("unknown client id {}", account.client_id))?
            .risk_category;

        Ok(eligibility::evaluate(
            account.fund_category,
            account.risk_level,
            client_risk,
            waiver_attached,
            now,
        ))
    }

    /// Stateless passthrough to the projection calculator.
    pub fn project_sip(&self, params: &SipParameters) -> Vec<ProjectionPoint> {
        projection::project(params)
    }

    pub fn dashboard_stats(&self) -> DashboardStats {
        views::dashboard_stats(&self.lock(), Utc::now())
    }

    pub fn client_view(&self, client_id: &str) -> Option<ClientView> {
        views::client_view(&self.lock(), client_id)
    }

    pub fn report(&self, filters: &ReportFilters) -> Vec<Application> {
        views::filter_applications(&self.lock(), filters)
    }

    pub fn aml_alerts(&self, filters: &ReportFilters) -> Vec<Application> {
        views::aml_alerts(&self.lock(), filters)
    }

    /// Applications sitting on accounts riskier than their client's profile.
    pub fn risk_mismatches(&self) -> Vec<(Application, Client)> {
        views::risk_mismatch_report(&self.lock())
    }
}

impl Default for WorkflowService {
    fn default() -> Self {
        Self::new()
    }
}
