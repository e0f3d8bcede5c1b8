//! Read-only projections over the workflow state: dashboard counters, the
//! client 360 view, report filters and AML alerts. Nothing here mutates;
//! every view is recomputed on demand from `&WorkflowState`.
use crate::eligibility::is_risk_mismatch;
use crate::engine::WorkflowState;
use crate::entities::{Account, Application, Client, SipPlan};
use crate::types::InstrumentType;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Cash orders strictly above this amount show up as AML alerts.
pub const AML_CASH_THRESHOLD: f64 = 500_000.0;

/// Trailing window for the dashboard's recent-applications counter.
pub const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_clients: usize,
    pub total_accounts: usize,
    pub pending_approvals: usize,
    pub recent_applications: usize,
}

pub fn dashboard_stats(state: &WorkflowState, now: DateTime<Utc>) -> DashboardStats {
    let window_start = now - Duration::days(RECENT_WINDOW_DAYS);
    DashboardStats {
        total_clients: state.clients.len(),
        total_accounts: state.accounts.len(),
        pending_approvals: state.approval_queue().len(),
        recent_applications: state
            .applications
            .iter()
            .filter(|app| app.submitted_at.to_datetime_utc() > window_start)
            .count(),
    }
}

/// Everything the desk needs about one client, in one lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientView {
    pub client: Client,
    pub accounts: Vec<Account>,
    /// Newest first.
    pub applications: Vec<Application>,
    pub sip_plans: Vec<SipPlan>,
}

pub fn client_view(state: &WorkflowState, client_id: &str) -> Option<ClientView> {
    let client = state.clients.get(client_id)?.clone();

    let accounts = state
        .accounts
        .iter()
        .filter(|a| a.client_id == client_id)
        .cloned()
        .collect();
    let mut applications: Vec<Application> = state
        .applications
        .iter()
        .filter(|a| a.client_id == client_id)
        .cloned()
        .collect();
    applications.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    let sip_plans = state
        .sip_plans
        .iter()
        .filter(|p| p.client_id == client_id)
        .cloned()
        .collect();

    Some(ClientView {
        client,
        accounts,
        applications,
        sip_plans,
    })
}

/// Report filters, matched against the application's submission date and the
/// owning client's relationship manager and branch. Unset fields match
/// everything; date bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct ReportFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub relationship_manager: Option<String>,
    pub branch_code: Option<String>,
}

impl ReportFilters {
    fn matches(&self, app: &Application, client: &Client) -> bool {
        let date = app.submitted_at.date_naive();
        if self.start_date.is_some_and(|start| date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| date > end) {
            return false;
        }
        if self
            .relationship_manager
            .as_deref()
            .is_some_and(|rm| client.relationship_manager != rm)
        {
            return false;
        }
        if self
            .branch_code
            .as_deref()
            .is_some_and(|branch| client.branch_code != branch)
        {
            return false;
        }
        true
    }
}

/// Applications passing the filters. Orders whose client is unknown are
/// dropped rather than reported half-joined.
pub fn filter_applications(state: &WorkflowState, filters: &ReportFilters) -> Vec<Application> {
    state
        .applications
        .iter()
        .filter(|app| {
            state
                .clients
                .get(&app.client_id)
                .is_some_and(|client| filters.matches(app, client))
        })
        .cloned()
        .collect()
}

/// Applications whose account risk exceeds the owning client's profile,
/// joined with that client.
pub fn risk_mismatch_report(state: &WorkflowState) -> Vec<(Application, Client)> {
    state
        .applications
        .iter()
        .filter_map(|app| {
            let client = state.clients.get(&app.client_id)?;
            let account = state.accounts.get(&app.account_id)?;
            is_risk_mismatch(account.risk_level, client.risk_category)
                .then(|| (app.clone(), client.clone()))
        })
        .collect()
}

/// Cash-instrument applications above the AML threshold, within the filters.
pub fn aml_alerts(state: &WorkflowState, filters: &ReportFilters) -> Vec<Application> {
    filter_applications(state, filters)
        .into_iter()
        .filter(|app| app.instrument_type == InstrumentType::Cash && app.amount > AML_CASH_THRESHOLD)
        .collect()
}
