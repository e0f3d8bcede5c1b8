//! The approval-queue state machine.
//!
//! [`WorkflowState`] owns the four domain registries and the approval queue
//! and is the only writer of entity status and resolution stamps. Every
//! pending entity has exactly one queue entry and vice versa; submission
//! creates both together and resolution updates the entity and removes the
//! entry together, so no caller ever observes them out of step.
use crate::eligibility;
use crate::entities::{
    Account, AccountDraft, Application, ApplicationDraft, Client, ClientDraft, SipDraft, SipPlan,
};
use crate::error::WorkflowError;
use crate::registry::Registry;
use crate::types::{
    risk_category_from_score, ApplicationType, CalendarDate, Decision, ItemStatus, TimeStamp,
};
use crate::utils::new_prefixed_id;
use chrono::{NaiveTime, Utc};
use tracing::{info, warn};

/// Snapshot of the underlying entity taken at submission time. The variant
/// is the queue item's type discriminator; consumers match on it instead of
/// shape-checking a loose payload.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq)]
pub enum EntitySnapshot {
    #[n(0)]
    Client(#[n(0)] Client),
    #[n(1)]
    Account(#[n(0)] Account),
    #[n(2)]
    Application(#[n(0)] Application),
    #[n(3)]
    SipPlan(#[n(0)] SipPlan),
}

impl EntitySnapshot {
    pub fn kind_name(&self) -> &'static str {
        match self {
            EntitySnapshot::Client(_) => "client",
            EntitySnapshot::Account(_) => "account",
            EntitySnapshot::Application(_) => "application",
            EntitySnapshot::SipPlan(_) => "sip plan",
        }
    }
}

/// One entry in the approval queue, awaiting a checker decision.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq)]
pub struct ApprovalItem {
    #[n(0)]
    pub id: String,
    /// Id of the underlying entity in its registry.
    #[n(1)]
    pub item_id: String,
    /// Human-readable summary shown to the checker.
    #[n(2)]
    pub details: String,
    #[n(3)]
    pub submitted_by: String,
    #[n(4)]
    pub submitted_at: TimeStamp<Utc>,
    #[n(5)]
    pub data: EntitySnapshot,
}

/// The whole mutable workflow state: registries plus the approval queue.
///
/// Intended to be owned by a single service instance and mutated under one
/// lock; the methods themselves are synchronous and never perform I/O.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Default)]
pub struct WorkflowState {
    #[n(0)]
    pub clients: Registry<Client>,
    #[n(1)]
    pub accounts: Registry<Account>,
    #[n(2)]
    pub applications: Registry<Application>,
    #[n(3)]
    pub sip_plans: Registry<SipPlan>,
    #[n(4)]
    approvals: Vec<ApprovalItem>,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The queue in submission order.
    pub fn approval_queue(&self) -> &[ApprovalItem] {
        &self.approvals
    }

    fn client_display_name(&self, client_id: &str) -> Result<String, WorkflowError> {
        self.clients
            .get(client_id)
            .map(Client::display_name)
            .ok_or_else(|| WorkflowError::Validation(format!("unknown client id {client_id}")))
    }

    fn enqueue(&mut self, item_id: &str, details: String, data: EntitySnapshot) {
        let (submitted_by, submitted_at) = match &data {
            EntitySnapshot::Client(c) => (c.submitted_by.clone(), c.submitted_at.clone()),
            EntitySnapshot::Account(a) => (a.submitted_by.clone(), a.submitted_at.clone()),
            EntitySnapshot::Application(a) => (a.submitted_by.clone(), a.submitted_at.clone()),
            EntitySnapshot::SipPlan(p) => (p.submitted_by.clone(), p.submitted_at.clone()),
        };
        let item = ApprovalItem {
            id: new_prefixed_id("appr"),
            item_id: item_id.to_owned(),
            details,
            submitted_by,
            submitted_at,
            data,
        };
        info!(approval = %item.id, kind = item.data.kind_name(), "submitted for approval");
        self.approvals.push(item);
    }

    /// Submit a client onboarding for approval.
    pub fn submit_client(
        &mut self,
        draft: ClientDraft,
        submitted_by: &str,
    ) -> Result<String, WorkflowError> {
        if draft.first_name.trim().is_empty() || draft.last_name.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "client first and last name must not be empty".into(),
            ));
        }

        let client_id = new_prefixed_id("client");
        let client = Client {
            client_id: client_id.clone(),
            first_name: draft.first_name,
            middle_name: draft.middle_name,
            last_name: draft.last_name,
            tin: draft.tin,
            dob: draft.dob,
            civil_status: draft.civil_status,
            nationality: draft.nationality,
            occupation: draft.occupation,
            email: draft.email,
            phone: draft.phone,
            address: draft.address,
            relationship_manager: draft.relationship_manager,
            branch_code: draft.branch_code,
            risk_profile_score: draft.risk_profile_score,
            risk_category: risk_category_from_score(draft.risk_profile_score),
            documents: draft.documents,
            status: ItemStatus::Pending,
            submitted_by: submitted_by.to_owned(),
            submitted_at: TimeStamp::new(),
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
        };

        let details = format!("New Client: {}", client.display_name());
        self.enqueue(&client_id, details, EntitySnapshot::Client(client.clone()));
        self.clients.insert(client);
        Ok(client_id)
    }

    /// Submit a new account for approval. The balance always opens at zero;
    /// only approved applications move it.
    pub fn submit_account(
        &mut self,
        draft: AccountDraft,
        submitted_by: &str,
    ) -> Result<String, WorkflowError> {
        let client_name = self.client_display_name(&draft.client_id)?;

        let account_id = new_prefixed_id("acct");
        let account = Account {
            account_id: account_id.clone(),
            client_id: draft.client_id,
            account_type: draft.account_type,
            holding_type: draft.holding_type,
            fund_name: draft.fund_name,
            fund_category: draft.fund_category,
            risk_level: draft.risk_level,
            balance: 0.0,
            open_date: CalendarDate::today(),
            status: ItemStatus::Pending,
            submitted_by: submitted_by.to_owned(),
            submitted_at: TimeStamp::new(),
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
        };

        let details = format!("New {} for {}", account.account_type, client_name);
        self.enqueue(&account_id, details, EntitySnapshot::Account(account.clone()));
        self.accounts.insert(account);
        Ok(account_id)
    }

    /// Submit a buy/sell application. Runs the eligibility gates first —
    /// cut-off for the account's fund category against `now` (local civil
    /// time), then the risk-mismatch waiver check — and creates nothing if
    /// either gate fails.
    pub fn submit_application(
        &mut self,
        draft: ApplicationDraft,
        submitted_by: &str,
        now: NaiveTime,
    ) -> Result<String, WorkflowError> {
        let (client_name, client_risk) = self
            .clients
            .get(&draft.client_id)
            .map(|c| (c.display_name(), c.risk_category))
            .ok_or_else(|| {
                WorkflowError::Validation(format!("unknown client id {}", draft.client_id))
            })?;
        let account = self.accounts.get(&draft.account_id).ok_or_else(|| {
            WorkflowError::Validation(format!("unknown account id {}", draft.account_id))
        })?;
        if account.client_id != draft.client_id {
            return Err(WorkflowError::Validation(format!(
                "account {} does not belong to client {}",
                draft.account_id, draft.client_id
            )));
        }
        if draft.amount <= 0.0 {
            return Err(WorkflowError::Validation(
                "application amount must be positive".into(),
            ));
        }

        eligibility::check_cutoff(account.fund_category, now)?;
        let waiver_in_force =
            eligibility::check_risk_waiver(account.risk_level, client_risk, draft.waiver_attached)?;

        let application_id = new_prefixed_id("appl");
        let application = Application {
            application_id: application_id.clone(),
            client_id: draft.client_id,
            account_id: draft.account_id,
            kind: draft.kind,
            amount: draft.amount,
            fund: account.fund_name.clone(),
            instrument_type: draft.instrument_type,
            waiver_attached: waiver_in_force,
            status: ItemStatus::Pending,
            submitted_by: submitted_by.to_owned(),
            submitted_at: TimeStamp::new(),
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
        };

        let details = format!(
            "{} {} for {}",
            application.kind, application.amount, client_name
        );
        self.enqueue(
            &application_id,
            details,
            EntitySnapshot::Application(application.clone()),
        );
        self.applications.insert(application);
        Ok(application_id)
    }

    /// Submit a SIP/SWP plan for approval.
    pub fn submit_sip_plan(
        &mut self,
        draft: SipDraft,
        submitted_by: &str,
    ) -> Result<String, WorkflowError> {
        let client_name = self.client_display_name(&draft.client_id)?;
        let account = self.accounts.get(&draft.account_id).ok_or_else(|| {
            WorkflowError::Validation(format!("unknown account id {}", draft.account_id))
        })?;
        if account.client_id != draft.client_id {
            return Err(WorkflowError::Validation(format!(
                "account {} does not belong to client {}",
                draft.account_id, draft.client_id
            )));
        }
        if draft.amount <= 0.0 {
            return Err(WorkflowError::Validation(
                "plan amount must be positive".into(),
            ));
        }

        let sip_id = new_prefixed_id("sip");
        let plan = SipPlan {
            sip_id: sip_id.clone(),
            client_id: draft.client_id,
            account_id: draft.account_id,
            kind: draft.kind,
            amount: draft.amount,
            frequency: draft.frequency,
            start_date: draft.start_date,
            end_date: draft.end_date,
            step_up_enabled: draft.step_up_enabled,
            step_up_percent: draft.step_up_percent,
            expected_return: draft.expected_return,
            status: ItemStatus::Pending,
            submitted_by: submitted_by.to_owned(),
            submitted_at: TimeStamp::new(),
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
        };

        let details = format!("New {} for {}", plan.kind, client_name);
        self.enqueue(&sip_id, details, EntitySnapshot::SipPlan(plan.clone()));
        self.sip_plans.insert(plan);
        Ok(sip_id)
    }

    /// Apply the checker's decision to a queued item.
    ///
    /// On approve the entity moves to its terminal-success status (`Active`,
    /// or `Approved` for applications) and an approved application also moves
    /// the linked account balance. On reject the entity moves to `Rejected`
    /// and keeps the operator's reason. Either way the queue entry goes; an
    /// unknown id is a no-op `NotFound`. All lookups happen before any
    /// mutation, so a failed resolution leaves the state untouched.
    pub fn resolve(
        &mut self,
        approval_id: &str,
        decision: Decision,
        actor: &str,
    ) -> Result<(), WorkflowError> {
        let index = self
            .approvals
            .iter()
            .position(|item| item.id == approval_id)
            .ok_or_else(|| WorkflowError::NotFound(approval_id.to_owned()))?;
        let item_id = self.approvals[index].item_id.clone();
        let now = TimeStamp::new();

        match &self.approvals[index].data {
            EntitySnapshot::Client(_) => {
                let client = self.clients.get_mut(&item_id).ok_or_else(|| {
                    WorkflowError::Validation(format!("approval references missing client {item_id}"))
                })?;
                apply_resolution(
                    &mut client.status,
                    &mut client.approved_by,
                    &mut client.approved_at,
                    &mut client.rejection_reason,
                    &decision,
                    actor,
                    now,
                    ItemStatus::Active,
                );
            }
            EntitySnapshot::Account(_) => {
                let account = self.accounts.get_mut(&item_id).ok_or_else(|| {
                    WorkflowError::Validation(format!(
                        "approval references missing account {item_id}"
                    ))
                })?;
                apply_resolution(
                    &mut account.status,
                    &mut account.approved_by,
                    &mut account.approved_at,
                    &mut account.rejection_reason,
                    &decision,
                    actor,
                    now,
                    ItemStatus::Active,
                );
            }
            EntitySnapshot::SipPlan(_) => {
                let plan = self.sip_plans.get_mut(&item_id).ok_or_else(|| {
                    WorkflowError::Validation(format!(
                        "approval references missing sip plan {item_id}"
                    ))
                })?;
                apply_resolution(
                    &mut plan.status,
                    &mut plan.approved_by,
                    &mut plan.approved_at,
                    &mut plan.rejection_reason,
                    &decision,
                    actor,
                    now,
                    ItemStatus::Active,
                );
            }
            EntitySnapshot::Application(_) => {
                let (account_id, amount, kind) = {
                    let app = self.applications.get(&item_id).ok_or_else(|| {
                        WorkflowError::Validation(format!(
                            "approval references missing application {item_id}"
                        ))
                    })?;
                    (app.account_id.clone(), app.amount, app.kind)
                };
                if matches!(decision, Decision::Approve) && !self.accounts.contains(&account_id) {
                    return Err(WorkflowError::Validation(format!(
                        "application {item_id} references missing account {account_id}"
                    )));
                }

                let app = self.applications.get_mut(&item_id).ok_or_else(|| {
                    WorkflowError::Validation(format!(
                        "approval references missing application {item_id}"
                    ))
                })?;
                let approving = matches!(decision, Decision::Approve);
                apply_resolution(
                    &mut app.status,
                    &mut app.approved_by,
                    &mut app.approved_at,
                    &mut app.rejection_reason,
                    &decision,
                    actor,
                    now,
                    ItemStatus::Approved,
                );

                if approving {
                    if let Some(account) = self.accounts.get_mut(&account_id) {
                        account.balance += match kind {
                            ApplicationType::Buy => amount,
                            ApplicationType::Sell => -amount,
                        };
                        // no floor is applied on settlement; a sell can
                        // overdraw the account, so at least make it loud
                        if account.balance < 0.0 {
                            warn!(
                                account = %account_id,
                                balance = account.balance,
                                "sell approval drove account balance negative"
                            );
                        }
                    }
                }
            }
        }

        let item = self.approvals.remove(index);
        info!(
            approval = %item.id,
            kind = item.data.kind_name(),
            approved = matches!(decision, Decision::Approve),
            "approval resolved"
        );
        Ok(())
    }
}

fn apply_resolution(
    status: &mut ItemStatus,
    approved_by: &mut Option<String>,
    approved_at: &mut Option<TimeStamp<Utc>>,
    rejection_reason: &mut Option<String>,
    decision: &Decision,
    actor: &str,
    at: TimeStamp<Utc>,
    success: ItemStatus,
) {
    // approved_by/approved_at double as resolver stamps on rejection
    *approved_by = Some(actor.to_owned());
    *approved_at = Some(at);
    match decision {
        Decision::Approve => *status = success,
        Decision::Reject { reason } => {
            *status = ItemStatus::Rejected;
            *rejection_reason = reason.clone();
        }
    }
}
