//! Approvable domain records and their submission drafts.
//!
//! A draft carries exactly the maker-supplied fields; the workflow engine
//! assigns ids, lifecycle stamps and derived fields when the draft is
//! submitted. Records are what the registries hold afterwards.
use super::types::{
    AccountType, ApplicationType, CalendarDate, CivilStatus, Frequency, FundCategory, HoldingType,
    InstrumentType, ItemStatus, RiskCategory, SipType, TimeStamp,
};
use chrono::Utc;

/// KYC document reference captured at onboarding. The file itself lives in
/// an external document store; only the name and locator are kept here.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    #[n(0)]
    pub name: String,
    #[n(1)]
    pub url: String,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq)]
pub struct Client {
    #[n(0)]
    pub client_id: String,
    #[n(1)]
    pub first_name: String,
    #[n(2)]
    pub middle_name: String,
    #[n(3)]
    pub last_name: String,
    #[n(4)]
    pub tin: String,
    #[n(5)]
    pub dob: CalendarDate,
    #[n(6)]
    pub civil_status: CivilStatus,
    #[n(7)]
    pub nationality: String,
    #[n(8)]
    pub occupation: String,
    #[n(9)]
    pub email: String,
    #[n(10)]
    pub phone: String,
    #[n(11)]
    pub address: String,
    #[n(12)]
    pub relationship_manager: String,
    #[n(13)]
    pub branch_code: String,
    #[n(14)]
    pub risk_profile_score: u32,
    /// Always the deterministic mapping of `risk_profile_score`, never set
    /// independently.
    #[n(15)]
    pub risk_category: RiskCategory,
    #[n(16)]
    pub documents: Vec<Document>,
    #[n(17)]
    pub status: ItemStatus,
    #[n(18)]
    pub submitted_by: String,
    #[n(19)]
    pub submitted_at: TimeStamp<Utc>,
    #[n(20)]
    pub approved_by: Option<String>,
    #[n(21)]
    pub approved_at: Option<TimeStamp<Utc>>,
    #[n(22)]
    pub rejection_reason: Option<String>,
}

impl Client {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Investment account bound to one fund from the (external) catalog. The
/// fund name, category and risk level are copied in at creation time and
/// immutable afterwards; only the balance moves, and only on application
/// approval.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq)]
pub struct Account {
    #[n(0)]
    pub account_id: String,
    #[n(1)]
    pub client_id: String,
    #[n(2)]
    pub account_type: AccountType,
    #[n(3)]
    pub holding_type: HoldingType,
    #[n(4)]
    pub fund_name: String,
    #[n(5)]
    pub fund_category: FundCategory,
    #[n(6)]
    pub risk_level: RiskCategory,
    #[n(7)]
    pub balance: f64,
    #[n(8)]
    pub open_date: CalendarDate,
    #[n(9)]
    pub status: ItemStatus,
    #[n(10)]
    pub submitted_by: String,
    #[n(11)]
    pub submitted_at: TimeStamp<Utc>,
    #[n(12)]
    pub approved_by: Option<String>,
    #[n(13)]
    pub approved_at: Option<TimeStamp<Utc>>,
    #[n(14)]
    pub rejection_reason: Option<String>,
}

/// Buy or sell order against one account.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq)]
pub struct Application {
    #[n(0)]
    pub application_id: String,
    #[n(1)]
    pub client_id: String,
    #[n(2)]
    pub account_id: String,
    #[n(3)]
    pub kind: ApplicationType,
    #[n(4)]
    pub amount: f64,
    /// Fund name snapshotted from the account at submission.
    #[n(5)]
    pub fund: String,
    #[n(6)]
    pub instrument_type: InstrumentType,
    /// Only ever true when a risk mismatch existed at submission and the
    /// maker attached a waiver for it.
    #[n(7)]
    pub waiver_attached: bool,
    #[n(8)]
    pub status: ItemStatus,
    #[n(9)]
    pub submitted_by: String,
    #[n(10)]
    pub submitted_at: TimeStamp<Utc>,
    #[n(11)]
    pub approved_by: Option<String>,
    #[n(12)]
    pub approved_at: Option<TimeStamp<Utc>>,
    #[n(13)]
    pub rejection_reason: Option<String>,
}

/// Systematic investment (SIP) or withdrawal (SWP) plan.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq)]
pub struct SipPlan {
    #[n(0)]
    pub sip_id: String,
    #[n(1)]
    pub client_id: String,
    #[n(2)]
    pub account_id: String,
    #[n(3)]
    pub kind: SipType,
    #[n(4)]
    pub amount: f64,
    #[n(5)]
    pub frequency: Frequency,
    #[n(6)]
    pub start_date: CalendarDate,
    #[n(7)]
    pub end_date: CalendarDate,
    #[n(8)]
    pub step_up_enabled: bool,
    #[n(9)]
    pub step_up_percent: f64,
    /// Annualized expected return in percent.
    #[n(10)]
    pub expected_return: f64,
    #[n(11)]
    pub status: ItemStatus,
    #[n(12)]
    pub submitted_by: String,
    #[n(13)]
    pub submitted_at: TimeStamp<Utc>,
    #[n(14)]
    pub approved_by: Option<String>,
    #[n(15)]
    pub approved_at: Option<TimeStamp<Utc>>,
    #[n(16)]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ClientDraft {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub tin: String,
    pub dob: CalendarDate,
    pub civil_status: CivilStatus,
    pub nationality: String,
    pub occupation: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub relationship_manager: String,
    pub branch_code: String,
    pub risk_profile_score: u32,
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, Default)]
pub struct AccountDraft {
    pub client_id: String,
    pub account_type: AccountType,
    pub holding_type: HoldingType,
    pub fund_name: String,
    pub fund_category: FundCategory,
    pub risk_level: RiskCategory,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationDraft {
    pub client_id: String,
    pub account_id: String,
    pub kind: ApplicationType,
    pub amount: f64,
    pub instrument_type: InstrumentType,
    pub waiver_attached: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SipDraft {
    pub client_id: String,
    pub account_id: String,
    pub kind: SipType,
    pub amount: f64,
    pub frequency: Frequency,
    pub start_date: CalendarDate,
    pub end_date: CalendarDate,
    pub step_up_enabled: bool,
    pub step_up_percent: f64,
    pub expected_return: f64,
}
