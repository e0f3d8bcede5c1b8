//! Pre-submission gates for buy/sell applications: daily cut-off times and
//! the risk-mismatch waiver requirement. All checks are pure; callers supply
//! the current local civil time.
use crate::error::EligibilityError;
use crate::types::{FundCategory, RiskCategory};
use chrono::{Duration, NaiveTime};

/// Daily cut-off for the given fund category, in local civil time.
/// Money-market instruments close half an hour ahead of everything else.
pub fn cutoff_for(category: FundCategory) -> NaiveTime {
    match category {
        FundCategory::MoneyMarket => NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
        _ => NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
    }
}

/// Rejects submissions at or after the applicable cut-off for the day.
pub fn check_cutoff(category: FundCategory, now: NaiveTime) -> Result<(), EligibilityError> {
    if now >= cutoff_for(category) {
        return Err(EligibilityError::PastCutoff);
    }
    Ok(())
}

/// Remaining time until the applicable cut-off, for caller display. `None`
/// once the cut-off has passed.
pub fn time_until_cutoff(category: FundCategory, now: NaiveTime) -> Option<Duration> {
    let cutoff = cutoff_for(category);
    if now >= cutoff {
        return None;
    }
    Some(cutoff - now)
}

/// A mismatch exists when the fund is riskier than the client's assessed
/// profile. Equal or lower fund risk never mismatches.
pub fn is_risk_mismatch(fund_risk: RiskCategory, client_risk: RiskCategory) -> bool {
    fund_risk.ordinal() > client_risk.ordinal()
}

/// A mismatched order needs a waiver attached. Returns whether the waiver is
/// actually in force (a waiver supplied without a mismatch is ignored).
pub fn check_risk_waiver(
    fund_risk: RiskCategory,
    client_risk: RiskCategory,
    waiver_attached: bool,
) -> Result<bool, EligibilityError> {
    let mismatch = is_risk_mismatch(fund_risk, client_risk);
    if mismatch && !waiver_attached {
        return Err(EligibilityError::WaiverRequired);
    }
    Ok(mismatch && waiver_attached)
}

/// Combined gate result surfaced to callers before they submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityReport {
    pub allowed: bool,
    pub reason: Option<EligibilityError>,
    pub until_cutoff: Option<Duration>,
}

/// Runs both gates in submission order: cut-off first, then risk/waiver.
pub fn evaluate(
    category: FundCategory,
    fund_risk: RiskCategory,
    client_risk: RiskCategory,
    waiver_attached: bool,
    now: NaiveTime,
) -> EligibilityReport {
    let until_cutoff = time_until_cutoff(category, now);

    if let Err(reason) = check_cutoff(category, now) {
        return EligibilityReport {
            allowed: false,
            reason: Some(reason),
            until_cutoff,
        };
    }
    if let Err(reason) = check_risk_waiver(fund_risk, client_risk, waiver_attached) {
        return EligibilityReport {
            allowed: false,
            reason: Some(reason),
            until_cutoff,
        };
    }

    EligibilityReport {
        allowed: true,
        reason: None,
        until_cutoff,
    }
}
