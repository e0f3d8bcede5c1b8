//! Shared domain vocabulary: lifecycle status, classifications and the
//! timestamp/date wrappers used across the registries.
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use std::fmt;

/// Lifecycle status shared by every approvable record.
///
/// `Pending` is the only non-terminal state. Clients, accounts and plans
/// become `Active` on approval; buy/sell applications become `Approved`.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    #[n(0)]
    Pending,
    #[n(1)]
    Active,
    #[n(2)]
    Approved,
    #[n(3)]
    Rejected,
    #[n(4)]
    Closed,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CivilStatus {
    #[default]
    #[n(0)]
    Single,
    #[n(1)]
    Married,
    #[n(2)]
    Widowed,
    #[n(3)]
    Separated,
}

/// The two fund-vehicle kinds offered by the trust desk.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountType {
    #[default]
    #[n(0)]
    Uitf,
    #[n(1)]
    Ima,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountType::Uitf => write!(f, "UITF"),
            AccountType::Ima => write!(f, "IMA"),
        }
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoldingType {
    #[default]
    #[n(0)]
    Single,
    #[n(1)]
    Joint,
    #[n(2)]
    InTrustFor,
}

/// Risk classification applied both to clients (derived from their profile
/// score) and to funds. `Balanced` only ever appears on funds.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RiskCategory {
    #[default]
    #[n(0)]
    Conservative,
    #[n(1)]
    Moderate,
    #[n(2)]
    Balanced,
    #[n(3)]
    Aggressive,
}

impl RiskCategory {
    /// Ordering used by the mismatch gate. Moderate and Balanced rank equal.
    pub fn ordinal(&self) -> u8 {
        match self {
            RiskCategory::Conservative => 1,
            RiskCategory::Moderate | RiskCategory::Balanced => 2,
            RiskCategory::Aggressive => 3,
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskCategory::Conservative => "Conservative",
            RiskCategory::Moderate => "Moderate",
            RiskCategory::Balanced => "Balanced",
            RiskCategory::Aggressive => "Aggressive",
        };
        write!(f, "{name}")
    }
}

/// Maps a risk questionnaire score to the client's category.
pub fn risk_category_from_score(score: u32) -> RiskCategory {
    if score <= 35 {
        RiskCategory::Conservative
    } else if score <= 70 {
        RiskCategory::Moderate
    } else {
        RiskCategory::Aggressive
    }
}

/// Fund catalog category bound onto an account at creation time. Drives the
/// daily cut-off applied to orders against that account.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FundCategory {
    #[default]
    #[n(0)]
    FixedIncome,
    #[n(1)]
    Balanced,
    #[n(2)]
    Equity,
    #[n(3)]
    MoneyMarket,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplicationType {
    #[default]
    #[n(0)]
    Buy,
    #[n(1)]
    Sell,
}

impl fmt::Display for ApplicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationType::Buy => write!(f, "Buy"),
            ApplicationType::Sell => write!(f, "Sell"),
        }
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstrumentType {
    #[n(0)]
    Cash,
    #[default]
    #[n(1)]
    Casa,
    #[n(2)]
    Check,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SipType {
    #[default]
    #[n(0)]
    Sip,
    #[n(1)]
    Swp,
}

impl fmt::Display for SipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SipType::Sip => write!(f, "SIP"),
            SipType::Swp => write!(f, "SWP"),
        }
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Frequency {
    #[default]
    #[n(0)]
    Monthly,
    #[n(1)]
    Quarterly,
}

/// Checker's verdict on a queued approval item. The rejection reason is
/// free-text from the operator and is stamped onto the rejected entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject { reason: Option<String> },
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl<T: TimeZone + PartialEq> PartialOrd for TimeStamp<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl<T: TimeZone + Eq> Ord for TimeStamp<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .unwrap()
            .into()
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
    pub fn date_naive(&self) -> NaiveDate {
        self.0.date_naive()
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

/// Date-only wrapper for birth dates, account open dates and plan windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct CalendarDate(pub NaiveDate);

impl CalendarDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Self {
        Self(NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }
    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }
    pub fn naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(value: NaiveDate) -> Self {
        CalendarDate(value)
    }
}

impl<C> minicbor::Encode<C> for CalendarDate {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.i32(self.0.num_days_from_ce())?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for CalendarDate {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let days = d.i32()?;

        NaiveDate::from_num_days_from_ce_opt(days)
            .map(CalendarDate)
            .ok_or(minicbor::decode::Error::message(
                "day count out of range for a calendar date",
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_encoding() {
        let original = TimeStamp::new();

        let encoding = minicbor::to_vec(original.clone()).unwrap();
        let decode: TimeStamp<Utc> = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn calendar_date_encoding() {
        let original = CalendarDate::from_ymd(2024, 6, 15);

        let encoding = minicbor::to_vec(original).unwrap();
        let decode: CalendarDate = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn score_bands_map_to_categories() {
        assert_eq!(risk_category_from_score(0), RiskCategory::Conservative);
        assert_eq!(risk_category_from_score(35), RiskCategory::Conservative);
        assert_eq!(risk_category_from_score(36), RiskCategory::Moderate);
        assert_eq!(risk_category_from_score(70), RiskCategory::Moderate);
        assert_eq!(risk_category_from_score(71), RiskCategory::Aggressive);
    }

    #[test]
    fn moderate_and_balanced_share_an_ordinal() {
        assert_eq!(
            RiskCategory::Moderate.ordinal(),
            RiskCategory::Balanced.ordinal()
        );
        assert!(RiskCategory::Aggressive.ordinal() > RiskCategory::Moderate.ordinal());
        assert!(RiskCategory::Conservative.ordinal() < RiskCategory::Balanced.ordinal());
    }
}
