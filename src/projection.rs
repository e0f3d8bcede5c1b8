//! Systematic investment projection calculator.
//!
//! A pure, deterministic compounding simulator: one record per elapsed
//! calendar month between the plan's start and end dates, tracking a
//! standard contribution stream next to an optional annually stepped-up
//! stream. Whatever the plan frequency, the simulation steps at a monthly
//! cadence with the plan amount as the per-period contribution.
use crate::entities::SipPlan;
use crate::types::Frequency;
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, PartialEq)]
pub struct SipParameters {
    pub amount: f64,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Annualized expected return in percent.
    pub expected_return: f64,
    pub step_up_enabled: bool,
    pub step_up_percent: f64,
}

impl From<&SipPlan> for SipParameters {
    fn from(plan: &SipPlan) -> Self {
        Self {
            amount: plan.amount,
            frequency: plan.frequency,
            start_date: plan.start_date.naive(),
            end_date: plan.end_date.naive(),
            expected_return: plan.expected_return,
            step_up_enabled: plan.step_up_enabled,
            step_up_percent: plan.step_up_percent,
        }
    }
}

/// One simulated month. Monetary fields are rounded to 2 decimals at
/// emission; the running state compounds unrounded.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionPoint {
    pub period: u32,
    pub standard_value: f64,
    pub step_up_value: f64,
    pub total_standard_contributed: f64,
    pub total_step_up_contributed: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whole calendar months from `start` to `end`; a trailing fractional month
/// is dropped.
fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    let mut months =
        (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32);
    if end.day() < start.day() {
        months -= 1;
    }
    months.max(0) as u32
}

pub fn project(params: &SipParameters) -> Vec<ProjectionPoint> {
    let monthly_rate = params.expected_return / 100.0 / 12.0;
    let total_months = months_between(params.start_date, params.end_date);

    let mut standard_value = 0.0;
    let mut step_up_value = 0.0;
    let mut total_standard = 0.0;
    let mut total_step_up = 0.0;
    let mut step_up_amount = params.amount;

    let mut points = Vec::with_capacity(total_months as usize);
    for month in 1..=total_months {
        standard_value = (standard_value + params.amount) * (1.0 + monthly_rate);
        total_standard += params.amount;

        // contribution steps up once per anniversary, compounding annually
        if params.step_up_enabled && month > 1 && (month - 1) % 12 == 0 {
            step_up_amount *= 1.0 + params.step_up_percent / 100.0;
        }
        step_up_value = (step_up_value + step_up_amount) * (1.0 + monthly_rate);
        total_step_up += step_up_amount;

        points.push(ProjectionPoint {
            period: month,
            standard_value: round2(standard_value),
            step_up_value: if params.step_up_enabled {
                round2(step_up_value)
            } else {
                round2(standard_value)
            },
            total_standard_contributed: round2(total_standard),
            total_step_up_contributed: if params.step_up_enabled {
                round2(total_step_up)
            } else {
                round2(total_standard)
            },
        });
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly_plan(start: NaiveDate, end: NaiveDate) -> SipParameters {
        SipParameters {
            amount: 10_000.0,
            frequency: Frequency::Monthly,
            start_date: start,
            end_date: end,
            expected_return: 8.0,
            step_up_enabled: false,
            step_up_percent: 0.0,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn one_year_plan_emits_twelve_periods() {
        let params = monthly_plan(date(2024, 1, 1), date(2025, 1, 1));
        let points = project(&params);

        assert_eq!(points.len(), 12);
        assert_eq!(points.first().unwrap().period, 1);
        assert_eq!(points.last().unwrap().period, 12);
    }

    #[test]
    fn standard_value_strictly_increases() {
        let params = monthly_plan(date(2024, 1, 1), date(2025, 1, 1));
        let points = project(&params);

        for pair in points.windows(2) {
            assert!(pair[1].standard_value > pair[0].standard_value);
        }
    }

    #[test]
    fn first_period_compounds_one_contribution() {
        let params = monthly_plan(date(2024, 1, 1), date(2025, 1, 1));
        let points = project(&params);

        // 10_000 * (1 + 0.08 / 12), rounded at emission
        assert_eq!(points[0].standard_value, 10_066.67);
        assert_eq!(points[0].total_standard_contributed, 10_000.0);
    }

    #[test]
    fn disabled_step_up_mirrors_standard_track() {
        let params = monthly_plan(date(2024, 1, 1), date(2027, 1, 1));
        for point in project(&params) {
            assert_eq!(point.step_up_value, point.standard_value);
            assert_eq!(
                point.total_step_up_contributed,
                point.total_standard_contributed
            );
        }
    }

    #[test]
    fn step_up_kicks_in_at_month_thirteen() {
        let mut params = monthly_plan(date(2024, 1, 1), date(2026, 1, 1));
        params.step_up_enabled = true;
        params.step_up_percent = 10.0;

        let points = project(&params);
        assert_eq!(points.len(), 24);

        // identical tracks through the first year
        for point in &points[..12] {
            assert_eq!(point.step_up_value, point.standard_value);
        }
        // month 13 contributes 11_000 instead of 10_000
        assert!(points[12].step_up_value > points[12].standard_value);
        assert_eq!(points[12].total_step_up_contributed, 131_000.0);
        assert_eq!(points[12].total_standard_contributed, 130_000.0);
    }

    #[test]
    fn step_up_compounds_annually() {
        let mut params = monthly_plan(date(2024, 1, 1), date(2027, 1, 1));
        params.step_up_enabled = true;
        params.step_up_percent = 10.0;

        let points = project(&params);
        // year-3 contribution is 10_000 * 1.1^2 = 12_100
        let year3_contribution =
            points[24].total_step_up_contributed - points[23].total_step_up_contributed;
        assert!((year3_contribution - 12_100.0).abs() < 0.01);
    }

    #[test]
    fn fractional_trailing_month_is_dropped() {
        let params = monthly_plan(date(2024, 1, 15), date(2025, 1, 1));
        assert_eq!(project(&params).len(), 11);
    }

    #[test]
    fn end_before_start_yields_nothing() {
        let params = monthly_plan(date(2025, 1, 1), date(2024, 1, 1));
        assert!(project(&params).is_empty());
    }

    #[test]
    fn zero_return_accumulates_plain_contributions() {
        let mut params = monthly_plan(date(2024, 1, 1), date(2025, 1, 1));
        params.expected_return = 0.0;

        let points = project(&params);
        assert_eq!(points.last().unwrap().standard_value, 120_000.0);
        assert_eq!(points.last().unwrap().total_standard_contributed, 120_000.0);
    }
}
