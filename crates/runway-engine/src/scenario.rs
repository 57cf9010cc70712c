//! Month-by-month cash projection
//!
//! Revenue compounds from the starting baseline using a fractional-year
//! exponent (`(1 + rate)^(month / 12)`), recomputed for each month rather than
//! chained. Expenses stay at the current run-rate for the whole horizon.
//! The projection stops at the first month whose closing cash is at or below
//! zero, that month included.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::expenses::total_expenses;
use crate::params::BusinessParameters;

/// One simulated month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    /// Month offset from now (0 = current month)
    pub month: u32,
    /// Revenue, rounded to the whole currency unit
    pub revenue: f64,
    /// Expenses, rounded to the whole currency unit
    pub expenses: f64,
    /// Cumulative cash at month end, rounded to the whole currency unit
    pub cash_balance: f64,
    /// Runway implied by this month's burn, one decimal place
    pub runway_months: f64,
}

/// Project the cash trajectory for months 0 through the horizon
///
/// Pure over the snapshot: identical parameters give identical results.
/// Always yields at least month 0.
pub fn project(params: &BusinessParameters) -> Vec<ScenarioResult> {
    let expenses = total_expenses(params);
    let growth = 1.0 + params.growth_rate / 100.0;
    let mut cash_balance = params.current_cash;
    let mut results = Vec::with_capacity(constants::PROJECTION_HORIZON_MONTHS as usize + 1);

    for month in 0..=constants::PROJECTION_HORIZON_MONTHS {
        let years = f64::from(month) / constants::MONTHS_PER_YEAR;
        let revenue = params.monthly_revenue * growth.powf(years);
        cash_balance += revenue - expenses;

        let runway = if cash_balance > 0.0 {
            let burn = (expenses - revenue).max(constants::MIN_RUNWAY_DENOMINATOR);
            (cash_balance / burn).max(0.0)
        } else {
            0.0
        };

        results.push(ScenarioResult {
            month,
            revenue: round_half_up(revenue),
            expenses: round_half_up(expenses),
            cash_balance: round_half_up(cash_balance),
            runway_months: round_half_up(runway * 10.0) / 10.0,
        });

        if cash_balance <= 0.0 {
            break;
        }
    }

    results
}

/// First month whose closing cash is at or below zero, if any
pub fn depletion_month(results: &[ScenarioResult]) -> Option<u32> {
    results
        .iter()
        .find(|r| r.cash_balance <= 0.0)
        .map(|r| r.month)
}

/// Round to the nearest integer, halves toward positive infinity
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_projection_depletes_in_month_six() {
        let results = project(&BusinessParameters::default());

        assert_eq!(results.len(), 7);
        assert_eq!(
            results[0],
            ScenarioResult {
                month: 0,
                revenue: 50_000.0,
                expenses: 124_000.0,
                cash_balance: 426_000.0,
                runway_months: 5.8,
            }
        );
        assert_eq!(results[1].revenue, 50_586.0);
        assert_eq!(results[1].cash_balance, 352_586.0);
        assert_eq!(results[5].runway_months, 0.9);

        let last = results.last().unwrap();
        assert_eq!(last.month, 6);
        assert_eq!(last.cash_balance, -5_456.0);
        assert_eq!(last.runway_months, 0.0);
        assert_eq!(depletion_month(&results), Some(6));
    }

    #[test]
    fn test_profitable_runs_full_horizon() {
        let params = BusinessParameters {
            monthly_revenue: 150_000.0,
            ..Default::default()
        };
        let results = project(&params);

        assert_eq!(results.len(), 25);
        assert_eq!(results.last().unwrap().month, 24);
        assert_eq!(depletion_month(&results), None);
        // cash-flow positive: denominator floored at 1
        assert_eq!(results[0].runway_months, 526_000.0);
    }

    #[test]
    fn test_termination_property() {
        let cases = [
            (10_000.0, 0.0, 5_000.0),
            (1_000_000.0, 20.0, 80_000.0),
            (250_000.0, -20.0, 100_000.0),
            (2_000_000.0, 50.0, 30_000.0),
        ];
        for (cash, growth, revenue) in cases {
            let params = BusinessParameters {
                current_cash: cash,
                growth_rate: growth,
                monthly_revenue: revenue,
                ..Default::default()
            };
            let results = project(&params);
            let last = results.last().unwrap();
            assert!(last.cash_balance <= 0.0 || results.len() == 25);
            for (i, r) in results.iter().enumerate() {
                assert_eq!(r.month, i as u32);
            }
        }
    }

    #[test]
    fn test_immediate_depletion_yields_month_zero_only() {
        let params = BusinessParameters {
            current_cash: 0.0,
            ..Default::default()
        };
        let results = project(&params);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].cash_balance, -74_000.0);
        assert_eq!(results[0].runway_months, 0.0);
    }

    #[test]
    fn test_growth_compounds_from_baseline() {
        let params = BusinessParameters {
            monthly_revenue: 100_000.0,
            growth_rate: 100.0,
            current_cash: 10_000_000.0,
            ..Default::default()
        };
        let results = project(&params);
        assert_eq!(results[12].revenue, 200_000.0);
        assert_eq!(results[24].revenue, 400_000.0);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let params = BusinessParameters {
            growth_rate: 7.3,
            monthly_revenue: 61_234.5,
            ..Default::default()
        };
        assert_eq!(project(&params), project(&params));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-5_456.2), -5_456.0);
    }
}
