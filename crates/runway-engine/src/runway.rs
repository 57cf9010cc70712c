//! Runway length, net burn and runway-only alerts
//!
//! Alert tiers here are independent of the health score in [`crate::health`].

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::expenses::total_expenses;
use crate::params::BusinessParameters;

/// Monthly net burn: total expenses minus revenue (positive means cash drains)
pub fn net_burn(params: &BusinessParameters) -> f64 {
    total_expenses(params) - params.monthly_revenue
}

/// Monthly net cash flow: revenue minus total expenses
pub fn net_cash_flow(params: &BusinessParameters) -> f64 {
    -net_burn(params)
}

/// Months of runway at the current net burn
///
/// Returns `f64::INFINITY` at break-even or when profitable. Not rounded.
pub fn runway_months(params: &BusinessParameters) -> f64 {
    let burn = net_burn(params);
    if burn > 0.0 {
        params.current_cash / burn
    } else {
        f64::INFINITY
    }
}

/// Estimated date the cash runs out
///
/// `None` for an infinite runway or one too long to land on a calendar date.
pub fn cash_out_date(runway: f64, today: NaiveDate) -> Option<NaiveDate> {
    if !runway.is_finite() {
        return None;
    }
    let days = (runway * constants::DAYS_PER_MONTH as f64).round() as i64;
    Duration::try_days(days).and_then(|d| today.checked_add_signed(d))
}

/// Format a runway for display ("6.8 months" or "∞")
pub fn format_runway(runway: f64) -> String {
    if runway.is_finite() {
        format!("{:.1} months", runway)
    } else {
        "∞".to_string()
    }
}

/// Dashboard runway alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunwayAlert {
    Critical,
    Warning,
    Healthy,
}

impl RunwayAlert {
    pub fn from_runway(runway: f64) -> Self {
        if runway < constants::ALERT_CRITICAL_MONTHS {
            RunwayAlert::Critical
        } else if runway < constants::ALERT_WARNING_MONTHS {
            RunwayAlert::Warning
        } else {
            RunwayAlert::Healthy
        }
    }
}

impl std::fmt::Display for RunwayAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunwayAlert::Critical => write!(f, "Critical"),
            RunwayAlert::Warning => write!(f, "Warning"),
            RunwayAlert::Healthy => write!(f, "Healthy"),
        }
    }
}

/// Four-tier runway outlook used by the runway analysis view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunwayOutlook {
    Critical,
    Warning,
    Caution,
    Healthy,
}

impl RunwayOutlook {
    pub fn from_runway(runway: f64) -> Self {
        if runway < constants::OUTLOOK_CRITICAL_MONTHS {
            RunwayOutlook::Critical
        } else if runway < constants::OUTLOOK_WARNING_MONTHS {
            RunwayOutlook::Warning
        } else if runway < constants::OUTLOOK_CAUTION_MONTHS {
            RunwayOutlook::Caution
        } else {
            RunwayOutlook::Healthy
        }
    }
}

impl std::fmt::Display for RunwayOutlook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunwayOutlook::Critical => write!(f, "Critical"),
            RunwayOutlook::Warning => write!(f, "Warning"),
            RunwayOutlook::Caution => write!(f, "Caution"),
            RunwayOutlook::Healthy => write!(f, "Healthy"),
        }
    }
}

/// Whether the runway covers a planning milestone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MilestoneStatus {
    Safe,
    Critical,
    Warning,
    Caution,
    Neutral,
}

/// A planning milestone checked against the current runway
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Milestone {
    pub month: u32,
    pub title: &'static str,
    pub status: MilestoneStatus,
}

/// Check each planning milestone against the runway
///
/// A milestone is safe when the runway strictly exceeds its month; otherwise
/// the status escalates with how soon the milestone falls.
pub fn milestones(runway: f64) -> Vec<Milestone> {
    constants::RUNWAY_MILESTONES
        .iter()
        .map(|&(month, title)| {
            let status = if runway > f64::from(month) {
                MilestoneStatus::Safe
            } else {
                match month {
                    0..=6 => MilestoneStatus::Critical,
                    7..=12 => MilestoneStatus::Warning,
                    13..=18 => MilestoneStatus::Caution,
                    _ => MilestoneStatus::Neutral,
                }
            };
            Milestone {
                month,
                title,
                status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_params() -> BusinessParameters {
        BusinessParameters {
            current_cash: 500_000.0,
            monthly_revenue: 50_000.0,
            monthly_expenses: 35_000.0,
            growth_rate: 15.0,
            team_size: 8,
            average_salary: 8_000.0,
            marketing_budget: 10_000.0,
            operational_expenses: 15_000.0,
        }
    }

    #[test]
    fn test_finite_runway() {
        let params = reference_params();
        assert_eq!(net_burn(&params), 74_000.0);
        let runway = runway_months(&params);
        assert_eq!(runway, 500_000.0 / 74_000.0);
        assert!((runway - 6.76).abs() < 0.01);
    }

    #[test]
    fn test_break_even_is_infinite() {
        let params = BusinessParameters {
            monthly_revenue: 124_000.0,
            ..reference_params()
        };
        assert_eq!(net_burn(&params), 0.0);
        assert_eq!(runway_months(&params), f64::INFINITY);
    }

    #[test]
    fn test_profitable_is_infinite() {
        let params = BusinessParameters {
            monthly_revenue: 200_000.0,
            current_cash: 0.0,
            ..reference_params()
        };
        assert!(runway_months(&params).is_infinite());
        assert_eq!(net_cash_flow(&params), 76_000.0);
    }

    #[test]
    fn test_zero_cash_with_burn_is_zero_runway() {
        let params = BusinessParameters {
            current_cash: 0.0,
            ..reference_params()
        };
        assert_eq!(runway_months(&params), 0.0);
    }

    #[test]
    fn test_cash_out_date() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(
            cash_out_date(2.0, today),
            NaiveDate::from_ymd_opt(2026, 3, 2)
        );
        assert_eq!(cash_out_date(f64::INFINITY, today), None);
    }

    #[test]
    fn test_cash_out_date_beyond_calendar() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(cash_out_date(1e13, today), None);
        assert_eq!(cash_out_date(1e8, today), None);

        // Revenue a hair under expenses: finite but enormous runway
        let params = BusinessParameters {
            current_cash: 1e9,
            monthly_revenue: 123_999.9999,
            ..reference_params()
        };
        let runway = runway_months(&params);
        assert!(runway.is_finite());
        assert_eq!(cash_out_date(runway, today), None);
    }

    #[test]
    fn test_format_runway() {
        assert_eq!(format_runway(6.7567), "6.8 months");
        assert_eq!(format_runway(f64::INFINITY), "∞");
    }

    #[test]
    fn test_alert_tiers() {
        assert_eq!(RunwayAlert::from_runway(6.76), RunwayAlert::Critical);
        assert_eq!(RunwayAlert::from_runway(12.0), RunwayAlert::Warning);
        assert_eq!(RunwayAlert::from_runway(17.9), RunwayAlert::Warning);
        assert_eq!(RunwayAlert::from_runway(18.0), RunwayAlert::Healthy);
        assert_eq!(RunwayAlert::from_runway(f64::INFINITY), RunwayAlert::Healthy);
    }

    #[test]
    fn test_outlook_tiers() {
        assert_eq!(RunwayOutlook::from_runway(5.9), RunwayOutlook::Critical);
        assert_eq!(RunwayOutlook::from_runway(6.76), RunwayOutlook::Warning);
        assert_eq!(RunwayOutlook::from_runway(15.0), RunwayOutlook::Caution);
        assert_eq!(RunwayOutlook::from_runway(30.0), RunwayOutlook::Healthy);
    }

    #[test]
    fn test_milestones() {
        let statuses: Vec<_> = milestones(13.0).into_iter().map(|m| m.status).collect();
        assert_eq!(
            statuses,
            vec![
                MilestoneStatus::Safe,
                MilestoneStatus::Safe,
                MilestoneStatus::Caution,
                MilestoneStatus::Neutral,
            ]
        );

        let all_safe = milestones(f64::INFINITY)
            .iter()
            .all(|m| m.status == MilestoneStatus::Safe);
        assert!(all_safe);

        assert_eq!(milestones(6.0)[0].status, MilestoneStatus::Critical);
    }
}
