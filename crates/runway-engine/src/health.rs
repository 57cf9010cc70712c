//! Composite 0-100 cash-flow health score
//!
//! Thresholds here are separate from the runway alerts in [`crate::runway`].

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::params::BusinessParameters;
use crate::runway::net_cash_flow;

/// Health tier derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    pub fn from_score(score: u8) -> Self {
        if score >= constants::HEALTH_HEALTHY_MIN {
            HealthStatus::Healthy
        } else if score >= constants::HEALTH_WARNING_MIN {
            HealthStatus::Warning
        } else {
            HealthStatus::Critical
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "Healthy"),
            HealthStatus::Warning => write!(f, "Warning"),
            HealthStatus::Critical => write!(f, "Critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScore {
    pub score: u8,
    pub status: HealthStatus,
}

/// Score the business from its cash-flow sign and runway
pub fn score(params: &BusinessParameters, runway_months: f64) -> HealthScore {
    let base = if net_cash_flow(params) > 0.0 {
        constants::HEALTH_BASE_POSITIVE
    } else {
        constants::HEALTH_BASE_NEGATIVE
    };
    let bonus = constants::HEALTH_RUNWAY_BONUSES
        .iter()
        .find(|(min, _)| runway_months > *min)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0);

    let score = (base + bonus).clamp(0, 100) as u8;
    HealthScore {
        score,
        status: HealthStatus::from_score(score),
    }
}
