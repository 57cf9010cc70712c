//! Input handed to report renderers
//!
//! Rendering itself (CSV, PDF, narrative text) lives outside the engine.
//! Nothing flows back from a renderer into the planner.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::expenses::ExpenseBreakdown;
use crate::health::HealthScore;
use crate::params::BusinessParameters;
use crate::revenue::{RevenueStream, RevenueSummary};
use crate::scenario::ScenarioResult;
use crate::team::TeamSummary;

/// Everything a report needs, computed from one parameter snapshot
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput {
    pub parameters: BusinessParameters,
    pub results: Vec<ScenarioResult>,
    pub breakdown: [ExpenseBreakdown; 4],
    pub total_expenses: f64,
    /// Infinite when break-even or profitable
    #[serde(serialize_with = "serialize_runway")]
    pub runway_months: f64,
    pub health: HealthScore,
    pub revenue: RevenueSummary,
    pub streams: Vec<RevenueStream>,
    pub team: TeamSummary,
    pub generated_at: DateTime<Utc>,
}

/// Produces a document from a [`ReportInput`]
pub trait ReportRenderer {
    type Output;
    type Error;

    fn render(&self, input: &ReportInput) -> Result<Self::Output, Self::Error>;
}

/// JSON has no infinity; an infinite runway serializes as null
fn serialize_runway<S: serde::Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_none()
    }
}
