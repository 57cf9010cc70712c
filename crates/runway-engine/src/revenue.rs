//! Revenue streams and their headline totals

use serde::{Deserialize, Serialize};

use crate::constants;

/// Kind of revenue stream
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RevenueStreamKind {
    Subscription,
    OneTime,
    UsageBased,
    Commission,
}

impl std::fmt::Display for RevenueStreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevenueStreamKind::Subscription => write!(f, "subscription"),
            RevenueStreamKind::OneTime => write!(f, "one-time"),
            RevenueStreamKind::UsageBased => write!(f, "usage-based"),
            RevenueStreamKind::Commission => write!(f, "commission"),
        }
    }
}

impl std::str::FromStr for RevenueStreamKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "subscription" => Ok(RevenueStreamKind::Subscription),
            "one-time" | "onetime" => Ok(RevenueStreamKind::OneTime),
            "usage-based" | "usage" => Ok(RevenueStreamKind::UsageBased),
            "commission" => Ok(RevenueStreamKind::Commission),
            other => Err(format!(
                "unknown revenue stream type '{}' (expected subscription, one-time, usage-based or commission)",
                other
            )),
        }
    }
}

/// Revenue stream fields, without the identifier assigned on creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRevenueStream {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RevenueStreamKind,
    pub monthly_revenue: f64,
    pub customers: u32,
    pub average_value: f64,
    /// Percent
    pub growth_rate: f64,
    pub color: String,
}

/// An independently tracked source of revenue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueStream {
    pub id: String,
    #[serde(flatten)]
    pub fields: NewRevenueStream,
}

impl RevenueStream {
    pub fn new(id: impl Into<String>, fields: NewRevenueStream) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, update: &RevenueStreamUpdate) {
        let f = &mut self.fields;
        if let Some(v) = &update.name {
            f.name = v.clone();
        }
        if let Some(v) = update.kind {
            f.kind = v;
        }
        if let Some(v) = update.monthly_revenue {
            f.monthly_revenue = v;
        }
        if let Some(v) = update.customers {
            f.customers = v;
        }
        if let Some(v) = update.average_value {
            f.average_value = v;
        }
        if let Some(v) = update.growth_rate {
            f.growth_rate = v;
        }
        if let Some(v) = &update.color {
            f.color = v.clone();
        }
    }
}

/// Partial update of a revenue stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueStreamUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<RevenueStreamKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_revenue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customers: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Headline totals across all revenue streams
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub total_revenue: f64,
    pub total_customers: u64,
    /// Revenue-weighted mean growth rate; 0 when total revenue is 0
    pub average_growth_rate: f64,
    /// Revenue per customer; 0 when there are no customers
    pub average_revenue_per_customer: f64,
    pub stream_count: usize,
}

/// Aggregate a collection of revenue streams
pub fn summarize(streams: &[RevenueStream]) -> RevenueSummary {
    let total_revenue = total_revenue(streams);
    let total_customers: u64 = streams.iter().map(|s| u64::from(s.fields.customers)).sum();

    RevenueSummary {
        total_revenue,
        total_customers,
        average_growth_rate: average_growth_rate(streams),
        average_revenue_per_customer: if total_customers > 0 {
            total_revenue / total_customers as f64
        } else {
            0.0
        },
        stream_count: streams.len(),
    }
}

/// Sum of monthly revenue across streams
pub fn total_revenue(streams: &[RevenueStream]) -> f64 {
    streams.iter().map(|s| s.fields.monthly_revenue).sum()
}

/// Revenue-weighted mean growth rate
///
/// Returns 0.0 instead of NaN when the collection is empty or total revenue
/// is zero.
pub fn average_growth_rate(streams: &[RevenueStream]) -> f64 {
    let total = total_revenue(streams);
    if total == 0.0 {
        return 0.0;
    }
    streams
        .iter()
        .map(|s| s.fields.growth_rate * (s.fields.monthly_revenue / total))
        .sum()
}

/// Progress toward a revenue target
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevenueTarget {
    pub period: &'static str,
    pub target: f64,
    pub actual: f64,
    pub achieved: bool,
}

/// Monthly, quarterly and yearly targets against the current run-rate
pub fn revenue_targets(total_revenue: f64) -> [RevenueTarget; 3] {
    let target = |period: &'static str, target: f64, actual: f64| RevenueTarget {
        period,
        target,
        actual,
        achieved: actual >= target,
    };
    [
        target("This Month", constants::TARGET_MONTHLY_REVENUE, total_revenue),
        target(
            "This Quarter",
            constants::TARGET_QUARTERLY_REVENUE,
            total_revenue * 3.0,
        ),
        target(
            "This Year",
            constants::TARGET_YEARLY_REVENUE,
            total_revenue * 12.0,
        ),
    ]
}

/// Streams seeded for first-time users
pub fn default_streams() -> Vec<NewRevenueStream> {
    vec![
        NewRevenueStream {
            name: "SaaS Subscriptions".to_string(),
            kind: RevenueStreamKind::Subscription,
            monthly_revenue: 35_000.0,
            customers: 450,
            average_value: 78.0,
            growth_rate: 15.0,
            color: constants::COLOR_BLUE.to_string(),
        },
        NewRevenueStream {
            name: "Enterprise Contracts".to_string(),
            kind: RevenueStreamKind::OneTime,
            monthly_revenue: 12_000.0,
            customers: 8,
            average_value: 1_500.0,
            growth_rate: 25.0,
            color: constants::COLOR_GREEN.to_string(),
        },
        NewRevenueStream {
            name: "API Usage".to_string(),
            kind: RevenueStreamKind::UsageBased,
            monthly_revenue: 8_500.0,
            customers: 120,
            average_value: 71.0,
            growth_rate: 30.0,
            color: constants::COLOR_AMBER.to_string(),
        },
    ]
}
