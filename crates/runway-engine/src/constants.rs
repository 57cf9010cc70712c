//! Centralized constants for the runway projection engine
//!
//! Thresholds, horizons and seed values shared by every calculation.
//! Per-user data lives in the persistence store, never here.

// =============================================================================
// Projection
// =============================================================================

/// Last month offset simulated by the scenario projector (months 0..=24)
pub const PROJECTION_HORIZON_MONTHS: u32 = 24;

/// Months per year, used for the fractional-year growth exponent
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Floor for the burn denominator of the per-month runway figure
pub const MIN_RUNWAY_DENOMINATOR: f64 = 1.0;

/// Days per month used when turning a runway into a calendar date
pub const DAYS_PER_MONTH: i64 = 30;

// =============================================================================
// Health Score
// =============================================================================

/// Base score when the business is cash-flow positive
pub const HEALTH_BASE_POSITIVE: i32 = 80;

/// Base score when the business burns cash (or breaks even)
pub const HEALTH_BASE_NEGATIVE: i32 = 40;

/// Runway bonuses as (minimum runway exclusive, bonus), checked in order
pub const HEALTH_RUNWAY_BONUSES: [(f64, i32); 3] = [(18.0, 20), (12.0, 10), (6.0, 5)];

/// Scores at or above this are healthy
pub const HEALTH_HEALTHY_MIN: u8 = 70;

/// Scores at or above this (and below healthy) are a warning
pub const HEALTH_WARNING_MIN: u8 = 40;

// =============================================================================
// Runway Alerts (independent of the health score)
// =============================================================================

/// Dashboard alert: runway below this is critical
pub const ALERT_CRITICAL_MONTHS: f64 = 12.0;

/// Dashboard alert: runway below this is a warning
pub const ALERT_WARNING_MONTHS: f64 = 18.0;

/// Runway outlook: below this is critical
pub const OUTLOOK_CRITICAL_MONTHS: f64 = 6.0;

/// Runway outlook: below this is a warning
pub const OUTLOOK_WARNING_MONTHS: f64 = 12.0;

/// Runway outlook: below this calls for caution
pub const OUTLOOK_CAUTION_MONTHS: f64 = 18.0;

/// Planning milestones (month, title)
pub const RUNWAY_MILESTONES: [(u32, &str); 4] = [
    (6, "Series A Preparation"),
    (12, "Product Market Fit"),
    (18, "Scale Operations"),
    (24, "Market Leadership"),
];

// =============================================================================
// Revenue Targets
// =============================================================================

/// Monthly revenue target
pub const TARGET_MONTHLY_REVENUE: f64 = 55_000.0;

/// Quarterly revenue target
pub const TARGET_QUARTERLY_REVENUE: f64 = 165_000.0;

/// Yearly revenue target
pub const TARGET_YEARLY_REVENUE: f64 = 600_000.0;

// =============================================================================
// Display Hints
// =============================================================================

pub const COLOR_BLUE: &str = "#3B82F6";
pub const COLOR_GREEN: &str = "#10B981";
pub const COLOR_AMBER: &str = "#F59E0B";
pub const COLOR_RED: &str = "#EF4444";

// =============================================================================
// Identifiers
// =============================================================================

/// Prefix for identifiers generated without a persistence layer
pub const LOCAL_ID_PREFIX: &str = "local-";
