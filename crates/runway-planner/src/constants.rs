//! File names and defaults for the planner CLI
//!
//! Calculation constants live in `runway_engine::constants`.

// =============================================================================
// File Names
// =============================================================================

/// Default config file path
pub const CONFIG_FILE: &str = "config.toml";

/// SQLite database filename (inside the data directory)
pub const DATABASE_FILENAME: &str = "planner.sqlite";

/// Month-by-month projection CSV filename
pub const PROJECTION_FILENAME: &str = "projection.csv";

/// Expense breakdown CSV filename
pub const EXPENSE_BREAKDOWN_FILENAME: &str = "expense_breakdown.csv";

/// Summary CSV filename
pub const SUMMARY_FILENAME: &str = "summary.csv";

// =============================================================================
// Defaults
// =============================================================================

/// Report heading when none is configured
pub const DEFAULT_REPORT_TITLE: &str = "Financial Runway Report";

/// Busy timeout for the SQLite connection (ms)
pub const SQLITE_BUSY_TIMEOUT_MS: u32 = 5000;

/// Default log filter when neither RUST_LOG nor --verbose is given
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Log filter used with --verbose
pub const VERBOSE_LOG_FILTER: &str = "runway_engine=debug,runway_planner=debug,warn";
