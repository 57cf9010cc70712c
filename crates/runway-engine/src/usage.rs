//! Per-user usage counters
//!
//! Counters only ever go up. They reset together with the parameter snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A usage counter that can be incremented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageCounter {
    SessionsCount,
    ScenariosRun,
    ReportsGenerated,
}

impl UsageCounter {
    pub const ALL: [UsageCounter; 3] = [
        UsageCounter::SessionsCount,
        UsageCounter::ScenariosRun,
        UsageCounter::ReportsGenerated,
    ];

    /// Field name in the stored usage document
    pub fn field_name(&self) -> &'static str {
        match self {
            UsageCounter::SessionsCount => "sessionsCount",
            UsageCounter::ScenariosRun => "scenariosRun",
            UsageCounter::ReportsGenerated => "reportsGenerated",
        }
    }
}

impl std::fmt::Display for UsageCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetrics {
    #[serde(default)]
    pub sessions_count: u64,
    #[serde(default)]
    pub scenarios_run: u64,
    #[serde(default)]
    pub reports_generated: u64,
    #[serde(default = "Utc::now")]
    pub last_active: DateTime<Utc>,
}

impl UsageMetrics {
    /// Metrics for a session that has just started
    pub fn new_session(now: DateTime<Utc>) -> Self {
        Self {
            sessions_count: 1,
            scenarios_run: 0,
            reports_generated: 0,
            last_active: now,
        }
    }

    pub fn get(&self, counter: UsageCounter) -> u64 {
        match counter {
            UsageCounter::SessionsCount => self.sessions_count,
            UsageCounter::ScenariosRun => self.scenarios_run,
            UsageCounter::ReportsGenerated => self.reports_generated,
        }
    }

    /// Bump one counter and stamp the activity time
    pub fn increment(&mut self, counter: UsageCounter, now: DateTime<Utc>) {
        let slot = match counter {
            UsageCounter::SessionsCount => &mut self.sessions_count,
            UsageCounter::ScenariosRun => &mut self.scenarios_run,
            UsageCounter::ReportsGenerated => &mut self.reports_generated,
        };
        *slot = slot.saturating_add(1);
        self.last_active = now;
    }
}
