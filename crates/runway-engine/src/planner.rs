//! Per-user planning session
//!
//! [`Planner`] owns the parameter snapshot and everything derived from it,
//! plus the revenue streams, team and usage counters. Callers hold it
//! directly and pass it where needed.
//!
//! Persistence is optimistic: in-memory state changes first, then the write
//! is spawned on the Tokio runtime and the caller moves on. Failed background
//! writes are logged and dropped, never retried or rolled back. Writes run in
//! the order they were issued; [`Planner::flush`] waits for the outstanding
//! ones.
//!
//! Whether anything is persisted is decided in one place,
//! [`Planner::persistence`]: only in live mode, with a signed-in user and a
//! configured store.

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::expenses::{self, ExpenseBreakdown};
use crate::health::{self, HealthScore};
use crate::params::{BusinessParameters, ParameterUpdate};
use crate::report::ReportInput;
use crate::revenue::{self, NewRevenueStream, RevenueStream, RevenueStreamUpdate, RevenueSummary};
use crate::runway::{self, RunwayAlert};
use crate::scenario::{self, ScenarioResult};
use crate::store::{CollectionKind, DocumentKind, NullStore, Store, local_id, not_found};
use crate::team::{self, MemberStatus, NewTeamMember, TeamMember, TeamSummary};
use crate::usage::{UsageCounter, UsageMetrics};

/// Session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Real data, persisted when a user is signed in
    #[default]
    Live,
    /// Sample data, never persisted
    Demo,
}

/// Store handle and user id for one persistence call
struct Persistence {
    store: Arc<dyn Store>,
    user_id: String,
}

pub struct Planner {
    store: Arc<dyn Store>,
    user_id: Option<String>,
    mode: Mode,
    params: BusinessParameters,
    results: Vec<ScenarioResult>,
    usage: UsageMetrics,
    streams: Vec<RevenueStream>,
    team: Vec<TeamMember>,
    last_write: Option<JoinHandle<()>>,
}

impl Planner {
    pub fn new(store: Arc<dyn Store>, user_id: Option<String>) -> Self {
        Self {
            store,
            user_id,
            mode: Mode::Live,
            params: BusinessParameters::default(),
            results: Vec::new(),
            usage: UsageMetrics::new_session(Utc::now()),
            streams: Vec::new(),
            team: Vec::new(),
            last_write: None,
        }
    }

    /// Planner with no identity and no persistence
    pub fn standalone() -> Self {
        Self::new(Arc::new(NullStore), None)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn parameters(&self) -> &BusinessParameters {
        &self.params
    }

    /// Current projection, empty until one has run
    ///
    /// Once run, it is re-projected on every parameter change.
    pub fn results(&self) -> &[ScenarioResult] {
        &self.results
    }

    pub fn usage(&self) -> &UsageMetrics {
        &self.usage
    }

    pub fn streams(&self) -> &[RevenueStream] {
        &self.streams
    }

    pub fn team(&self) -> &[TeamMember] {
        &self.team
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// True when writes reach the store
    pub fn is_persistent(&self) -> bool {
        self.persistence().is_some()
    }

    fn persistence(&self) -> Option<Persistence> {
        if self.mode == Mode::Demo || !self.store.is_configured() {
            return None;
        }
        self.user_id.as_ref().map(|user_id| Persistence {
            store: Arc::clone(&self.store),
            user_id: user_id.clone(),
        })
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Pull the user's state from the store, seeding defaults for new users
    ///
    /// Without persistence the seeded defaults are kept locally. Read
    /// failures are logged and fall back to local defaults.
    pub async fn load(&mut self) {
        let Some(p) = self.persistence() else {
            debug!("no persistence, using local defaults");
            self.seed_local();
            return;
        };

        match p.store.get(&p.user_id, DocumentKind::FinancialData).await {
            Ok(Some(doc)) => match serde_json::from_value(doc) {
                Ok(params) => {
                    self.params = params;
                    self.refresh_results();
                }
                Err(e) => warn!(error = %e, "stored financial data is malformed, using defaults"),
            },
            Ok(None) => {
                info!(user = %p.user_id, "no financial data yet, saving defaults");
                let update = ParameterUpdate::from_parameters(&self.params);
                if let Err(e) = save_update(&p, &update).await {
                    warn!(error = %e, "failed to save default financial data");
                }
            }
            Err(e) => warn!(error = %e, "failed to load financial data"),
        }

        self.usage = match p.store.get(&p.user_id, DocumentKind::UsageMetrics).await {
            Ok(Some(doc)) => serde_json::from_value(doc).unwrap_or_else(|e| {
                warn!(error = %e, "stored usage metrics are malformed");
                fresh_usage()
            }),
            Ok(None) => fresh_usage(),
            Err(e) => {
                warn!(error = %e, "failed to load usage metrics");
                fresh_usage()
            }
        };
        self.track_usage(UsageCounter::SessionsCount);

        self.streams = load_collection(
            &p,
            CollectionKind::RevenueStreams,
            revenue::default_streams(),
            |id, fields| RevenueStream::new(id, fields),
        )
        .await;
        self.team = load_collection(
            &p,
            CollectionKind::TeamMembers,
            team::default_members(),
            |id, fields| TeamMember::new(id, fields),
        )
        .await;
    }

    fn seed_local(&mut self) {
        self.streams = revenue::default_streams()
            .into_iter()
            .map(|fields| RevenueStream::new(local_id(), fields))
            .collect();
        self.team = team::default_members()
            .into_iter()
            .map(|fields| TeamMember::new(local_id(), fields))
            .collect();
    }

    // =========================================================================
    // Parameters & Projection
    // =========================================================================

    /// Merge a partial update into the snapshot and persist it in the background
    pub fn update_parameters(&mut self, update: ParameterUpdate) {
        if update.is_empty() {
            return;
        }
        self.params.apply(&update);
        self.refresh_results();
        if let Some(p) = self.persistence() {
            self.spawn_write("financial data save", async move {
                save_update(&p, &update).await
            });
        }
    }

    /// Overwrite every parameter with the defaults
    pub fn restore_default_parameters(&mut self) {
        self.update_parameters(ParameterUpdate::from_parameters(
            &BusinessParameters::default(),
        ));
    }

    /// Recompute the projection, replacing any previous results
    pub fn calculate_scenario(&mut self) -> &[ScenarioResult] {
        self.results = scenario::project(&self.params);
        debug!(months = self.results.len(), "scenario recalculated");
        self.track_usage(UsageCounter::ScenariosRun);
        &self.results
    }

    /// Re-project an existing projection against the current snapshot
    fn refresh_results(&mut self) {
        if !self.results.is_empty() {
            self.results = scenario::project(&self.params);
        }
    }

    pub fn expense_breakdown(&self) -> [ExpenseBreakdown; 4] {
        expenses::breakdown(&self.params)
    }

    pub fn total_expenses(&self) -> f64 {
        expenses::total_expenses(&self.params)
    }

    pub fn runway_months(&self) -> f64 {
        runway::runway_months(&self.params)
    }

    pub fn runway_alert(&self) -> RunwayAlert {
        RunwayAlert::from_runway(self.runway_months())
    }

    pub fn health(&self) -> HealthScore {
        health::score(&self.params, self.runway_months())
    }

    // =========================================================================
    // Usage
    // =========================================================================

    /// Bump a usage counter locally and in the store
    pub fn track_usage(&mut self, counter: UsageCounter) {
        self.usage.increment(counter, Utc::now());
        if let Some(p) = self.persistence() {
            self.spawn_write("usage counter increment", async move {
                p.store.increment_counter(&p.user_id, counter).await
            });
        }
    }

    /// Bundle the current state for a report renderer
    ///
    /// Runs the projection first when none has been run yet, and counts one
    /// generated report.
    pub fn prepare_report(&mut self) -> ReportInput {
        if self.results.is_empty() {
            self.calculate_scenario();
        }
        self.track_usage(UsageCounter::ReportsGenerated);

        ReportInput {
            parameters: self.params,
            results: self.results.clone(),
            breakdown: self.expense_breakdown(),
            total_expenses: self.total_expenses(),
            runway_months: self.runway_months(),
            health: self.health(),
            revenue: self.revenue_summary(),
            streams: self.streams.clone(),
            team: self.team_summary(),
            generated_at: Utc::now(),
        }
    }

    // =========================================================================
    // Session Lifecycle
    // =========================================================================

    /// Restore default parameters, drop results and restart usage counters
    ///
    /// Local only; nothing is written to the store.
    pub fn reset(&mut self) {
        self.params = BusinessParameters::default();
        self.results.clear();
        self.usage = UsageMetrics::new_session(Utc::now());
    }

    pub fn sign_out(&mut self) {
        self.user_id = None;
        self.reset();
        self.seed_local();
    }

    /// Switch between demo and live data
    ///
    /// Entering demo mode swaps in sample data and stops persistence.
    /// Leaving it reloads the user's stored state.
    pub async fn set_demo_mode(&mut self, enabled: bool) {
        let mode = if enabled { Mode::Demo } else { Mode::Live };
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.reset();
        if enabled {
            self.seed_local();
        } else {
            self.load().await;
        }
    }

    // =========================================================================
    // Revenue Streams
    // =========================================================================

    pub fn revenue_summary(&self) -> RevenueSummary {
        revenue::summarize(&self.streams)
    }

    /// Add a stream; falls back to a local id when the store is absent or fails
    pub async fn add_stream(&mut self, fields: NewRevenueStream) -> RevenueStream {
        let id = self
            .insert_record(CollectionKind::RevenueStreams, &fields)
            .await;
        let stream = RevenueStream::new(id, fields);
        self.streams.push(stream.clone());
        self.sync_revenue();
        stream
    }

    pub async fn update_stream(&mut self, id: &str, update: RevenueStreamUpdate) -> StoreResult<()> {
        let index = position(&self.streams, |s| s.id == id, CollectionKind::RevenueStreams, id)?;
        if let Some(p) = self.persistence() {
            let partial = serde_json::to_value(&update)?;
            p.store
                .update(&p.user_id, CollectionKind::RevenueStreams, id, partial)
                .await?;
        }
        self.streams[index].apply(&update);
        self.sync_revenue();
        Ok(())
    }

    pub async fn delete_stream(&mut self, id: &str) -> StoreResult<()> {
        let index = position(&self.streams, |s| s.id == id, CollectionKind::RevenueStreams, id)?;
        if let Some(p) = self.persistence() {
            p.store
                .delete(&p.user_id, CollectionKind::RevenueStreams, id)
                .await?;
        }
        self.streams.remove(index);
        self.sync_revenue();
        Ok(())
    }

    /// Push the stream total into the parameter snapshot
    fn sync_revenue(&mut self) {
        let total = revenue::total_revenue(&self.streams);
        self.update_parameters(ParameterUpdate {
            monthly_revenue: Some(total),
            ..Default::default()
        });
    }

    // =========================================================================
    // Team
    // =========================================================================

    pub fn team_summary(&self) -> TeamSummary {
        team::summarize(&self.team)
    }

    /// Add a member; falls back to a local id when the store is absent or fails
    pub async fn add_member(&mut self, fields: NewTeamMember) -> TeamMember {
        let id = self.insert_record(CollectionKind::TeamMembers, &fields).await;
        let member = TeamMember::new(id, fields);
        self.team.push(member.clone());
        self.sync_team();
        member
    }

    pub async fn set_member_status(&mut self, id: &str, status: MemberStatus) -> StoreResult<()> {
        let index = position(&self.team, |m| m.id == id, CollectionKind::TeamMembers, id)?;
        if let Some(p) = self.persistence() {
            let partial = serde_json::json!({ "status": status });
            p.store
                .update(&p.user_id, CollectionKind::TeamMembers, id, partial)
                .await?;
        }
        self.team[index].fields.status = status;
        self.sync_team();
        Ok(())
    }

    pub async fn delete_member(&mut self, id: &str) -> StoreResult<()> {
        let index = position(&self.team, |m| m.id == id, CollectionKind::TeamMembers, id)?;
        if let Some(p) = self.persistence() {
            p.store
                .delete(&p.user_id, CollectionKind::TeamMembers, id)
                .await?;
        }
        self.team.remove(index);
        self.sync_team();
        Ok(())
    }

    /// Push active headcount and average salary into the parameter snapshot
    fn sync_team(&mut self) {
        let update = self.team_summary().parameter_update();
        self.update_parameters(update);
    }

    // =========================================================================
    // Background Writes
    // =========================================================================

    /// Wait for every background write issued so far
    pub async fn flush(&mut self) {
        if let Some(task) = self.last_write.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "background write task aborted");
            }
        }
    }

    async fn insert_record<T: Serialize>(&self, collection: CollectionKind, fields: &T) -> String {
        let Some(p) = self.persistence() else {
            return local_id();
        };
        let result = match serde_json::to_value(fields) {
            Ok(record) => p.store.insert(&p.user_id, collection, record).await,
            Err(e) => Err(StoreError::from(e)),
        };
        result.unwrap_or_else(|e| {
            warn!(error = %e, collection = collection.as_str(), "insert failed, keeping record locally");
            local_id()
        })
    }

    /// Spawn a write that runs after all previously issued writes
    fn spawn_write<F>(&mut self, what: &'static str, write: F)
    where
        F: Future<Output = StoreResult<()>> + Send + 'static,
    {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime, dropping {}", what);
            return;
        };
        let previous = self.last_write.take();
        self.last_write = Some(runtime.spawn(async move {
            if let Some(previous) = previous {
                if let Err(e) = previous.await {
                    warn!(error = %e, "earlier background write task aborted");
                }
            }
            if let Err(e) = write.await {
                warn!(error = %e, "{} failed", what);
            }
        }));
    }
}

fn fresh_usage() -> UsageMetrics {
    UsageMetrics {
        sessions_count: 0,
        ..UsageMetrics::new_session(Utc::now())
    }
}

async fn save_update(p: &Persistence, update: &ParameterUpdate) -> StoreResult<()> {
    let partial = serde_json::to_value(update)?;
    p.store
        .save(&p.user_id, DocumentKind::FinancialData, partial)
        .await
}

fn position<T>(
    items: &[T],
    matches: impl Fn(&T) -> bool,
    collection: CollectionKind,
    id: &str,
) -> StoreResult<usize> {
    items
        .iter()
        .position(matches)
        .ok_or_else(|| not_found(collection, id))
}

/// Load a collection, seeding defaults when it is empty
async fn load_collection<N, T>(
    p: &Persistence,
    collection: CollectionKind,
    defaults: Vec<N>,
    build: impl Fn(String, N) -> T,
) -> Vec<T>
where
    N: Serialize + DeserializeOwned,
{
    let records = match p.store.list(&p.user_id, collection).await {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, collection = collection.as_str(), "load failed, using local defaults");
            return defaults
                .into_iter()
                .map(|fields| build(local_id(), fields))
                .collect();
        }
    };

    if records.is_empty() {
        info!(collection = collection.as_str(), "seeding defaults");
        let mut seeded = Vec::with_capacity(defaults.len());
        for fields in defaults {
            let id = match serde_json::to_value(&fields) {
                Ok(record) => p.store.insert(&p.user_id, collection, record).await,
                Err(e) => Err(StoreError::from(e)),
            }
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to seed record, keeping it locally");
                local_id()
            });
            seeded.push(build(id, fields));
        }
        return seeded;
    }

    records
        .into_iter()
        .filter_map(|record| parse_record(record, &build))
        .collect()
}

fn parse_record<N: DeserializeOwned, T>(record: Value, build: &impl Fn(String, N) -> T) -> Option<T> {
    let id = record.get("id").and_then(Value::as_str)?.to_string();
    match serde_json::from_value::<N>(record) {
        Ok(fields) => Some(build(id, fields)),
        Err(e) => {
            warn!(error = %e, id = %id, "skipping malformed record");
            None
        }
    }
}
