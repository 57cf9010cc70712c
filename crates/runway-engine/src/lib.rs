//! Cash runway and scenario projection for early-stage companies
//!
//! The pure calculators ([`scenario`], [`runway`], [`expenses`], [`health`],
//! [`revenue`], [`team`]) work on a [`BusinessParameters`] snapshot. The
//! [`Planner`] holds a user's session state and persists it through a
//! [`Store`].

pub mod constants;
pub mod error;
pub mod expenses;
pub mod health;
pub mod params;
pub mod planner;
pub mod report;
pub mod revenue;
pub mod runway;
pub mod scenario;
pub mod store;
pub mod team;
pub mod usage;

pub use error::{StoreError, StoreResult};
pub use params::{BusinessParameters, ParameterUpdate};
pub use planner::{Mode, Planner};
pub use report::{ReportInput, ReportRenderer};
pub use scenario::ScenarioResult;
pub use store::{CollectionKind, DocumentKind, MemoryStore, NullStore, Store};
pub use usage::{UsageCounter, UsageMetrics};
