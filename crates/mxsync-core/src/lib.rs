// mxsync-core: Reconciliation between mail server DNS intent and provider state.

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod planner;
pub mod source;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{
    CloudflareSettings, ProviderCredentials, StalwartSettings, SyncConfig, TlsVerification,
};
pub use engine::Reconciler;
pub use error::CoreError;
pub use matcher::MatchPolicy;
pub use planner::{RejectedWrite, WriteAction, WriteOperation, ZonePlan, plan_zone};
pub use source::{DnsProvider, MailServer};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AnalysisResult, AppliedWrite, CanonicalRecord, ConvergeReport, RecordType, SyncStatus,
    WriteFailure, Zone, ZoneOutcome, ZoneReport,
};
