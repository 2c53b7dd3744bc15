//! Bulk import orchestration and rate limiting
//!
//! This module owns the pipeline's pacing policy and the one-shot bulk
//! import of the full record listing.
//!
//! # Overview
//!
//! 1. **Rate Limiting**: every outbound call goes through one shared
//!    [`rate_limit::RateLimiter`]
//! 2. **Execution**: [`BulkImporter::run`] drives the listing call and the
//!    sequential per-item fetches
//! 3. **Progress Tracking**: observers poll [`BulkImporter::progress`] and
//!    [`BulkImporter::phase`] while a run is in flight
//! 4. **Degradation**: a listing failure publishes the embedded fallback
//!    dataset instead of an empty result set
//!
//! # Components
//!
//! - [`orchestrator`] - The bulk import state machine and learnset resolver
//! - [`progress`] - Progress state with a monotonic completion fraction
//! - [`rate_limit`] - Minimum-interval limiter shared by all outbound calls
//! - [`config`] - Pacing constants and overridable import configuration

pub mod config;
pub mod orchestrator;
pub mod progress;
pub mod rate_limit;

pub use config::ImportConfig;
pub use orchestrator::{BulkImporter, ImportPhase, ImportSummary, LearnedMove};
pub use progress::ImportProgress;
pub use rate_limit::RateLimiter;
