//! GradPath Precompute — decides when recommendation training needs to
//! (re)run, drives jobs through their lifecycle, and reconciles stored state
//! against the latest student data.

pub mod orchestrator;
pub mod request;
pub mod types;
pub mod worker;

pub use orchestrator::PrecomputeOrchestrator;
pub use types::SyncReport;
pub use worker::ReconciliationWorker;
