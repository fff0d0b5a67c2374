//! Reconciliation results.

use serde::{Deserialize, Serialize};

/// Outcome of one full reconciliation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub students_scanned: usize,
    pub jobs_triggered: usize,
    pub triggered_student_ids: Vec<String>,
}
