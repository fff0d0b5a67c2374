//! Narrow store contracts consumed by the orchestrator.
//!
//! The orchestrator depends on these traits only, never on the SQLite
//! implementation, so persistence can be swapped without touching the
//! orchestration logic.

use gradpath_core::types::Student;
use gradpath_core::Result;

use crate::types::{Job, JobStatus, Recommendation};

/// Read access to student snapshots plus the single write-back the
/// orchestrator performs: the latest-recommendation pointer.
pub trait StudentStore: Send + Sync {
    fn get_by_id(&self, id: &str) -> Result<Option<Student>>;
    fn find_by_email(&self, email: &str) -> Result<Option<Student>>;
    fn get_all(&self) -> Result<Vec<Student>>;
    fn upsert(&self, student: &Student) -> Result<()>;
}

/// Persistence for job records.
pub trait JobStore: Send + Sync {
    fn create(&self, job: &Job) -> Result<()>;

    /// Move a job to `status`, stamping `started_at`/`finished_at` as
    /// appropriate. Rejects illegal transitions with
    /// [`gradpath_core::Error::InvalidTransition`].
    fn update_status(&self, job_id: &str, status: JobStatus, error: Option<&str>) -> Result<()>;

    /// Attach a result and move the job Running → Ready.
    fn update_result(&self, job_id: &str, recommendation_id: &str) -> Result<()>;

    fn get_by_id(&self, job_id: &str) -> Result<Option<Job>>;
    fn get_latest_by_student(&self, student_id: &str) -> Result<Option<Job>>;

    /// Most-recent-first snapshot, capped at `limit`.
    fn get_recent(&self, limit: usize) -> Result<Vec<Job>>;
}

/// Persistence for recommendation artifacts.
pub trait RecommendationStore: Send + Sync {
    fn create(&self, recommendation: &Recommendation) -> Result<()>;
    fn get_by_id(&self, id: &str) -> Result<Option<Recommendation>>;
    fn get_latest_by_student(&self, student_id: &str) -> Result<Option<Recommendation>>;
}
