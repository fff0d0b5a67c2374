//! Job and recommendation records.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gradpath_core::{Error, Result};

/// Lifecycle state of a precompute job.
///
/// Transitions are one-directional: Queued → Running → {Ready | Failed}.
/// A job that fails before the Running update lands may go Queued → Failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Ready,
    Failed,
}

impl JobStatus {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Queued, JobStatus::Failed)
                | (JobStatus::Running, JobStatus::Ready)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Ready | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Ready => "ready",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Result<JobStatus> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "running" => Ok(JobStatus::Running),
            "ready" => Ok(JobStatus::Ready),
            "failed" => Ok(JobStatus::Failed),
            other => Err(Error::Database(format!("unknown job status: {}", other))),
        }
    }
}

/// One precompute job. Created by a trigger, mutated only through the
/// status/result updates; reconciliation creates new jobs rather than
/// reviving old ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub student_id: String,
    pub status: JobStatus,
    /// Unix millis.
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<i64>,
    /// Content hash of the education history this job was triggered for.
    /// Immutable after creation.
    pub input_fingerprint: String,
    pub is_simulation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set iff status is Ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_id: Option<String>,
}

impl Job {
    /// A fresh Queued job for a student and input fingerprint.
    pub fn new(student_id: &str, input_fingerprint: &str, is_simulation: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            status: JobStatus::Queued,
            created_at: Utc::now().timestamp_millis(),
            started_at: None,
            finished_at: None,
            input_fingerprint: input_fingerprint.to_string(),
            is_simulation,
            error: None,
            result_id: None,
        }
    }
}

/// A precomputed recommendation artifact. Immutable once created; referenced
/// by `Job::result_id` and by the student's latest-recommendation pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub student_id: String,
    /// Unix millis.
    pub created_at: i64,
    /// Ordinal of the next term the slate applies to.
    pub term_index: u32,
    /// Recommended course ids for the next term.
    pub courses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slates_by_term: Option<Vec<TermSlate>>,
    pub metrics: RecommendationMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_version: Option<String>,
}

/// Recommended slate for one future term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermSlate {
    pub term: u32,
    pub slate: Vec<String>,
}

/// Training outcome metrics attached to a recommendation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationMetrics {
    pub cum_gpa: f64,
    pub total_credits: f64,
    pub graduated: bool,
    /// Top failure-flag explanations, flag name → count.
    #[serde(default)]
    pub grad_flags: BTreeMap<String, i64>,
}
