//! Wire types for the RL training service JSON contract.
//!
//! Field names match the trainer's API exactly; the trainer calls terms
//! "semesters" throughout, so these types do too. Response fields are
//! defaulted liberally because the trainer omits sections depending on the
//! run outcome.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Training request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRequest {
    pub student_id: String,
    pub education: EducationPayload,
    pub episodes: u32,
    pub pretrain_steps: u32,
    pub max_semesters: u32,
    pub seed: u64,
}

/// Normalized education history as the trainer expects it: semesters keyed
/// by term label. A BTreeMap keeps the serialized order deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationPayload {
    pub total_credits: f64,
    pub num_semesters: u32,
    pub semesters: BTreeMap<String, SemesterPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemesterPayload {
    pub courses: Vec<CoursePayload>,
    pub cumulative_gpa: f64,
    pub optional: bool,
    pub semester_credits: f64,
    pub semester_gpa: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoursePayload {
    pub course_id: String,
    pub course_name: String,
    pub credit: f64,
    pub gpa: f64,
    pub grade: String,
}

/// Training response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingResponse {
    #[serde(default)]
    pub recommended_slates: Vec<Vec<String>>,
    #[serde(default)]
    pub terms: Vec<TermResult>,
    pub metadata: Option<TrainingMetadata>,
}

/// Per-term simulation result from the best training episode.
#[derive(Debug, Clone, Deserialize)]
pub struct TermResult {
    pub term: u32,
    #[serde(default)]
    pub slate: Vec<String>,
    #[serde(default)]
    pub semester_gpa: f64,
    #[serde(default)]
    pub credits_passed: f64,
    #[serde(default)]
    pub failed_credits: f64,
    #[serde(default)]
    pub total_credits_so_far: f64,
    #[serde(default)]
    pub cumulative_gpa_so_far: f64,
    #[serde(default)]
    pub graduated_so_far: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainingMetadata {
    pub status: Option<String>,
    pub total_credits: Option<f64>,
    pub best_episode: Option<BestEpisode>,
    #[serde(default)]
    pub episodes: u32,
    #[serde(default)]
    pub graduation_rate: f64,
    /// List of `[flag_name, count]` pairs; kept raw because the trainer has
    /// changed this shape before.
    pub top_failed_flags: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BestEpisode {
    #[serde(default)]
    pub cum_gpa: f64,
    #[serde(default)]
    pub total_credits: f64,
    #[serde(default)]
    pub graduated: bool,
    #[serde(default)]
    pub return_value: f64,
}
