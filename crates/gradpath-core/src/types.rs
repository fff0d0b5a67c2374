//! Student and education history types.
//!
//! The education snapshot is owned by the student import pipeline and is
//! consumed read-only here, except for `latest_recommendation_id`, which the
//! orchestrator writes back after a successful precompute run.

use serde::{Deserialize, Serialize};

/// A student record with account identity and academic history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub email: String,
    pub name: String,
    pub education: EducationHistory,
    /// Pointer to the most recent precomputed recommendation, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_recommendation_id: Option<String>,
}

/// Full academic history: ordered semesters plus aggregate totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationHistory {
    pub total_credits: f64,
    pub num_semesters: u32,
    pub semesters: Vec<Semester>,
}

/// One completed semester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Semester {
    /// Term label, e.g. "2023-FALL". Unique within a history.
    pub term: String,
    pub optional: bool,
    pub courses: Vec<Course>,
    pub semester_credits: f64,
    pub semester_gpa: f64,
    pub cumulative_gpa: f64,
}

/// A single graded course within a semester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub course_id: String,
    pub course_name: String,
    pub credit: f64,
    pub grade: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
}
