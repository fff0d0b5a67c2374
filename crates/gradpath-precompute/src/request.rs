//! Compute request building and response mapping.

use std::collections::BTreeMap;

use chrono::Utc;
use uuid::Uuid;

use gradpath_compute::{
    CoursePayload, EducationPayload, SemesterPayload, TrainingRequest, TrainingResponse,
};
use gradpath_core::types::{Semester, Student};
use gradpath_core::PrecomputeSettings;
use gradpath_store::{Recommendation, RecommendationMetrics, TermSlate};

/// How many trailing semesters a simulation run hides.
const SIMULATION_LOOKBACK: usize = 2;

/// Build the training request for a student.
///
/// Simulation runs with more than two recorded semesters are truncated to
/// drop the most recent two, and credit/semester totals are recomputed from
/// the retained semesters only — a "what would we have recommended then"
/// view for calibration. Stored history is never mutated.
pub fn build_training_request(
    student: &Student,
    is_simulation: bool,
    episodes: Option<u32>,
    settings: &PrecomputeSettings,
) -> TrainingRequest {
    let education = &student.education;
    let mut semesters: &[Semester] = &education.semesters;
    let mut total_credits = education.total_credits;
    let mut num_semesters = education.num_semesters;

    if is_simulation && semesters.len() > SIMULATION_LOOKBACK {
        semesters = &semesters[..semesters.len() - SIMULATION_LOOKBACK];
        total_credits = semesters.iter().map(|s| s.semester_credits).sum();
        num_semesters = semesters.len() as u32;
    }

    let mut payload_semesters = BTreeMap::new();
    for semester in semesters {
        payload_semesters.insert(
            semester.term.clone(),
            SemesterPayload {
                courses: semester
                    .courses
                    .iter()
                    .map(|c| CoursePayload {
                        course_id: c.course_id.clone(),
                        course_name: c.course_name.clone(),
                        credit: c.credit,
                        gpa: c.gpa.unwrap_or(0.0),
                        grade: c.grade.clone(),
                    })
                    .collect(),
                cumulative_gpa: semester.cumulative_gpa,
                optional: semester.optional,
                semester_credits: semester.semester_credits,
                semester_gpa: semester.semester_gpa,
            },
        );
    }

    let episodes = episodes.unwrap_or(settings.default_episodes);
    TrainingRequest {
        student_id: student.id.clone(),
        education: EducationPayload {
            total_credits,
            num_semesters,
            semesters: payload_semesters,
        },
        episodes,
        pretrain_steps: episodes,
        max_semesters: settings.max_semesters,
        seed: settings.seed,
    }
}

/// Map a trainer response into a recommendation artifact.
pub fn map_response(student_id: &str, response: &TrainingResponse) -> Recommendation {
    let courses = response
        .recommended_slates
        .first()
        .cloned()
        .unwrap_or_default();
    let term_index = response.terms.first().map(|t| t.term).unwrap_or(0);
    let slates_by_term = (!response.terms.is_empty()).then(|| {
        response
            .terms
            .iter()
            .map(|t| TermSlate {
                term: t.term,
                slate: t.slate.clone(),
            })
            .collect()
    });

    let metadata = response.metadata.as_ref();
    let best = metadata.and_then(|m| m.best_episode.as_ref());
    let metrics = RecommendationMetrics {
        cum_gpa: best.map(|b| b.cum_gpa).unwrap_or(0.0),
        total_credits: best
            .map(|b| b.total_credits)
            .or_else(|| metadata.and_then(|m| m.total_credits))
            .unwrap_or(0.0),
        graduated: metadata.map(|m| m.status.as_deref() == Some("already_finished")).unwrap_or(false)
            || best.map(|b| b.graduated).unwrap_or(false),
        grad_flags: parse_failed_flags(metadata.and_then(|m| m.top_failed_flags.as_ref())),
    };

    Recommendation {
        id: Uuid::new_v4().to_string(),
        student_id: student_id.to_string(),
        created_at: Utc::now().timestamp_millis(),
        term_index,
        courses,
        slates_by_term,
        metrics,
        model_version: None,
        policy_version: None,
    }
}

/// The trainer reports failure flags as `[name, count]` pairs; anything not
/// in that shape is skipped.
fn parse_failed_flags(raw: Option<&serde_json::Value>) -> BTreeMap<String, i64> {
    let mut flags = BTreeMap::new();
    let Some(serde_json::Value::Array(entries)) = raw else {
        return flags;
    };
    for entry in entries {
        let Some(pair) = entry.as_array() else { continue };
        if pair.len() != 2 {
            continue;
        }
        let (Some(name), Some(count)) = (pair[0].as_str(), pair[1].as_i64()) else {
            continue;
        };
        flags.insert(name.to_string(), count);
    }
    flags
}
