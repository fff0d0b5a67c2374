//! Canonical content fingerprint of an education history.
//!
//! The fingerprint decides whether a student's precompute job is stale, so it
//! must be a function of the logical content only: the same semesters and
//! courses produce the same hash no matter how the in-memory collections are
//! ordered. Semesters are keyed by term label and courses are sorted by id
//! before hashing; `serde_json`'s default map is BTree-backed, so object keys
//! serialize in sorted order.

use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use crate::types::{Course, EducationHistory};

/// Compute the SHA-256 fingerprint of an education history, hex-encoded.
pub fn fingerprint(education: &EducationHistory) -> String {
    let canonical = canonical_value(education).to_string();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

/// Build the canonical JSON value: semesters as an object keyed by term,
/// courses sorted by course id.
fn canonical_value(education: &EducationHistory) -> Value {
    let mut semesters = Map::new();
    for semester in &education.semesters {
        let mut courses: Vec<&Course> = semester.courses.iter().collect();
        courses.sort_by(|a, b| a.course_id.cmp(&b.course_id));
        let courses: Vec<Value> = courses
            .into_iter()
            .map(|c| {
                json!({
                    "course_id": c.course_id,
                    "course_name": c.course_name,
                    "credit": c.credit,
                    "grade": c.grade,
                    "gpa": c.gpa,
                })
            })
            .collect();

        semesters.insert(
            semester.term.clone(),
            json!({
                "optional": semester.optional,
                "courses": courses,
                "semester_credits": semester.semester_credits,
                "semester_gpa": semester.semester_gpa,
                "cumulative_gpa": semester.cumulative_gpa,
            }),
        );
    }

    json!({
        "total_credits": education.total_credits,
        "num_semesters": education.num_semesters,
        "semesters": semesters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Semester;

    fn course(id: &str, credit: f64, grade: &str) -> Course {
        Course {
            course_id: id.to_string(),
            course_name: format!("Course {}", id),
            credit,
            grade: grade.to_string(),
            gpa: Some(3.0),
        }
    }

    fn semester(term: &str, courses: Vec<Course>) -> Semester {
        let semester_credits = courses.iter().map(|c| c.credit).sum();
        Semester {
            term: term.to_string(),
            optional: false,
            courses,
            semester_credits,
            semester_gpa: 3.2,
            cumulative_gpa: 3.1,
        }
    }

    fn sample_history() -> EducationHistory {
        EducationHistory {
            total_credits: 30.0,
            num_semesters: 2,
            semesters: vec![
                semester("2023-FALL", vec![course("CS101", 3.0, "A"), course("MA101", 4.0, "B")]),
                semester("2024-SPRING", vec![course("CS102", 3.0, "B+")]),
            ],
        }
    }

    #[test]
    fn test_deterministic() {
        let history = sample_history();
        assert_eq!(fingerprint(&history), fingerprint(&history));
    }

    #[test]
    fn test_order_independent() {
        let mut shuffled = sample_history();
        shuffled.semesters.reverse();
        for semester in &mut shuffled.semesters {
            semester.courses.reverse();
        }
        assert_eq!(fingerprint(&sample_history()), fingerprint(&shuffled));
    }

    #[test]
    fn test_grade_change_changes_fingerprint() {
        let mut changed = sample_history();
        changed.semesters[0].courses[0].grade = "C".to_string();
        assert_ne!(fingerprint(&sample_history()), fingerprint(&changed));
    }

    #[test]
    fn test_credit_change_changes_fingerprint() {
        let mut changed = sample_history();
        changed.semesters[0].courses[1].credit = 5.0;
        assert_ne!(fingerprint(&sample_history()), fingerprint(&changed));
    }

    #[test]
    fn test_course_id_change_changes_fingerprint() {
        let mut changed = sample_history();
        changed.semesters[1].courses[0].course_id = "CS103".to_string();
        assert_ne!(fingerprint(&sample_history()), fingerprint(&changed));
    }

    #[test]
    fn test_added_semester_changes_fingerprint() {
        let mut changed = sample_history();
        changed
            .semesters
            .push(semester("2024-FALL", vec![course("CS201", 3.0, "A")]));
        assert_ne!(fingerprint(&sample_history()), fingerprint(&changed));
    }

    #[test]
    fn test_hex_sha256_shape() {
        let fp = fingerprint(&sample_history());
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
