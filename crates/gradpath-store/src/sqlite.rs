//! SQLite-backed implementation of the store contracts.
//!
//! One connection behind a mutex, WAL mode, cached statements. Nested
//! structures (education history, slates, metrics) are stored as JSON
//! columns; everything queried on gets its own column and index.

use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use gradpath_core::types::{EducationHistory, Student};
use gradpath_core::{Error, Result};

use crate::schema::SCHEMA_SQL;
use crate::traits::{JobStore, RecommendationStore, StudentStore};
use crate::types::{Job, JobStatus, Recommendation, RecommendationMetrics, TermSlate};

/// SQLite store implementing [`StudentStore`], [`JobStore`], and
/// [`RecommendationStore`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open or create the store.
    ///
    /// `db_dir` is the data directory; the file will be `db_dir/gradpath.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::Storage(e.to_string()))?;
        let db_path = db_dir.join("gradpath.db");

        let conn = Connection::open(&db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };
        info!("SqliteStore initialized: path={}", store.db_path.display());
        Ok(store)
    }

    /// Delete a recommendation row. Not part of the store contract — result
    /// artifacts are owned by an external cleanup process; this mirrors that
    /// process so orphan recovery can be exercised.
    pub fn delete_recommendation(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.prepare_cached("DELETE FROM recommendations WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .execute(params![id])
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    fn row_to_job(row: &Row) -> rusqlite::Result<(Job, String)> {
        let status_raw: String = row.get("status")?;
        Ok((
            Job {
                id: row.get("id")?,
                student_id: row.get("student_id")?,
                // Patched up by the caller once parsed.
                status: JobStatus::Queued,
                created_at: row.get("created_at")?,
                started_at: row.get("started_at")?,
                finished_at: row.get("finished_at")?,
                input_fingerprint: row.get("input_fingerprint")?,
                is_simulation: row.get::<_, i64>("is_simulation")? != 0,
                error: row.get("error")?,
                result_id: row.get("result_id")?,
            },
            status_raw,
        ))
    }

    fn finish_job(parsed: (Job, String)) -> Result<Job> {
        let (mut job, status_raw) = parsed;
        job.status = JobStatus::parse(&status_raw)?;
        Ok(job)
    }

    fn row_to_student(row: &Row) -> rusqlite::Result<(Student, String)> {
        let education_json: String = row.get("education_json")?;
        Ok((
            Student {
                id: row.get("id")?,
                email: row.get("email")?,
                name: row.get("name")?,
                education: EducationHistory {
                    total_credits: 0.0,
                    num_semesters: 0,
                    semesters: Vec::new(),
                },
                latest_recommendation_id: row.get("latest_recommendation_id")?,
            },
            education_json,
        ))
    }

    fn finish_student(parsed: (Student, String)) -> Result<Student> {
        let (mut student, education_json) = parsed;
        student.education = serde_json::from_str(&education_json)?;
        Ok(student)
    }

    fn row_to_recommendation(row: &Row) -> rusqlite::Result<(Recommendation, RecJson)> {
        Ok((
            Recommendation {
                id: row.get("id")?,
                student_id: row.get("student_id")?,
                created_at: row.get("created_at")?,
                term_index: row.get::<_, i64>("term_index")? as u32,
                courses: Vec::new(),
                slates_by_term: None,
                metrics: RecommendationMetrics::default(),
                model_version: row.get("model_version")?,
                policy_version: row.get("policy_version")?,
            },
            RecJson {
                courses: row.get("courses_json")?,
                slates: row.get("slates_json")?,
                metrics: row.get("metrics_json")?,
            },
        ))
    }

    fn finish_recommendation(parsed: (Recommendation, RecJson)) -> Result<Recommendation> {
        let (mut rec, raw) = parsed;
        rec.courses = serde_json::from_str(&raw.courses)?;
        rec.slates_by_term = match raw.slates {
            Some(s) => Some(serde_json::from_str::<Vec<TermSlate>>(&s)?),
            None => None,
        };
        rec.metrics = serde_json::from_str(&raw.metrics)?;
        Ok(rec)
    }
}

/// Raw JSON columns of a recommendation row, parsed outside the rusqlite
/// row-mapping closure so serde errors surface as our own error type.
struct RecJson {
    courses: String,
    slates: Option<String>,
    metrics: String,
}

impl StudentStore for SqliteStore {
    fn get_by_id(&self, id: &str) -> Result<Option<Student>> {
        let conn = self.conn.lock();
        let parsed = conn
            .prepare_cached("SELECT * FROM students WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![id], Self::row_to_student)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        parsed.map(Self::finish_student).transpose()
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Student>> {
        let conn = self.conn.lock();
        let parsed = conn
            .prepare_cached("SELECT * FROM students WHERE email = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![email], Self::row_to_student)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        parsed.map(Self::finish_student).transpose()
    }

    fn get_all(&self) -> Result<Vec<Student>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT * FROM students ORDER BY id")
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], Self::row_to_student)
            .map_err(|e| Error::Database(e.to_string()))?;
        let mut students = Vec::new();
        for row in rows {
            students.push(Self::finish_student(
                row.map_err(|e| Error::Database(e.to_string()))?,
            )?);
        }
        Ok(students)
    }

    fn upsert(&self, student: &Student) -> Result<()> {
        let education_json = serde_json::to_string(&student.education)?;
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO students (id, email, name, education_json, latest_recommendation_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                 email = excluded.email,
                 name = excluded.name,
                 education_json = excluded.education_json,
                 latest_recommendation_id = excluded.latest_recommendation_id",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            student.id,
            student.email,
            student.name,
            education_json,
            student.latest_recommendation_id,
        ])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }
}

impl JobStore for SqliteStore {
    fn create(&self, job: &Job) -> Result<()> {
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO jobs (id, student_id, status, created_at, started_at, finished_at,
                               input_fingerprint, is_simulation, error, result_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            job.id,
            job.student_id,
            job.status.as_str(),
            job.created_at,
            job.started_at,
            job.finished_at,
            job.input_fingerprint,
            job.is_simulation as i64,
            job.error,
            job.result_id,
        ])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    fn update_status(&self, job_id: &str, status: JobStatus, error: Option<&str>) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        let conn = self.conn.lock();

        // Read-validate-write under one lock: the transition check and the
        // update must see the same current status.
        let current_raw: Option<String> = conn
            .prepare_cached("SELECT status FROM jobs WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![job_id], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        let current = match current_raw {
            Some(raw) => JobStatus::parse(&raw)?,
            None => return Err(Error::NotFound(format!("job {}", job_id))),
        };
        if !current.can_transition_to(status) {
            return Err(Error::InvalidTransition(format!(
                "job {}: {} -> {}",
                job_id,
                current.as_str(),
                status.as_str()
            )));
        }

        let started_at = (status == JobStatus::Running).then_some(now);
        let finished_at = status.is_terminal().then_some(now);
        conn.prepare_cached(
            "UPDATE jobs SET status = ?2,
                             started_at = COALESCE(?3, started_at),
                             finished_at = COALESCE(?4, finished_at),
                             error = COALESCE(?5, error)
             WHERE id = ?1",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![job_id, status.as_str(), started_at, finished_at, error])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    fn update_result(&self, job_id: &str, recommendation_id: &str) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        let conn = self.conn.lock();

        let current_raw: Option<String> = conn
            .prepare_cached("SELECT status FROM jobs WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![job_id], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        let current = match current_raw {
            Some(raw) => JobStatus::parse(&raw)?,
            None => return Err(Error::NotFound(format!("job {}", job_id))),
        };
        if !current.can_transition_to(JobStatus::Ready) {
            return Err(Error::InvalidTransition(format!(
                "job {}: {} -> ready",
                job_id,
                current.as_str()
            )));
        }

        conn.prepare_cached(
            "UPDATE jobs SET status = 'ready', result_id = ?2, finished_at = ?3 WHERE id = ?1",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![job_id, recommendation_id, now])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    fn get_by_id(&self, job_id: &str) -> Result<Option<Job>> {
        let conn = self.conn.lock();
        let parsed = conn
            .prepare_cached("SELECT * FROM jobs WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![job_id], Self::row_to_job)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        parsed.map(Self::finish_job).transpose()
    }

    fn get_latest_by_student(&self, student_id: &str) -> Result<Option<Job>> {
        let conn = self.conn.lock();
        let parsed = conn
            .prepare_cached(
                "SELECT * FROM jobs WHERE student_id = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT 1",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![student_id], Self::row_to_job)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        parsed.map(Self::finish_job).transpose()
    }

    fn get_recent(&self, limit: usize) -> Result<Vec<Job>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT * FROM jobs ORDER BY created_at DESC, rowid DESC LIMIT ?1")
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![limit as i64], Self::row_to_job)
            .map_err(|e| Error::Database(e.to_string()))?;
        let mut jobs = Vec::new();
        for row in rows {
            jobs.push(Self::finish_job(
                row.map_err(|e| Error::Database(e.to_string()))?,
            )?);
        }
        Ok(jobs)
    }
}

impl RecommendationStore for SqliteStore {
    fn create(&self, recommendation: &Recommendation) -> Result<()> {
        let courses_json = serde_json::to_string(&recommendation.courses)?;
        let slates_json = recommendation
            .slates_by_term
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let metrics_json = serde_json::to_string(&recommendation.metrics)?;

        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO recommendations (id, student_id, created_at, term_index, courses_json,
                                          slates_json, metrics_json, model_version, policy_version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            recommendation.id,
            recommendation.student_id,
            recommendation.created_at,
            recommendation.term_index as i64,
            courses_json,
            slates_json,
            metrics_json,
            recommendation.model_version,
            recommendation.policy_version,
        ])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Recommendation>> {
        let conn = self.conn.lock();
        let parsed = conn
            .prepare_cached("SELECT * FROM recommendations WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![id], Self::row_to_recommendation)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        parsed.map(Self::finish_recommendation).transpose()
    }

    fn get_latest_by_student(&self, student_id: &str) -> Result<Option<Recommendation>> {
        let conn = self.conn.lock();
        let parsed = conn
            .prepare_cached(
                "SELECT * FROM recommendations WHERE student_id = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT 1",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![student_id], Self::row_to_recommendation)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        parsed.map(Self::finish_recommendation).transpose()
    }
}
