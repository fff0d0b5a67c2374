//! Precompute orchestrator — the one place job state is driven.
//!
//! `trigger` is fire-and-forget: it persists a Queued job and hands
//! processing to a spawned task, so the caller gets a job id immediately and
//! observes completion by polling. There is no per-student lock: two
//! overlapping triggers for the same student race and the last write wins.
//! `sync_all` is the repair pass — it walks every student, compares the
//! stored job state against the current education fingerprint, and
//! re-triggers whatever is stale, failed, or orphaned.

use std::sync::Arc;

use tracing::{error, info, warn};

use gradpath_compute::ComputeClient;
use gradpath_core::fingerprint::fingerprint;
use gradpath_core::types::Student;
use gradpath_core::{Error, PrecomputeSettings, Result};
use gradpath_store::{Job, JobStatus, JobStore, Recommendation, RecommendationStore, StudentStore};

use crate::request::{build_training_request, map_response};
use crate::types::SyncReport;

/// Coordinates stores and the compute backend for precompute jobs.
#[derive(Clone)]
pub struct PrecomputeOrchestrator {
    students: Arc<dyn StudentStore>,
    jobs: Arc<dyn JobStore>,
    recommendations: Arc<dyn RecommendationStore>,
    compute: Arc<dyn ComputeClient>,
    settings: PrecomputeSettings,
}

impl PrecomputeOrchestrator {
    pub fn new(
        students: Arc<dyn StudentStore>,
        jobs: Arc<dyn JobStore>,
        recommendations: Arc<dyn RecommendationStore>,
        compute: Arc<dyn ComputeClient>,
        settings: PrecomputeSettings,
    ) -> Self {
        Self {
            students,
            jobs,
            recommendations,
            compute,
            settings,
        }
    }

    /// Queue a precompute job for a student and schedule its processing.
    ///
    /// Accepts an account id or an email as the lookup key. Returns the job
    /// id as soon as the Queued record is persisted; the training call runs
    /// on a spawned task and never blocks this path.
    pub fn trigger(
        &self,
        student_id: &str,
        is_simulation: bool,
        episodes: Option<u32>,
    ) -> Result<String> {
        if student_id.trim().is_empty() {
            return Err(Error::Validation("student_id is required".to_string()));
        }

        let student = self.resolve_student(student_id)?;
        let input_fingerprint = fingerprint(&student.education);

        let job = Job::new(&student.id, &input_fingerprint, is_simulation);
        self.jobs.create(&job)?;
        info!(
            "Queued precompute job {} for student {} (simulation: {})",
            job.id, student.id, is_simulation
        );

        let orchestrator = self.clone();
        let job_id = job.id.clone();
        tokio::spawn(async move {
            orchestrator
                .process_job(&job_id, &student, is_simulation, episodes)
                .await;
        });

        Ok(job.id)
    }

    /// Fetch a recommendation by id.
    pub fn get_recommendation(&self, id: &str) -> Result<Recommendation> {
        self.recommendations
            .get_by_id(id)?
            .ok_or_else(|| Error::NotFound(format!("recommendation {}", id)))
    }

    /// Observability snapshot: the most recent jobs, newest first.
    pub fn get_job_status(&self) -> Result<Vec<Job>> {
        self.jobs.get_recent(self.settings.recent_jobs_limit)
    }

    /// Full reconciliation pass over every student.
    ///
    /// Dispatch is strictly sequential with a fixed delay between triggers —
    /// the only backpressure protecting the compute backend.
    pub async fn sync_all(&self, is_simulation: bool) -> Result<SyncReport> {
        let students = self.students.get_all()?;
        let mut report = SyncReport {
            students_scanned: students.len(),
            ..SyncReport::default()
        };

        for student in &students {
            let current_fingerprint = fingerprint(&student.education);
            let latest = self.jobs.get_latest_by_student(&student.id)?;

            if self.needs_retrigger(latest.as_ref(), &current_fingerprint, is_simulation)? {
                self.trigger(&student.id, is_simulation, None)?;
                tokio::time::sleep(self.settings.trigger_delay).await;

                report.jobs_triggered += 1;
                report.triggered_student_ids.push(student.id.clone());
            }
        }

        if report.jobs_triggered > 0 {
            info!(
                "Sync pass: {} students scanned, {} jobs triggered ({})",
                report.students_scanned,
                report.jobs_triggered,
                report.triggered_student_ids.join(", ")
            );
        }
        Ok(report)
    }

    /// Whether a student's latest job still covers the current snapshot.
    fn needs_retrigger(
        &self,
        latest: Option<&Job>,
        current_fingerprint: &str,
        is_simulation: bool,
    ) -> Result<bool> {
        let Some(job) = latest else {
            return Ok(true);
        };

        if job.input_fingerprint != current_fingerprint
            || job.status == JobStatus::Failed
            || job.is_simulation != is_simulation
        {
            return Ok(true);
        }

        if job.status == JobStatus::Ready {
            match &job.result_id {
                Some(result_id) => {
                    if self.recommendations.get_by_id(result_id)?.is_none() {
                        warn!(
                            "Job {} is Ready but recommendation {} is missing, re-triggering",
                            job.id, result_id
                        );
                        return Ok(true);
                    }
                }
                // Ready without a result should be unreachable; repair it.
                None => return Ok(true),
            }
        }

        Ok(false)
    }

    fn resolve_student(&self, key: &str) -> Result<Student> {
        if let Some(student) = self.students.get_by_id(key)? {
            return Ok(student);
        }
        // Callers sometimes pass the email instead of the account id.
        self.students
            .find_by_email(key)?
            .ok_or_else(|| Error::NotFound(format!("student {}", key)))
    }

    /// Drive one job to a terminal state. Errors become job state, not
    /// return values: the trigger caller already has its job id.
    async fn process_job(
        &self,
        job_id: &str,
        student: &Student,
        is_simulation: bool,
        episodes: Option<u32>,
    ) {
        if let Err(e) = self.run_job(job_id, student, is_simulation, episodes).await {
            warn!("Job {} failed: {}", job_id, e);
            if let Err(update_err) =
                self.jobs
                    .update_status(job_id, JobStatus::Failed, Some(&e.to_string()))
            {
                // Nothing left to do but make the condition visible.
                error!(
                    "Job {}: could not record failure status: {}",
                    job_id, update_err
                );
            }
        }
    }

    async fn run_job(
        &self,
        job_id: &str,
        student: &Student,
        is_simulation: bool,
        episodes: Option<u32>,
    ) -> Result<()> {
        self.jobs.update_status(job_id, JobStatus::Running, None)?;

        let request = build_training_request(student, is_simulation, episodes, &self.settings);
        let response = self.compute.train(&request).await?;
        let recommendation = map_response(&student.id, &response);

        self.recommendations.create(&recommendation)?;
        self.jobs.update_result(job_id, &recommendation.id)?;

        let mut updated = student.clone();
        updated.latest_recommendation_id = Some(recommendation.id.clone());
        self.students.upsert(&updated)?;

        info!(
            "Job {} finished: recommendation {} for student {}",
            job_id, recommendation.id, student.id
        );
        Ok(())
    }
}
