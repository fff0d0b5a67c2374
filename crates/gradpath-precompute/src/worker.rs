//! Periodic reconciliation loop.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::orchestrator::PrecomputeOrchestrator;

/// Runs `sync_all` on a fixed interval until shutdown is signalled.
///
/// A failed cycle is logged and the loop keeps going; the worker only exits
/// on shutdown.
pub struct ReconciliationWorker {
    orchestrator: PrecomputeOrchestrator,
    interval: Duration,
}

impl ReconciliationWorker {
    pub fn new(orchestrator: PrecomputeOrchestrator, interval: Duration) -> Self {
        Self {
            orchestrator,
            interval,
        }
    }

    /// Spawn the loop. Flips `shutdown` to true to stop it.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "Reconciliation worker started (interval: {:?})",
                self.interval
            );
            loop {
                match self.orchestrator.sync_all(false).await {
                    Ok(report) => {
                        debug!(
                            "Reconciliation cycle: {} scanned, {} triggered",
                            report.students_scanned, report.jobs_triggered
                        );
                    }
                    Err(e) => error!("Reconciliation cycle failed: {}", e),
                }

                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {}
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            info!("Reconciliation worker stopping");
                            break;
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;

    use gradpath_compute::{ComputeClient, TrainingRequest, TrainingResponse};
    use gradpath_core::types::{Course, EducationHistory, Semester, Student};
    use gradpath_core::{PrecomputeSettings, Result};
    use gradpath_store::{JobStore, SqliteStore, StudentStore};

    struct StubCompute;

    #[async_trait]
    impl ComputeClient for StubCompute {
        async fn train(&self, _request: &TrainingRequest) -> Result<TrainingResponse> {
            Ok(serde_json::from_value(serde_json::json!({
                "recommended_slates": [["CS101"]],
                "terms": [{ "term": 1, "slate": ["CS101"] }]
            }))
            .unwrap())
        }
    }

    fn one_semester_student(id: &str) -> Student {
        Student {
            id: id.to_string(),
            email: format!("{}@example.edu", id),
            name: id.to_string(),
            education: EducationHistory {
                total_credits: 15.0,
                num_semesters: 1,
                semesters: vec![Semester {
                    term: "T1".to_string(),
                    optional: false,
                    courses: vec![Course {
                        course_id: "CS100".to_string(),
                        course_name: "Intro".to_string(),
                        credit: 15.0,
                        grade: "A".to_string(),
                        gpa: Some(4.0),
                    }],
                    semester_credits: 15.0,
                    semester_gpa: 4.0,
                    cumulative_gpa: 4.0,
                }],
            },
            latest_recommendation_id: None,
        }
    }

    #[tokio::test]
    async fn test_worker_runs_cycles_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteStore::open(dir.path()).unwrap());
        (store.as_ref() as &dyn StudentStore)
            .upsert(&one_semester_student("s1"))
            .unwrap();

        let orchestrator = crate::PrecomputeOrchestrator::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(StubCompute),
            PrecomputeSettings {
                trigger_delay: Duration::from_millis(1),
                ..PrecomputeSettings::default()
            },
        );

        let (tx, rx) = watch::channel(false);
        let handle =
            ReconciliationWorker::new(orchestrator, Duration::from_millis(10)).spawn(rx);

        // Give the first cycle time to run, then stop.
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("worker did not stop after shutdown signal")
            .unwrap();

        let job = (store.as_ref() as &dyn JobStore)
            .get_latest_by_student("s1")
            .unwrap();
        assert!(job.is_some(), "at least one cycle should have triggered a job");
    }
}
