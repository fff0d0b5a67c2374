//! HTTP surface tests — drive the router directly with a scripted compute
//! backend, no listening socket needed.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use async_trait::async_trait;

use gradpath_compute::{ComputeClient, TrainingRequest, TrainingResponse};
use gradpath_core::types::{Course, EducationHistory, Semester, Student};
use gradpath_core::{GradPathConfig, Result};
use gradpath_store::{SqliteStore, StudentStore};

struct ScriptedCompute;

#[async_trait]
impl ComputeClient for ScriptedCompute {
    async fn train(&self, _request: &TrainingRequest) -> Result<TrainingResponse> {
        Ok(serde_json::from_value(serde_json::json!({
            "recommended_slates": [["CS201", "MA201"]],
            "terms": [{ "term": 2, "slate": ["CS201", "MA201"] }],
            "metadata": {
                "status": "ok",
                "best_episode": {
                    "cum_gpa": 3.4,
                    "total_credits": 30.0,
                    "graduated": false,
                    "return_value": 1.0
                }
            }
        }))
        .unwrap())
    }
}

fn sample_student(id: &str) -> Student {
    Student {
        id: id.to_string(),
        email: format!("{}@example.edu", id),
        name: format!("Student {}", id),
        education: EducationHistory {
            total_credits: 15.0,
            num_semesters: 1,
            semesters: vec![Semester {
                term: "2024-FALL".to_string(),
                optional: false,
                courses: vec![Course {
                    course_id: "CS101".to_string(),
                    course_name: "Intro to CS".to_string(),
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

struct TestApp {
    router: Router,
    _dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::open(dir.path()).unwrap());
    (store.as_ref() as &dyn StudentStore)
        .upsert(&sample_student("s1"))
        .unwrap();

    let mut config = GradPathConfig::from_env(dir.path());
    config.precompute.trigger_delay = Duration::from_millis(1);

    let orchestrator = gradpath_precompute::PrecomputeOrchestrator::new(
        store.clone(),
        store.clone(),
        store,
        Arc::new(ScriptedCompute),
        config.precompute.clone(),
    );

    let state = Arc::new(gradpath_server::AppState::new(config, orchestrator));
    TestApp {
        router: gradpath_server::build_router(state),
        _dir: dir,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Poll the jobs endpoint until the named job reaches a terminal state.
async fn await_job(router: &Router, job_id: &str) -> serde_json::Value {
    for _ in 0..200 {
        let (status, body) = send(router, get("/api/precompute/jobs")).await;
        assert_eq!(status, StatusCode::OK);
        if let Some(job) = body["jobs"]
            .as_array()
            .unwrap()
            .iter()
            .find(|j| j["id"] == job_id)
        {
            let state = job["status"].as_str().unwrap();
            if state == "ready" || state == "failed" {
                return job.clone();
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("job {} never reached a terminal state", job_id);
}

#[tokio::test]
async fn test_trigger_accepted() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        post_json(
            "/api/precompute",
            serde_json::json!({ "student_id": "s1" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "queued");
    let job_id = body["job_id"].as_str().unwrap().to_string();

    let job = await_job(&app.router, &job_id).await;
    assert_eq!(job["status"], "ready");
    assert_eq!(job["student_id"], "s1");
    assert!(job["result_id"].is_string());
}

#[tokio::test]
async fn test_trigger_unknown_student_is_404() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        post_json(
            "/api/precompute",
            serde_json::json!({ "student_id": "nobody" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_trigger_blank_student_is_400() {
    let app = test_app();
    let (status, _) = send(
        &app.router,
        post_json("/api/precompute", serde_json::json!({ "student_id": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendation_round_trip() {
    let app = test_app();
    let (_, body) = send(
        &app.router,
        post_json(
            "/api/precompute",
            serde_json::json!({ "student_id": "s1" }),
        ),
    )
    .await;
    let job = await_job(&app.router, body["job_id"].as_str().unwrap()).await;
    let result_id = job["result_id"].as_str().unwrap();

    let (status, rec) = send(
        &app.router,
        get(&format!("/api/precompute/recommendations/{}", result_id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rec["student_id"], "s1");
    assert_eq!(rec["courses"], serde_json::json!(["CS201", "MA201"]));
    assert!(rec["metrics"]["cum_gpa"].is_number());
}

#[tokio::test]
async fn test_recommendation_missing_is_404() {
    let app = test_app();
    let (status, _) = send(
        &app.router,
        get("/api/precompute/recommendations/not-a-real-id"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_jobs_endpoint_shape() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/api/precompute/jobs")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["jobs"].is_array());
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_sync_all_reports() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        post_json("/api/precompute/sync-all", serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["students_scanned"], 1);
    assert_eq!(body["jobs_triggered"], 1);
    assert_eq!(body["triggered_student_ids"], serde_json::json!(["s1"]));
}
