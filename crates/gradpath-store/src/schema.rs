//! Database schema SQL.

/// Core tables: students, jobs, recommendations.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    education_json TEXT NOT NULL,
    latest_recommendation_id TEXT
);

CREATE TABLE IF NOT EXISTS jobs (
    id TEXT PRIMARY KEY,
    student_id TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    started_at INTEGER,
    finished_at INTEGER,
    input_fingerprint TEXT NOT NULL,
    is_simulation INTEGER NOT NULL DEFAULT 0,
    error TEXT,
    result_id TEXT
);

CREATE INDEX IF NOT EXISTS idx_jobs_student_created ON jobs(student_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_jobs_created ON jobs(created_at DESC);

CREATE TABLE IF NOT EXISTS recommendations (
    id TEXT PRIMARY KEY,
    student_id TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    term_index INTEGER NOT NULL,
    courses_json TEXT NOT NULL,
    slates_json TEXT,
    metrics_json TEXT NOT NULL,
    model_version TEXT,
    policy_version TEXT
);

CREATE INDEX IF NOT EXISTS idx_recommendations_student ON recommendations(student_id, created_at DESC);
"#;
