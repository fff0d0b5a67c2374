//! GradPath Store — SQLite persistence for jobs, recommendations, and students.

pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteStore;
pub use traits::{JobStore, RecommendationStore, StudentStore};
pub use types::*;
