//! GradPath server — router, shared state, and background loops.

pub mod keepalive;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
