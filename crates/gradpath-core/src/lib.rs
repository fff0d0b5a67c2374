//! GradPath Core — shared types, error taxonomy, configuration, fingerprinting.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod types;

pub use config::{ComputeSettings, GradPathConfig, PrecomputeSettings};
pub use error::{Error, Result};
pub use fingerprint::fingerprint;
pub use types::{Course, EducationHistory, Semester, Student};
