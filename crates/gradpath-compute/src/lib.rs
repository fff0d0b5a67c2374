//! GradPath Compute — contract and HTTP client for the RL training service.

pub mod client;
pub mod wire;

pub use client::{ComputeClient, HttpComputeClient};
pub use wire::*;
