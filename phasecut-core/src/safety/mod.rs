//! Health monitoring
//!
//! Tracks absorbed runtime faults and reports fault conditions.

pub mod monitor;

pub use monitor::{
    DimmerHealth, FaultKind, HealthSnapshot, HealthStatus, MAX_CONSECUTIVE_SKIPS,
    MAX_NOISE_STREAK,
};
