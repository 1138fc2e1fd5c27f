//! Mains synchronisation

pub mod tracker;

pub use tracker::{
    Crossing, MainsTracker, DROPOUT_INTERVALS, MAX_HALF_CYCLE_US, MIN_HALF_CYCLE_US,
};
