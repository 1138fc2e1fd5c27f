//! Board-agnostic core logic for the phase-control dimmer firmware
//!
//! This crate contains all dimming logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (gate scheduler, dimmer lifecycle)
//! - Cycle state machine for the gate sequencer
//! - Mains zero-cross tracking (debounce, period estimate, dropout)
//! - Trigger-delay computation and half-cycle planning
//! - Power limits and the lock-free power setpoint
//! - Health monitoring
//! - Configuration types and parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod mains;
pub mod power;
pub mod safety;
pub mod state;
pub mod timing;
pub mod traits;
