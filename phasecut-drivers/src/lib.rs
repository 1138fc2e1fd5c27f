//! Hardware driver implementations
//!
//! This crate provides the concrete phase-control dimmer on top of the
//! traits defined in phasecut-core:
//!
//! - AC dimmer sequencer (zero-cross handling, gate timing, drain control)
//! - Polarity-aware gate and drain outputs over `embedded-hal` pins
//! - Zero-cross edge waiting over `embedded-hal-async` inputs

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod dimmer;
