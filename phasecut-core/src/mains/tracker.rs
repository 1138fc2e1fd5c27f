//! Zero-cross tracker
//!
//! Classifies each zero-cross edge, keeps the half-cycle estimate and
//! detects mains dropout.
//!
//! # Timing model
//!
//! The tracker always stores a *half-cycle* estimate. With dual-edge
//! interrupts (`Any`/`Change`) consecutive edges are one half-cycle apart.
//! With single-edge interrupts (`Rising`/`Falling`) they are one full cycle
//! apart and the measured interval is halved; the caller synthesises the
//! second half-cycle boundary itself.
//!
//! All timestamps are free-running `u32` microsecond counters and are only
//! ever compared through `wrapping_sub`.

use crate::config::{DimmerConfig, InterruptEdge};

/// Shortest plausible half-cycle (about 77 Hz); closer edges are noise
pub const MIN_HALF_CYCLE_US: u32 = 6_500;

/// Longest plausible half-cycle (40 Hz); longer gaps force a resync
pub const MAX_HALF_CYCLE_US: u32 = 12_500;

/// Missing edges for this many expected intervals means mains is lost
pub const DROPOUT_INTERVALS: u32 = 2;

/// Classification of a zero-cross edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Crossing {
    /// Edge arrived too soon after the previous one and was dropped
    Noise,
    /// Edge is a timing reference only; no trigger this half-cycle
    Sync,
    /// Start of a half-cycle with the given length estimate
    HalfCycle {
        /// Current half-cycle estimate (us)
        half_cycle_us: u32,
    },
}

/// Zero-cross edge tracker
#[derive(Debug, Clone)]
pub struct MainsTracker {
    /// Configured interrupt edge mode
    edge: InterruptEdge,
    /// Require one sync edge before the first trigger after boot
    init_with_half_cycle: bool,
    /// Half-cycle estimate (us)
    half_cycle_us: u32,
    /// Whether `half_cycle_us` comes from a measurement
    measured: bool,
    /// Timestamp of the last accepted edge
    last_edge_us: Option<u32>,
    /// The boot synchronisation edge has been seen
    half_cycle_seen: bool,
    /// Mains was declared lost and no edge has arrived since
    lost: bool,
}

impl MainsTracker {
    /// Create a tracker seeded with a nominal half-cycle length
    pub fn new(edge: InterruptEdge, init_with_half_cycle: bool, nominal_half_cycle_us: u32) -> Self {
        Self {
            edge,
            init_with_half_cycle,
            half_cycle_us: nominal_half_cycle_us,
            measured: false,
            last_edge_us: None,
            half_cycle_seen: false,
            lost: false,
        }
    }

    /// Create a tracker from a dimmer configuration
    pub fn from_config(config: &DimmerConfig) -> Self {
        Self::new(
            config.interrupt_edge,
            config.init_with_half_cycle,
            config.nominal_half_cycle_us(),
        )
    }

    /// Classify an edge and update the estimate
    ///
    /// Runs in interrupt context: constant time, no allocation.
    pub fn on_edge(&mut self, now_us: u32) -> Crossing {
        let Some(last_us) = self.last_edge_us else {
            self.last_edge_us = Some(now_us);

            let needs_sync = self.lost || (self.init_with_half_cycle && !self.half_cycle_seen);
            self.half_cycle_seen = true;
            self.lost = false;

            return if needs_sync {
                Crossing::Sync
            } else {
                Crossing::HalfCycle {
                    half_cycle_us: self.half_cycle_us,
                }
            };
        };

        let interval_us = now_us.wrapping_sub(last_us);
        let per_edge = self.edge.half_cycles_per_edge();

        if interval_us < MIN_HALF_CYCLE_US * per_edge {
            return Crossing::Noise;
        }

        self.last_edge_us = Some(now_us);

        if interval_us > MAX_HALF_CYCLE_US * per_edge {
            // Gap too long to measure from; use this edge as a fresh reference
            return Crossing::Sync;
        }

        self.update_estimate(interval_us / per_edge);

        Crossing::HalfCycle {
            half_cycle_us: self.half_cycle_us,
        }
    }

    /// Fold a measured half-cycle into the estimate
    ///
    /// The first measurement replaces the nominal seed, later ones are
    /// smoothed with a 1/4-weight moving average.
    fn update_estimate(&mut self, sample_us: u32) {
        if self.measured {
            let est = self.half_cycle_us as i32;
            let delta = sample_us as i32 - est;
            self.half_cycle_us = (est + delta / 4) as u32;
        } else {
            self.half_cycle_us = sample_us;
            self.measured = true;
        }
    }

    /// Whether the edges have stopped for longer than the dropout window
    pub fn is_lost(&self, now_us: u32) -> bool {
        match self.last_edge_us {
            Some(last_us) => now_us.wrapping_sub(last_us) > self.dropout_window_us(),
            None => false,
        }
    }

    /// Forget the edge history after a dropout
    ///
    /// The next edge becomes a sync edge, so no trigger is ever timed from
    /// a reference older than the dropout window.
    pub fn mark_lost(&mut self) {
        self.last_edge_us = None;
        self.lost = true;
    }

    /// Dropout window (us)
    pub fn dropout_window_us(&self) -> u32 {
        DROPOUT_INTERVALS * self.expected_edge_interval_us()
    }

    /// Expected time between two reported edges
    pub fn expected_edge_interval_us(&self) -> u32 {
        self.half_cycle_us * self.edge.half_cycles_per_edge()
    }

    /// Current half-cycle estimate (us)
    pub fn half_cycle_us(&self) -> u32 {
        self.half_cycle_us
    }

    /// Whether a reference edge is available
    pub fn is_synced(&self) -> bool {
        self.last_edge_us.is_some()
    }

    /// Whether edges arrive once per half-cycle
    pub fn is_dual_edge(&self) -> bool {
        self.edge.is_dual_edge()
    }

    /// Whether the estimate has been measured (not just seeded)
    pub fn is_measured(&self) -> bool {
        self.measured
    }

    /// Mains frequency in 0.1 Hz units derived from the estimate
    pub fn frequency_hz_x10(&self) -> u16 {
        if self.half_cycle_us == 0 {
            return 0;
        }
        (5_000_000 / self.half_cycle_us).min(u16::MAX as u32) as u16
    }
}
