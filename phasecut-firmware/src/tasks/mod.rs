//! Embassy async tasks
//!
//! Each task runs independently and reaches the dimmer through the shared
//! critical-section mutex.

pub mod gate_timer;
pub mod supervisor;
pub mod zero_cross;

pub use gate_timer::gate_timer_task;
pub use supervisor::supervisor_task;
pub use zero_cross::zero_cross_task;
