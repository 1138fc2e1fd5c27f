//! Zero-cross edge wait
//!
//! Maps the configured interrupt edge onto `embedded_hal_async` wait calls.

use embedded_hal_async::digital::Wait;
use phasecut_core::config::InterruptEdge;

/// Wait for the next zero-cross edge of the configured kind
///
/// `Any` and `Change` both wake on every transition of the detector output.
pub async fn wait_for_cross<W: Wait>(input: &mut W, edge: InterruptEdge) -> Result<(), W::Error> {
    match edge {
        InterruptEdge::Rising => input.wait_for_rising_edge().await,
        InterruptEdge::Falling => input.wait_for_falling_edge().await,
        InterruptEdge::Any | InterruptEdge::Change => input.wait_for_any_edge().await,
    }
}
