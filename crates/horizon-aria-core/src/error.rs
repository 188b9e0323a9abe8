//! Error types for the reactive core.

/// Result type alias for reactive operations.
pub type Result<T> = std::result::Result<T, ReactiveError>;

/// Errors reported by the reactive runtime.
///
/// The graph itself never fails on ordinary reads and writes; these errors
/// surface only when an explicit [`flush`](crate::flush) detects that effects
/// keep re-triggering each other without reaching a fixed point.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReactiveError {
    /// Effects were re-run more often than the flush limit allows.
    #[error("effect flush exceeded {limit} runs without settling")]
    IterationLimit {
        /// The run limit that was hit.
        limit: usize,
    },
}
