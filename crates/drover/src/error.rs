//! Error types for pool construction.
//!
//! Only configuration problems surface as [`Error`] values. Lifecycle
//! misuse (double stop, start without a processor, enqueue after stop) is a
//! violated contract, not a recoverable condition, and panics instead — see
//! the method docs on [`crate::WorkPool`]. Per-item processing failures are
//! not errors at this level either; they travel through the outcome channel
//! as [`crate::Outcome::Failure`].

/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All possible errors raised when configuring a pool.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested worker count was zero. A pool with no workers can
    /// never drain its queue, so this is rejected up front.
    #[error("invalid concurrency: {got} (must be at least 1)")]
    InvalidConcurrency { got: usize },
}
