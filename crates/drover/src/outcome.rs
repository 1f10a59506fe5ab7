//! Tagged outcomes flowing from workers to the observer.

/// Failure detail for a single item.
///
/// Carries the human-readable message reported by the processor. The item
/// it belongs to travels alongside it in the [`TaggedOutcome`], so the pair
/// reaching the observer is always (item, message).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TaskError {
    message: String,
}

impl TaskError {
    /// Creates a failure detail from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message reported by the processor.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for TaskError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for TaskError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// What became of one item: the processor's value, or its failure detail.
///
/// Successes and failures travel through the same channel and reach the
/// same observer; a failed item never aborts the pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<R> {
    /// The processor returned a value.
    Success(R),
    /// The processor reported a failure.
    Failure(TaskError),
}

impl<R> Outcome<R> {
    /// Returns `true` for [`Outcome::Success`].
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` for [`Outcome::Failure`].
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// The unit of data carried by the outcome sink: an item paired with its
/// [`Outcome`]. Exactly one is produced per processed item when an observer
/// is registered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaggedOutcome<I, R> {
    /// The item as it was enqueued.
    pub item: I,
    /// The result of processing it.
    pub outcome: Outcome<R>,
}
