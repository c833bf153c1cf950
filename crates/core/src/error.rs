use thiserror::Error;

/// Returned by the scorer when the input text is empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("text must be non-empty")]
pub struct EmptyInputError;

/// A malformed verdict, stakeholder name or timestamp handed to the aggregator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("verdict text must be non-empty")]
    BlankText,
    #[error("confidence must be between 0.5 and 0.95 (got {0})")]
    ConfidenceOutOfRange(f64),
    #[error("at most 3 keywords are allowed (got {0})")]
    TooManyKeywords(usize),
    #[error("stakeholder name must be non-empty")]
    BlankStakeholder,
    #[error("timestamp must be a finite, non-negative number of seconds (got {0})")]
    InvalidTimestamp(f64),
}

/// Failure of a durable `record`: either the input was rejected or the log store failed.
/// In both cases the in-memory log is left untouched.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("analysis log store append failed: {0:#}")]
    Store(anyhow::Error),
}

/// Failure of the score-then-record path.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    EmptyInput(#[from] EmptyInputError),
    #[error(transparent)]
    Record(#[from] RecordError),
}
