use thiserror::Error;

pub type Result<T> = std::result::Result<T, StabilityError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum StabilityError {
    /// The tick was rejected; classifier state is untouched.
    #[error("malformed prediction: {0}")]
    MalformedPrediction(Malformed),
    #[error("clock went backwards: {now_ms}ms is before last tick at {last_ms}ms")]
    ClockWentBackwards { now_ms: u64, last_ms: u64 },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Reason a prediction set was rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Malformed {
    #[error("got {scores} scores for {labels} labels")]
    CountMismatch { labels: usize, scores: usize },
    #[error("empty prediction set")]
    Empty,
    #[error("score {score} for label {label:?} is not a probability")]
    InvalidScore { label: String, score: f32 },
}

impl From<Malformed> for StabilityError {
    fn from(reason: Malformed) -> Self {
        StabilityError::MalformedPrediction(reason)
    }
}
