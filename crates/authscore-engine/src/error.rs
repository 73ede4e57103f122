use authscore_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    InvalidInput(#[from] ValidationError),

    #[error("invalid spam pattern \"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("comment timing window of {0} seconds is out of range")]
    InvalidTimingWindow(i64),

    #[error("analysis task failed: {0}")]
    TaskJoin(String),
}
