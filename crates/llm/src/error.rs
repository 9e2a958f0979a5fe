use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("could not parse upstream response: {0}")]
    InvalidResponse(String),

    #[error("upstream LLM chunk timed out")]
    Timeout,
}
