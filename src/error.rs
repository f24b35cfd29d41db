//! Error types. Oracle errors never escape the engine; they select a fallback at the call site.

/// Failure of an external oracle call.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
  #[error("oracle HTTP {status}: {message}")]
  Http { status: u16, message: String },

  #[error("oracle transport error: {0}")]
  Transport(String),

  #[error("malformed oracle response: {0}")]
  Malformed(String),
}

/// Errors surfaced by batch operations and the JSON-lines driver.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
  #[error("batch cancelled by caller")]
  Cancelled,

  #[error("invalid request: {0}")]
  Protocol(String),
}

impl From<reqwest::Error> for OracleError {
  fn from(e: reqwest::Error) -> Self {
    OracleError::Transport(e.to_string())
  }
}
