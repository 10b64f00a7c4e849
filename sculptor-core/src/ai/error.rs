use anyhow::anyhow;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    /// Network failure, rate limiting or an overloaded upstream. The same
    /// request may succeed if triggered again later.
    #[error("Transient error: {0}")]
    Transient(anyhow::Error),

    /// Rejected request, bad credentials or an unusable reply
    #[error("Terminal error: {0}")]
    Terminal(anyhow::Error),
}

impl AiError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<serde_json::Error> for AiError {
    fn from(source: serde_json::Error) -> Self {
        Self::Terminal(anyhow!(source))
    }
}
