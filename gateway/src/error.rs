use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The platform rejected the call.
    #[error("API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl GatewayError {
    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Transport(_) => true,
            GatewayError::Api { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}
