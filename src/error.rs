use thiserror::Error;

/// Error taxonomy for the bot. Transient errors (stale or short market
/// data, connectivity hiccups) are logged and the cycle is skipped;
/// everything else is reported loudly.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("insufficient data: need {required} points, got {got}")]
    InsufficientData { required: usize, got: usize },

    #[error("transient i/o error: {0}")]
    TransientIo(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("position sizing failed: {0}")]
    SizingFailure(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BotError {
    pub fn insufficient_data(required: usize, got: usize) -> Self {
        BotError::InsufficientData { required, got }
    }

    /// Whether the scheduler should skip the cycle and retry next tick.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BotError::InsufficientData { .. } | BotError::TransientIo(_)
        )
    }
}

impl From<std::io::Error> for BotError {
    fn from(e: std::io::Error) -> Self {
        BotError::TransientIo(e.to_string())
    }
}

impl From<serde_json::Error> for BotError {
    fn from(e: serde_json::Error) -> Self {
        BotError::Other(e.into())
    }
}
