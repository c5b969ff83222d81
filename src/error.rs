//! Error taxonomy for bot lifecycle operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    /// Bad caller input. Nothing was mutated.
    #[error("{0}")]
    Input(String),

    #[error("GIF not found: {0}")]
    AssetNotFound(String),

    /// The provisioning API rejected the request or could not be reached.
    /// `status` is `None` for transport failures.
    #[error("RecallAI API error{}: {body}", .status.map(|s| format!(" {s}")).unwrap_or_default())]
    Upstream { status: Option<u16>, body: String },

    #[error("Malformed RecallAI response: {0}")]
    MalformedResponse(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Failed to expose camera page: {0}")]
    Exposure(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type BotResult<T> = Result<T, BotError>;

impl BotError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    pub fn exposure(message: impl Into<String>) -> Self {
        Self::Exposure(message.into())
    }
}
