use thiserror::Error;

/// All errors produced by amd-core.
///
/// Per-frame classification never fails; these only surface from the
/// trigger surface and configuration loading.
#[derive(Debug, Error)]
pub enum AmdError {
    #[error("media is not up on channel")]
    MediaNotReady,

    #[error("no such channel {uuid}")]
    UnknownChannel { uuid: String },

    #[error("empty command")]
    EmptyCommand,

    #[error("failed to attach media reader: {0}")]
    AttachFailed(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AmdError>;
