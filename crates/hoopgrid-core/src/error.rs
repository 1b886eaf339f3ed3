use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown filter kind: {0}")]
    UnknownFilterKind(String),

    #[error("bad filter config for kind {kind}: {reason}")]
    BadFilterConfig { kind: String, reason: String },

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
