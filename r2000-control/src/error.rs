use thiserror::Error;

/// Errors from the HTTP/JSON control plane: transport failures, malformed
/// replies, and the device's own busy/error signalling (§6/§7).
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("device reported error {code}: {text}")]
    Device { code: i64, text: String },

    #[error("device is busy")]
    Busy,
}

pub type Result<T> = std::result::Result<T, ControlError>;

impl From<ControlError> for r2000_datalink::DataLinkError {
    fn from(error: ControlError) -> Self {
        match error {
            ControlError::Busy => r2000_datalink::DataLinkError::Busy,
            ControlError::Transport(e) => {
                r2000_datalink::DataLinkError::Io(std::io::Error::other(e))
            }
            other => {
                // No DataLinkError variant distinguishes a malformed reply
                // from a device-reported error code; both are reasons the
                // requested handle/command could not be honoured.
                tracing::warn!(error = %other, "control plane call failed");
                r2000_datalink::DataLinkError::HandleRequestFailed
            }
        }
    }
}
