#[derive(Debug, thiserror::Error)]
pub enum VpadError {
    /// Caller passed a value outside the documented range or an undefined symbol.
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// Event for a capability the device never declared.
    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("Failed to acquire device handle ({context}): {source}")]
    HandleAcquisition {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to emit event: {0}")]
    Emission(#[source] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VpadError {
    pub(crate) fn acquisition(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::HandleAcquisition {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, VpadError>;
