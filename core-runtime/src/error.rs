use thiserror::Error;

/// Failures while assembling the bridge: bad settings or a missing native
/// service. Script-visible failures never use this type.
#[derive(Error, Debug)]
pub enum Error {
    /// A setting was rejected by `CoreConfigBuilder::build`.
    #[error("Invalid bridge configuration: {0}")]
    Config(String),

    /// No implementation of a required host trait was injected or compiled in.
    #[error("Host capability '{capability}' missing: {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Bridge internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn capability_missing(capability: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CapabilityMissing {
            capability: capability.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
