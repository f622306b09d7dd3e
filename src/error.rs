/// Unified error types for the identity bridge
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for bridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Bad arity, unparsable URL/number, empty required field
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Subject identity lookup failure in the delegation flow
    #[error("Unable to get registered identity for subject: {0}")]
    SubjectResolution(String),

    /// Agent identity lookup failure
    #[error("Unable to get registered identity for agent: {0}")]
    AgentResolution(String),

    /// Generic cache/provider lookup failure
    #[error("Identity resolution failed: {0}")]
    Resolution(String),

    /// Delegation registration against the resolver failed
    #[error("Unable to delegate: {0}")]
    DelegationRegistration(String),

    /// Resolver/provider remote call failure
    #[error("Remote operation failed: {0}")]
    RemoteOperation(String),

    /// Document encoding failure
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Identity provider failure outside of a resolution step
    #[error("Provider error: {0}")]
    Provider(String),

    /// IO errors (host loop and shutdown handling only)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Stable wire-facing error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            BridgeError::InvalidArgument(_) => "InvalidArgument",
            BridgeError::SubjectResolution(_) => "SubjectResolutionFailed",
            BridgeError::AgentResolution(_) => "AgentResolutionFailed",
            BridgeError::Resolution(_) => "ResolutionFailed",
            BridgeError::DelegationRegistration(_) => "DelegationRegistrationFailed",
            BridgeError::RemoteOperation(_) => "RemoteOperationFailed",
            BridgeError::Serialization(_) => "SerializationFailed",
            BridgeError::Provider(_) => "ProviderFailed",
            BridgeError::Io(_) => "InternalError",
        }
    }
}

/// Wire error body delivered to the host: `{error, message}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl From<&BridgeError> for ErrorBody {
    fn from(err: &BridgeError) -> Self {
        ErrorBody {
            error: err.error_code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
