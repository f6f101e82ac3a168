/// Error types for the wedding site functions
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VowsError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The user failed the challenge and must retry it
    #[error("Captcha rejected: {reason}")]
    CaptchaRejected { reason: String },

    /// The verification service could not give an answer
    #[error("Captcha unavailable ({status}): {reason}")]
    CaptchaUnavailable { reason: String, status: u16 },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Messaging error: {0}")]
    Messaging(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lambda runtime error: {0}")]
    Lambda(String),
}

impl VowsError {
    /// Determines if an error is retriable
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Store(_) => true,
            Self::Messaging(_) => true,
            Self::Mail(_) => true,
            Self::CaptchaUnavailable { .. } => true,
            Self::Validation(_) => false,
            Self::Conflict(_) => false,
            Self::NotFound(_) => false,
            Self::CaptchaRejected { .. } => false,
            Self::Config(_) => false,
            Self::Serialization(_) => false,
            Self::Lambda(_) => false,
        }
    }

    /// True for errors caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Conflict(_) | Self::NotFound(_) | Self::CaptchaRejected { .. }
        )
    }
}

impl From<serde_json::Error> for VowsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::env::VarError> for VowsError {
    fn from(err: std::env::VarError) -> Self {
        Self::Config(err.to_string())
    }
}
