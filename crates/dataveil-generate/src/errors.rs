use thiserror::Error;

/// Errors emitted while producing fake values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("unknown generator method '{0}'")]
    UnknownMethod(String),
    #[error("invalid params for '{method}': {message}")]
    InvalidParams { method: String, message: String },
    #[error("unsupported language '{0}'")]
    UnsupportedLocale(String),
}

impl GenerationError {
    pub(crate) fn invalid(method: &str, message: impl Into<String>) -> Self {
        Self::InvalidParams {
            method: method.to_string(),
            message: message.into(),
        }
    }
}
