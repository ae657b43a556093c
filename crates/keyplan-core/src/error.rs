//! Error types for keyplan.

use thiserror::Error;

/// Result type alias using keyplan's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for keyplan operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Request rejected before any key selection ran
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error reports rejected caller input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let err = Error::Validation("Entity name is required.".to_string());
        assert_eq!(
            err.to_string(),
            "Validation error: Entity name is required."
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("bad batch policy".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad batch policy");
    }

    #[test]
    fn test_is_validation() {
        assert!(Error::Validation("x".to_string()).is_validation());
        assert!(!Error::Config("x".to_string()).is_validation());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
