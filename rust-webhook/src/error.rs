//! Error types for the capability seams.

use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Errors from the content-extraction service.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The service answered with a non-200 status.
    #[error("HTTP-{status}: {body:?}")]
    Status { status: u16, body: String },

    #[error("request to content service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("could not decode article: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid content service endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Errors from the outbound mail provider.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("mail provider rejected message with HTTP-{status}: {body:?}")]
    Status { status: u16, body: String },

    #[error("request to mail provider failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display_quotes_body() {
        let err = ResolveError::Status {
            status: 404,
            body: "not found".to_string(),
        };
        assert_eq!(err.to_string(), r#"HTTP-404: "not found""#);
    }
}
