use shared::{Mode, ServiceStatus};

use crate::config::ConfigError;
use crate::users::FormError;

pub const GENERIC_ANALYSIS_FAILURE: &str = "Something went wrong while analyzing. Please try again.";
pub const TIMEOUT_MESSAGE: &str = "The service took too long to respond.";
pub const NETWORK_MESSAGE: &str = "Could not reach the service. Check your connection.";

/// Failures reported by the HTTP layer behind the client traits.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("server responded with status {status}")]
    Status { status: u16, detail: Option<String> },
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    Decode(String),
}

impl TransportError {
    /// User-facing message: server detail, then status code, then timeout,
    /// then network failure, then the generic fallback.
    pub fn describe(&self) -> String {
        match self {
            TransportError::Status {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            TransportError::Status { status, .. } => format!("Server error ({})", status),
            TransportError::Timeout => TIMEOUT_MESSAGE.to_string(),
            TransportError::Network(_) => NETWORK_MESSAGE.to_string(),
            TransportError::Decode(_) => GENERIC_ANALYSIS_FAILURE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error("Unsupported file format: {mime_type}. Please choose a JPG or PNG image.")]
    UnsupportedFormat { mime_type: String },
    #[error("File too large ({size_mb:.1} MB). The maximum is {limit_mb} MB.")]
    FileTooLarge { size_mb: f64, limit_mb: f64 },
    #[error("The {mode} analysis service is not available ({status}).")]
    ServiceUnavailable { mode: Mode, status: ServiceStatus },
    #[error("{0}")]
    AnalysisFailed(String),
    #[error("{0}")]
    PersistenceFailed(String),
    #[error(transparent)]
    InvalidForm(#[from] FormError),
    #[error("{0}")]
    Auth(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn analysis(err: &TransportError) -> Self {
        ClientError::AnalysisFailed(err.describe())
    }

    pub fn persistence(action: &str, err: &TransportError) -> Self {
        ClientError::PersistenceFailed(format!("Could not {}: {}", action, err.describe()))
    }
}

impl From<ConfigError> for ClientError {
    fn from(err: ConfigError) -> Self {
        ClientError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_detail_beats_status() {
        let err = TransportError::Status {
            status: 422,
            detail: Some("Image could not be decoded".into()),
        };
        assert_eq!(err.describe(), "Image could not be decoded");

        let err = TransportError::Status {
            status: 502,
            detail: Some("  ".into()),
        };
        assert_eq!(err.describe(), "Server error (502)");
    }

    #[test]
    fn timeout_and_network_have_fixed_messages() {
        assert_eq!(TransportError::Timeout.describe(), TIMEOUT_MESSAGE);
        assert_eq!(
            TransportError::Network("TypeError: Failed to fetch".into()).describe(),
            NETWORK_MESSAGE
        );
        assert_eq!(
            TransportError::Decode("expected value".into()).describe(),
            GENERIC_ANALYSIS_FAILURE
        );
    }

    #[test]
    fn file_too_large_embeds_one_decimal() {
        let err = ClientError::FileTooLarge {
            size_mb: 6.24,
            limit_mb: 5.0,
        };
        assert_eq!(err.to_string(), "File too large (6.2 MB). The maximum is 5 MB.");
    }

    #[test]
    fn unavailable_names_mode_and_status() {
        let err = ClientError::ServiceUnavailable {
            mode: Mode::Drawing,
            status: ServiceStatus::Loading,
        };
        assert_eq!(
            err.to_string(),
            "The drawing analysis service is not available (loading)."
        );
    }
}
