use serde::{Deserialize, Serialize};

use crate::error::ClientError;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// What the validator needs to know about a picked file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMeta {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MB
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadPolicy {
    pub max_megabytes: f64,
    pub accepted_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_megabytes: 5.0,
            accepted_types: vec!["image/jpeg".into(), "image/png".into(), "image/jpg".into()],
        }
    }
}

impl UploadPolicy {
    pub fn max_bytes(&self) -> u64 {
        (self.max_megabytes * BYTES_PER_MB) as u64
    }

    pub fn accepts(&self, mime_type: &str) -> bool {
        let mime_type = mime_type.trim().to_ascii_lowercase();
        self.accepted_types.iter().any(|t| *t == mime_type)
    }

    /// Format is checked before size.
    pub fn validate(&self, file: &FileMeta) -> Result<(), ClientError> {
        if !self.accepts(&file.mime_type) {
            log::warn!("Rejected '{}': unsupported type '{}'", file.name, file.mime_type);
            return Err(ClientError::UnsupportedFormat {
                mime_type: file.mime_type.clone(),
            });
        }
        if file.size_bytes > self.max_bytes() {
            log::warn!("Rejected '{}': {} bytes", file.name, file.size_bytes);
            return Err(ClientError::FileTooLarge {
                size_mb: (file.size_mb() * 10.0).round() / 10.0,
                limit_mb: self.max_megabytes,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    #[test]
    fn accepts_jpeg_png_and_jpg_alias() {
        let policy = UploadPolicy::default();
        for mime in ["image/jpeg", "image/png", "image/jpg", "IMAGE/PNG"] {
            assert!(policy.validate(&FileMeta::new("a", mime, MB)).is_ok(), "{}", mime);
        }
    }

    #[test]
    fn rejects_other_types_with_received_mime() {
        let policy = UploadPolicy::default();
        for mime in ["image/gif", "image/webp", "application/pdf", ""] {
            let err = policy.validate(&FileMeta::new("a", mime, 10)).unwrap_err();
            assert_eq!(
                err,
                ClientError::UnsupportedFormat {
                    mime_type: mime.into()
                }
            );
        }
    }

    #[test]
    fn rejects_oversize_with_rounded_size() {
        let policy = UploadPolicy::default();
        let file = FileMeta::new("big.png", "image/png", 6 * MB + MB / 4);
        let err = policy.validate(&file).unwrap_err();

        assert_eq!(
            err,
            ClientError::FileTooLarge {
                size_mb: 6.3,
                limit_mb: 5.0
            }
        );
        assert!(err.to_string().contains("6.3 MB"));
    }

    #[test]
    fn exact_limit_is_accepted() {
        let policy = UploadPolicy::default();
        assert!(policy.validate(&FileMeta::new("a", "image/jpeg", 5 * MB)).is_ok());
        assert!(policy.validate(&FileMeta::new("a", "image/jpeg", 5 * MB + 1)).is_err());
    }

    #[test]
    fn unsupported_type_wins_over_size() {
        let policy = UploadPolicy::default();
        let err = policy
            .validate(&FileMeta::new("a.gif", "image/gif", 50 * MB))
            .unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedFormat { .. }));
    }
}
