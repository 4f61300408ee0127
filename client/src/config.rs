use serde::{Deserialize, Serialize};
use shared::{Mode, ScoreScale};
use url::Url;

use crate::storage::HISTORY_KEY;
use crate::validator::UploadPolicy;

/// The YAML shipped with the repository, embedded so the browser build needs
/// no file access.
pub const DEFAULT_CONFIG: &str = include_str!("../../config/client.yaml");

pub const ENV_API_URL: &str = "REACT_APP_API_URL";
pub const ENV_ML_API: &str = "REACT_APP_ML_API";
pub const ENV_DRAWING_API: &str = "REACT_APP_DRAWING_API";
pub const ENV_BACKEND_API: &str = "REACT_APP_BACKEND_API";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("YAML parsing failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid URL for {name}: {reason}")]
    InvalidUrl { name: &'static str, reason: String },
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Users API.
    pub api_url: String,
    /// Image and text classifier.
    pub ml_api: String,
    /// Drawing classifier.
    pub drawing_api: String,
    /// Analysis persistence.
    pub backend_api: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeouts {
    pub analysis_secs: u32,
    pub health_secs: u32,
    pub backend_secs: u32,
}

impl Timeouts {
    pub fn analysis_ms(&self) -> u32 {
        self.analysis_secs.saturating_mul(1000)
    }

    pub fn health_ms(&self) -> u32 {
        self.health_secs.saturating_mul(1000)
    }

    pub fn backend_ms(&self) -> u32 {
        self.backend_secs.saturating_mul(1000)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub capacity: usize,
    pub cache_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub scale: ScoreScale,
    /// When false the service is treated as available without calling
    /// `/health`.
    pub health_check: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Services {
    pub text: ServiceConfig,
    pub drawing: ServiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    pub upload: UploadPolicy,
    pub timeouts: Timeouts,
    pub history: HistoryConfig,
    pub services: Services,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let backend = "https://backend-production-e954.up.railway.app".to_string();
        Self {
            endpoints: Endpoints {
                api_url: backend.clone(),
                ml_api: "https://emotion-ml-production.up.railway.app".into(),
                drawing_api: "https://drawing-ml-production.up.railway.app".into(),
                backend_api: backend,
            },
            upload: UploadPolicy::default(),
            timeouts: Timeouts {
                analysis_secs: 30,
                health_secs: 10,
                backend_secs: 15,
            },
            history: HistoryConfig {
                capacity: 10,
                cache_key: HISTORY_KEY.into(),
            },
            services: Services {
                text: ServiceConfig {
                    scale: ScoreScale::Fraction,
                    health_check: true,
                },
                drawing: ServiceConfig {
                    scale: ScoreScale::Fraction,
                    health_check: true,
                },
            },
        }
    }
}

fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

impl ClientConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// The embedded defaults with environment overrides applied.
    pub fn load(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::from_yaml_str(DEFAULT_CONFIG)?;
        config.apply_env(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Unset or blank variables keep the configured value.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let targets = [
            (ENV_API_URL, &mut self.endpoints.api_url),
            (ENV_ML_API, &mut self.endpoints.ml_api),
            (ENV_DRAWING_API, &mut self.endpoints.drawing_api),
            (ENV_BACKEND_API, &mut self.endpoints.backend_api),
        ];
        for (key, target) in targets {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                log::debug!("{} overridden from environment", key);
                *target = value.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let urls = [
            ("api_url", &self.endpoints.api_url),
            ("ml_api", &self.endpoints.ml_api),
            ("drawing_api", &self.endpoints.drawing_api),
            ("backend_api", &self.endpoints.backend_api),
        ];
        for (name, value) in urls {
            let parsed = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
                name,
                reason: e.to_string(),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidUrl {
                    name,
                    reason: format!("unsupported scheme '{}'", parsed.scheme()),
                });
            }
        }
        if self.history.capacity == 0 {
            return Err(ConfigError::Invalid("history capacity must be positive".into()));
        }
        if self.upload.max_megabytes <= 0.0 || self.upload.accepted_types.is_empty() {
            return Err(ConfigError::Invalid("upload policy accepts nothing".into()));
        }
        Ok(())
    }

    pub fn service(&self, mode: Mode) -> &ServiceConfig {
        match mode {
            Mode::Text => &self.services.text,
            Mode::Drawing => &self.services.drawing,
        }
    }

    pub fn scale(&self, mode: Mode) -> ScoreScale {
        self.service(mode).scale
    }

    fn service_base(&self, mode: Mode) -> &str {
        match mode {
            Mode::Text => &self.endpoints.ml_api,
            Mode::Drawing => &self.endpoints.drawing_api,
        }
    }

    pub fn classify_url(&self, mode: Mode) -> String {
        match mode {
            Mode::Text => join(self.service_base(mode), "analyze-image"),
            Mode::Drawing => join(self.service_base(mode), "analyze-drawing"),
        }
    }

    /// Raw text always goes to the text classifier.
    pub fn classify_text_url(&self) -> String {
        join(&self.endpoints.ml_api, "analyze-text")
    }

    pub fn health_url(&self, mode: Mode) -> String {
        join(self.service_base(mode), "health")
    }

    pub fn history_url(&self) -> String {
        join(&self.endpoints.backend_api, "analysis/all")
    }

    pub fn save_url(&self) -> String {
        join(&self.endpoints.backend_api, "analysis/save")
    }

    pub fn analysis_url(&self, id: &str) -> String {
        join(
            &self.endpoints.backend_api,
            &format!("analysis/{}", urlencoding::encode(id)),
        )
    }

    pub fn users_url(&self, path: &str) -> String {
        let base = join(&self.endpoints.api_url, "users");
        if path.is_empty() { base } else { join(&base, path) }
    }

    pub fn user_url(&self, id: &str) -> String {
        self.users_url(&urlencoding::encode(id))
    }
}
