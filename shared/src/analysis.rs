use crate::emotion::{EmotionDistribution, InvalidScore, ScoreScale};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use strum_macros::Display;

/// Multipart field carrying the uploaded file, identical for every mode.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    #[default]
    #[serde(alias = "image")]
    Text,
    Drawing,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Text, Mode::Drawing];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ServiceStatus {
    #[default]
    Checking,
    Available,
    Loading,
    Unavailable,
}

fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// One completed emotion analysis, as stored by the backend or in the local
/// history cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, alias = "date")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub text: String,
    #[serde(alias = "emotionResults")]
    pub emotions: EmotionDistribution,
    #[serde(default, deserialize_with = "nullable_string")]
    pub dominant_emotion: String,
    #[serde(default)]
    pub mode: Mode,
}

impl AnalysisRecord {
    pub fn from_normalized(
        id: String,
        created_at: DateTime<Utc>,
        image_url: Option<String>,
        mode: Mode,
        analysis: NormalizedAnalysis,
    ) -> Self {
        Self {
            id,
            created_at,
            image_url,
            text: analysis.text,
            emotions: analysis.emotions,
            dominant_emotion: analysis.dominant,
            mode,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub model_loaded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextAnalysisRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationData {
    pub emotions: EmotionDistribution,
    #[serde(default)]
    pub dominant_emotion: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<ClassificationData>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAnalysis {
    pub emotions: EmotionDistribution,
    pub dominant: String,
    pub text: String,
    pub scale: ScoreScale,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizeError {
    Unsuccessful { detail: Option<String> },
    MissingData,
    EmptyDistribution,
    InvalidScore(InvalidScore),
}

impl NormalizeError {
    pub fn server_detail(&self) -> Option<&str> {
        match self {
            NormalizeError::Unsuccessful { detail } => detail.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::Unsuccessful { detail: Some(d) } => write!(f, "{}", d),
            NormalizeError::Unsuccessful { detail: None } => {
                write!(f, "the service reported an unsuccessful analysis")
            }
            NormalizeError::MissingData => write!(f, "the response carried no analysis data"),
            NormalizeError::EmptyDistribution => write!(f, "the response carried no emotions"),
            NormalizeError::InvalidScore(e) => write!(f, "{}", e),
        }
    }
}

impl ClassificationResponse {
    /// First non-empty error description the server supplied.
    pub fn server_detail(&self) -> Option<String> {
        let detail = self.detail.as_ref().map(|d| match d {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        self.error
            .clone()
            .into_iter()
            .chain(detail)
            .chain(self.message.clone())
            .find(|s| !s.trim().is_empty())
    }

    /// The one place a classification payload turns into client data.
    pub fn normalize(self, scale: ScoreScale) -> Result<NormalizedAnalysis, NormalizeError> {
        if !self.success {
            return Err(NormalizeError::Unsuccessful {
                detail: self.server_detail(),
            });
        }
        let data = self.data.ok_or(NormalizeError::MissingData)?;
        data.emotions.validate().map_err(NormalizeError::InvalidScore)?;

        let dominant = match data.dominant_emotion {
            Some(label) if data.emotions.contains(&label) => label,
            _ => data
                .emotions
                .dominant()
                .map(str::to_string)
                .ok_or(NormalizeError::EmptyDistribution)?,
        };

        Ok(NormalizedAnalysis {
            emotions: data.emotions,
            dominant,
            text: data.text,
            scale,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnalysisRequest {
    pub image_url: Option<String>,
    pub text: String,
    pub emotions: EmotionDistribution,
    pub dominant_emotion: String,
    pub mode: Mode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl SaveAnalysisRequest {
    pub fn new(
        analysis: &NormalizedAnalysis,
        image_url: Option<String>,
        mode: Mode,
        user_id: Option<String>,
    ) -> Self {
        Self {
            image_url,
            text: analysis.text.clone(),
            emotions: analysis.emotions.clone(),
            dominant_emotion: analysis.dominant.clone(),
            mode,
            user_id,
        }
    }
}

/// Backend payloads arrive either bare or wrapped in `{success, data}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ApiEnvelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            ApiEnvelope::Wrapped { data } => data,
            ApiEnvelope::Bare(inner) => inner,
        }
    }
}
