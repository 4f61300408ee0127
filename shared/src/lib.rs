pub mod analysis;
pub mod emotion;
pub mod users;

pub use analysis::{
    AnalysisRecord, ApiEnvelope, ClassificationData, ClassificationResponse, HealthResponse, Mode,
    NormalizeError, NormalizedAnalysis, SaveAnalysisRequest, ServiceStatus, TextAnalysisRequest,
    UPLOAD_FIELD,
};
pub use emotion::{Emotion, EmotionBar, EmotionDistribution, InvalidScore, ScoreScale};
pub use users::{
    ApiMessage, LoginRequest, LoginResponse, PasswordResetRequest, ProfileUpdate, RegisterRequest,
    ResetPasswordRequest, Role, UserProfile, UserUpdate,
};
