//! Seams to the outside world. The browser build implements these over
//! `gloo-net`; tests use in-memory fakes.
#![allow(async_fn_in_trait)]

use shared::{
    AnalysisRecord, ApiMessage, ClassificationResponse, HealthResponse, LoginRequest,
    LoginResponse, Mode, PasswordResetRequest, ProfileUpdate, RegisterRequest,
    ResetPasswordRequest, SaveAnalysisRequest, UserProfile, UserUpdate,
};

use crate::error::TransportError;

/// Content submitted for classification. `U` is the platform's file handle.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisInput<U> {
    File(U),
    Text(String),
}

/// The external emotion classifiers.
pub trait ClassifierApi {
    type Upload;

    async fn health(&self, mode: Mode) -> Result<HealthResponse, TransportError>;

    /// A single POST; non-2xx replies carry the server's detail when it sent one.
    async fn classify(
        &self,
        mode: Mode,
        input: &AnalysisInput<Self::Upload>,
    ) -> Result<ClassificationResponse, TransportError>;
}

/// The backend that persists analyses.
pub trait AnalysisBackend {
    async fn fetch_all(&self) -> Result<Vec<AnalysisRecord>, TransportError>;
    async fn fetch_one(&self, id: &str) -> Result<AnalysisRecord, TransportError>;
    async fn save(&self, request: &SaveAnalysisRequest) -> Result<AnalysisRecord, TransportError>;
    async fn delete(&self, id: &str) -> Result<(), TransportError>;
}

/// The users REST API.
pub trait UsersApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, TransportError>;
    async fn register(&self, request: &RegisterRequest) -> Result<(), TransportError>;
    async fn profile(&self, token: &str) -> Result<UserProfile, TransportError>;
    async fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, TransportError>;
    async fn list_users(&self, token: &str) -> Result<Vec<UserProfile>, TransportError>;
    async fn fetch_user(&self, token: &str, id: &str) -> Result<UserProfile, TransportError>;
    async fn update_user(
        &self,
        token: &str,
        id: &str,
        update: &UserUpdate,
    ) -> Result<(), TransportError>;
    async fn request_password_reset(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<ApiMessage, TransportError>;
    async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<ApiMessage, TransportError>;
}

/// Blocking yes/no prompt.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}
