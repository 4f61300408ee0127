//! Emotion result client: validates uploads, sends them to the emotion
//! classifiers, saves results to the backend with a local fallback and keeps
//! the analysis history in step.

pub mod config;
pub mod error;
pub mod history;
pub mod orchestrator;
pub mod request;
pub mod session;
pub mod storage;
pub mod transport;
pub mod users;
pub mod validator;

pub use config::ClientConfig;
pub use error::{ClientError, TransportError};
pub use history::{DeleteOutcome, History, HistoryReconciler, Origin};
pub use orchestrator::{AnalysisOrchestrator, AnalysisOutcome};
pub use request::{RequestToken, RequestTracker};
pub use session::{Identity, Session};
pub use storage::{KeyValueStore, LocalHistoryCache, MemoryStore, StorageError};
pub use transport::{AnalysisBackend, AnalysisInput, ClassifierApi, Confirm, UsersApi};
pub use users::{FormError, Landing, RegistrationForm};
pub use validator::{FileMeta, UploadPolicy};
