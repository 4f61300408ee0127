#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use client::{
    AnalysisBackend, AnalysisInput, AnalysisOrchestrator, ClassifierApi, ClientConfig,
    FileMeta, HistoryReconciler, LocalHistoryCache, MemoryStore, TransportError, UsersApi,
};
use shared::{
    AnalysisRecord, ApiMessage, ClassificationResponse, HealthResponse, LoginRequest,
    LoginResponse, Mode, PasswordResetRequest, ProfileUpdate, RegisterRequest,
    ResetPasswordRequest, SaveAnalysisRequest, UserProfile, UserUpdate,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Returns `Pending` once so joined futures interleave deterministically.
pub struct YieldNow(bool);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

pub fn yield_now() -> YieldNow {
    YieldNow(false)
}

pub fn record(id: &str, minute: u32, emotions: &[(&str, f64)]) -> AnalysisRecord {
    let emotions: shared::EmotionDistribution = emotions.iter().cloned().collect();
    AnalysisRecord {
        id: id.into(),
        created_at: Utc.with_ymd_and_hms(2025, 5, 1, 10, minute, 0).unwrap(),
        image_url: None,
        text: String::new(),
        dominant_emotion: emotions.dominant().unwrap_or_default().to_string(),
        emotions,
        mode: Mode::Text,
    }
}

pub fn success(json_emotions: &str, dominant: &str) -> ClassificationResponse {
    serde_json::from_str(&format!(
        r#"{{"success": true, "data": {{"emotions": {}, "dominant_emotion": "{}"}}}}"#,
        json_emotions, dominant
    ))
    .unwrap()
}

pub fn png(size: u64) -> FileMeta {
    FileMeta::new("drawing.png", "image/png", size)
}

#[derive(Default)]
pub struct ClassifierState {
    pub model_loaded: Cell<bool>,
    pub health_fails: Cell<bool>,
    pub health_calls: Cell<usize>,
    pub responses: RefCell<VecDeque<Result<ClassificationResponse, TransportError>>>,
    pub requests: RefCell<Vec<(Mode, AnalysisInput<FileMeta>)>>,
    pub yield_before_reply: Cell<bool>,
}

#[derive(Clone, Default)]
pub struct FakeClassifier {
    pub state: Rc<ClassifierState>,
}

impl FakeClassifier {
    pub fn healthy() -> Self {
        let fake = Self::default();
        fake.state.model_loaded.set(true);
        fake
    }

    pub fn reply(&self, response: Result<ClassificationResponse, TransportError>) {
        self.state.responses.borrow_mut().push_back(response);
    }
}

impl ClassifierApi for FakeClassifier {
    type Upload = FileMeta;

    async fn health(&self, _mode: Mode) -> Result<HealthResponse, TransportError> {
        self.state.health_calls.set(self.state.health_calls.get() + 1);
        if self.state.health_fails.get() {
            return Err(TransportError::Network("connection refused".into()));
        }
        Ok(HealthResponse {
            model_loaded: self.state.model_loaded.get(),
        })
    }

    async fn classify(
        &self,
        mode: Mode,
        input: &AnalysisInput<FileMeta>,
    ) -> Result<ClassificationResponse, TransportError> {
        self.state.requests.borrow_mut().push((mode, input.clone()));
        let reply = self
            .state
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(TransportError::Timeout));
        if self.state.yield_before_reply.get() {
            yield_now().await;
        }
        reply
    }
}

#[derive(Default)]
pub struct BackendState {
    pub records: RefCell<Vec<AnalysisRecord>>,
    pub saved: RefCell<Vec<SaveAnalysisRequest>>,
    pub deleted: RefCell<Vec<String>>,
    pub fetch_fails: Cell<bool>,
    pub fetch_one_fails: Cell<bool>,
    pub save_fails: Cell<bool>,
    pub delete_fails: Cell<bool>,
    pub yield_on_fetch: Cell<bool>,
    pub next_id: Cell<u32>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    pub state: Rc<BackendState>,
}

impl FakeBackend {
    pub fn with_records(records: Vec<AnalysisRecord>) -> Self {
        let fake = Self::default();
        *fake.state.records.borrow_mut() = records;
        fake
    }
}

impl AnalysisBackend for FakeBackend {
    async fn fetch_all(&self) -> Result<Vec<AnalysisRecord>, TransportError> {
        if self.state.yield_on_fetch.get() {
            yield_now().await;
        }
        if self.state.fetch_fails.get() {
            return Err(TransportError::Network("offline".into()));
        }
        Ok(self.state.records.borrow().clone())
    }

    async fn fetch_one(&self, id: &str) -> Result<AnalysisRecord, TransportError> {
        if self.state.fetch_one_fails.get() {
            return Err(TransportError::Timeout);
        }
        self.state
            .records
            .borrow()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(TransportError::Status {
                status: 404,
                detail: Some("Analysis not found".into()),
            })
    }

    async fn save(&self, request: &SaveAnalysisRequest) -> Result<AnalysisRecord, TransportError> {
        self.state.saved.borrow_mut().push(request.clone());
        if self.state.save_fails.get() {
            return Err(TransportError::Status {
                status: 500,
                detail: None,
            });
        }
        let id = self.state.next_id.get() + 1;
        self.state.next_id.set(id);
        let record = AnalysisRecord {
            id: format!("srv-{}", id),
            created_at: Utc.with_ymd_and_hms(2025, 5, 2, 9, 0, id).unwrap(),
            image_url: request.image_url.clone(),
            text: request.text.clone(),
            emotions: request.emotions.clone(),
            dominant_emotion: request.dominant_emotion.clone(),
            mode: request.mode,
        };
        self.state.records.borrow_mut().insert(0, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<(), TransportError> {
        self.state.deleted.borrow_mut().push(id.to_string());
        if self.state.delete_fails.get() {
            return Err(TransportError::Status {
                status: 503,
                detail: None,
            });
        }
        self.state.records.borrow_mut().retain(|r| r.id != id);
        Ok(())
    }
}

pub struct Fixture {
    pub store: MemoryStore,
    pub classifier: FakeClassifier,
    pub backend: FakeBackend,
    pub history: Rc<HistoryReconciler<FakeBackend, MemoryStore>>,
    pub orchestrator: AnalysisOrchestrator<FakeClassifier, FakeBackend, MemoryStore>,
}

pub fn fixture_with(config: ClientConfig, backend: FakeBackend) -> Fixture {
    init_logging();
    let store = MemoryStore::new();
    let classifier = FakeClassifier::healthy();
    let cache = LocalHistoryCache::new(
        store.clone(),
        config.history.cache_key.clone(),
        config.history.capacity,
    );
    let history = Rc::new(HistoryReconciler::new(backend.clone(), cache));
    let orchestrator =
        AnalysisOrchestrator::new(classifier.clone(), history.clone(), Rc::new(config));
    Fixture {
        store,
        classifier,
        backend,
        history,
        orchestrator,
    }
}

pub fn fixture() -> Fixture {
    fixture_with(ClientConfig::default(), FakeBackend::default())
}

#[derive(Default)]
pub struct UsersState {
    pub login_reply: RefCell<Option<Result<LoginResponse, TransportError>>>,
    pub users: RefCell<Vec<UserProfile>>,
    pub registered: RefCell<Vec<RegisterRequest>>,
    pub patches: RefCell<Vec<(String, UserUpdate)>>,
    pub fetch_user_fails: Cell<bool>,
    pub offline: Cell<bool>,
    pub tokens_seen: RefCell<Vec<String>>,
}

#[derive(Clone, Default)]
pub struct FakeUsers {
    pub state: Rc<UsersState>,
}

impl FakeUsers {
    fn check(&self, token: Option<&str>) -> Result<(), TransportError> {
        if let Some(token) = token {
            self.state.tokens_seen.borrow_mut().push(token.to_string());
        }
        if self.state.offline.get() {
            return Err(TransportError::Network("offline".into()));
        }
        Ok(())
    }
}

impl UsersApi for FakeUsers {
    async fn login(&self, _request: &LoginRequest) -> Result<LoginResponse, TransportError> {
        self.check(None)?;
        self.state
            .login_reply
            .borrow_mut()
            .take()
            .unwrap_or(Err(TransportError::Status {
                status: 401,
                detail: None,
            }))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), TransportError> {
        self.check(None)?;
        self.state.registered.borrow_mut().push(request.clone());
        Ok(())
    }

    async fn profile(&self, token: &str) -> Result<UserProfile, TransportError> {
        self.check(Some(token))?;
        self.state
            .users
            .borrow()
            .first()
            .cloned()
            .ok_or(TransportError::Status {
                status: 404,
                detail: None,
            })
    }

    async fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, TransportError> {
        self.check(Some(token))?;
        let mut users = self.state.users.borrow_mut();
        let me = users.first_mut().ok_or(TransportError::Status {
            status: 404,
            detail: None,
        })?;
        if let Some(name) = &update.name {
            me.name = name.clone();
        }
        if let Some(email) = &update.email {
            me.email = email.clone();
        }
        Ok(me.clone())
    }

    async fn list_users(&self, token: &str) -> Result<Vec<UserProfile>, TransportError> {
        self.check(Some(token))?;
        Ok(self.state.users.borrow().clone())
    }

    async fn fetch_user(&self, token: &str, id: &str) -> Result<UserProfile, TransportError> {
        self.check(Some(token))?;
        if self.state.fetch_user_fails.get() {
            return Err(TransportError::Timeout);
        }
        self.state
            .users
            .borrow()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(TransportError::Status {
                status: 404,
                detail: None,
            })
    }

    async fn update_user(
        &self,
        token: &str,
        id: &str,
        update: &UserUpdate,
    ) -> Result<(), TransportError> {
        self.check(Some(token))?;
        self.state
            .patches
            .borrow_mut()
            .push((id.to_string(), update.clone()));
        if let Some(user) = self.state.users.borrow_mut().iter_mut().find(|u| u.id == id) {
            user.apply(update);
        }
        Ok(())
    }

    async fn request_password_reset(
        &self,
        _request: &PasswordResetRequest,
    ) -> Result<ApiMessage, TransportError> {
        self.check(None)?;
        Ok(ApiMessage::default())
    }

    async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<ApiMessage, TransportError> {
        self.check(None)?;
        if request.token == "expired" {
            return Err(TransportError::Status {
                status: 400,
                detail: Some("Token inválido o expirado".into()),
            });
        }
        Ok(ApiMessage::default())
    }
}
