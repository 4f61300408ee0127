use client::config::ClientConfig;
use client::storage::StorageError;
use client::{
    AnalysisBackend, AnalysisInput, ClassifierApi, KeyValueStore, TransportError, UsersApi,
};
use futures::future::{Either, select};
use gloo_file::File as GlooFile;
use gloo_net::http::{Request, RequestBuilder, Response};
use gloo_storage::{LocalStorage, Storage};
use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::{
    AnalysisRecord, ApiEnvelope, ApiMessage, ClassificationResponse, HealthResponse,
    LoginRequest, LoginResponse, Mode, PasswordResetRequest, ProfileUpdate, RegisterRequest,
    ResetPasswordRequest, SaveAnalysisRequest, TextAnalysisRequest, UPLOAD_FIELD, UserProfile,
    UserUpdate,
};
use std::future::Future;
use std::rc::Rc;
use web_sys::AbortController;

/// Aborts the underlying fetch when the time budget runs out.
struct Deadline {
    controller: Option<AbortController>,
    ms: u32,
}

impl Deadline {
    fn new(ms: u32) -> Self {
        Self {
            controller: AbortController::new().ok(),
            ms,
        }
    }

    fn attach(&self, builder: RequestBuilder) -> RequestBuilder {
        let signal = self.controller.as_ref().map(|c| c.signal());
        builder.abort_signal(signal.as_ref())
    }

    async fn run<T>(
        self,
        request: impl Future<Output = Result<T, TransportError>>,
    ) -> Result<T, TransportError> {
        match select(Box::pin(request), Box::pin(TimeoutFuture::new(self.ms))).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => {
                if let Some(controller) = &self.controller {
                    controller.abort();
                }
                Err(TransportError::Timeout)
            }
        }
    }
}

fn network(err: gloo_net::Error) -> TransportError {
    TransportError::Network(err.to_string())
}

fn bearer(builder: RequestBuilder, token: &str) -> RequestBuilder {
    builder.header("Authorization", &format!("Bearer {}", token))
}

/// Error bodies from every service use some of `error`, `detail`, `message`.
fn error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ClassificationResponse>(body)
        .ok()
        .and_then(|r| r.server_detail())
}

async fn check(response: Response) -> Result<Response, TransportError> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    log::debug!("{} answered {}: {}", response.url(), status, body);
    Err(TransportError::Status {
        status,
        detail: error_detail(&body),
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    check(response)
        .await?
        .json::<T>()
        .await
        .map_err(|e| TransportError::Decode(e.to_string()))
}

async fn read_wrapped<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    read_json::<ApiEnvelope<T>>(response)
        .await
        .map(ApiEnvelope::into_inner)
}

fn with_json(builder: RequestBuilder, body: &impl Serialize) -> Result<Request, TransportError> {
    builder
        .json(body)
        .map_err(|e| TransportError::Decode(e.to_string()))
}

pub struct HttpClassifier {
    config: Rc<ClientConfig>,
}

impl HttpClassifier {
    pub fn new(config: Rc<ClientConfig>) -> Self {
        Self { config }
    }

    fn upload(
        &self,
        mode: Mode,
        file: &GlooFile,
        deadline: &Deadline,
    ) -> Result<Request, TransportError> {
        let form = web_sys::FormData::new()
            .map_err(|e| TransportError::Network(format!("{:?}", e)))?;
        form.append_with_blob_and_filename(UPLOAD_FIELD, file.as_ref(), &file.name())
            .map_err(|e| TransportError::Network(format!("{:?}", e)))?;
        deadline
            .attach(Request::post(&self.config.classify_url(mode)))
            .body(form)
            .map_err(network)
    }
}

impl ClassifierApi for HttpClassifier {
    type Upload = GlooFile;

    async fn health(&self, mode: Mode) -> Result<HealthResponse, TransportError> {
        let deadline = Deadline::new(self.config.timeouts.health_ms());
        let request = deadline.attach(Request::get(&self.config.health_url(mode)));
        deadline
            .run(async move { read_json(request.send().await.map_err(network)?).await })
            .await
    }

    async fn classify(
        &self,
        mode: Mode,
        input: &AnalysisInput<GlooFile>,
    ) -> Result<ClassificationResponse, TransportError> {
        let deadline = Deadline::new(self.config.timeouts.analysis_ms());
        let request = match input {
            AnalysisInput::File(file) => self.upload(mode, file, &deadline)?,
            AnalysisInput::Text(text) => with_json(
                deadline.attach(Request::post(&self.config.classify_text_url())),
                &TextAnalysisRequest { text: text.clone() },
            )?,
        };
        log::info!("Sending {} analysis to {}", mode, request.url());
        deadline
            .run(async move { read_json(request.send().await.map_err(network)?).await })
            .await
    }
}

pub struct HttpBackend {
    config: Rc<ClientConfig>,
}

impl HttpBackend {
    pub fn new(config: Rc<ClientConfig>) -> Self {
        Self { config }
    }

    fn deadline(&self) -> Deadline {
        Deadline::new(self.config.timeouts.backend_ms())
    }
}

impl AnalysisBackend for HttpBackend {
    async fn fetch_all(&self) -> Result<Vec<AnalysisRecord>, TransportError> {
        let deadline = self.deadline();
        let request = deadline.attach(Request::get(&self.config.history_url()));
        deadline
            .run(async move { read_wrapped(request.send().await.map_err(network)?).await })
            .await
    }

    async fn fetch_one(&self, id: &str) -> Result<AnalysisRecord, TransportError> {
        let deadline = self.deadline();
        let request = deadline.attach(Request::get(&self.config.analysis_url(id)));
        deadline
            .run(async move { read_wrapped(request.send().await.map_err(network)?).await })
            .await
    }

    async fn save(&self, body: &SaveAnalysisRequest) -> Result<AnalysisRecord, TransportError> {
        let deadline = self.deadline();
        let request = with_json(deadline.attach(Request::post(&self.config.save_url())), body)?;
        deadline
            .run(async move { read_wrapped(request.send().await.map_err(network)?).await })
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), TransportError> {
        let deadline = self.deadline();
        let request = deadline.attach(Request::delete(&self.config.analysis_url(id)));
        deadline
            .run(async move {
                check(request.send().await.map_err(network)?).await?;
                Ok(())
            })
            .await
    }
}

pub struct HttpUsers {
    config: Rc<ClientConfig>,
}

impl HttpUsers {
    pub fn new(config: Rc<ClientConfig>) -> Self {
        Self { config }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        build: impl FnOnce(&Deadline) -> Result<Request, TransportError>,
    ) -> Result<T, TransportError> {
        let deadline = Deadline::new(self.config.timeouts.backend_ms());
        let request = build(&deadline)?;
        deadline
            .run(async move { read_wrapped(request.send().await.map_err(network)?).await })
            .await
    }

    async fn send_empty(
        &self,
        build: impl FnOnce(&Deadline) -> Result<Request, TransportError>,
    ) -> Result<(), TransportError> {
        let deadline = Deadline::new(self.config.timeouts.backend_ms());
        let request = build(&deadline)?;
        deadline
            .run(async move {
                check(request.send().await.map_err(network)?).await?;
                Ok(())
            })
            .await
    }
}

impl UsersApi for HttpUsers {
    async fn login(&self, body: &LoginRequest) -> Result<LoginResponse, TransportError> {
        let url = self.config.users_url("login");
        self.send(|d| with_json(d.attach(Request::post(&url)), body)).await
    }

    async fn register(&self, body: &RegisterRequest) -> Result<(), TransportError> {
        let url = self.config.users_url("register");
        self.send_empty(|d| with_json(d.attach(Request::post(&url)), body)).await
    }

    async fn profile(&self, token: &str) -> Result<UserProfile, TransportError> {
        let url = self.config.users_url("profile");
        self.send(|d| d.attach(bearer(Request::get(&url), token)).build().map_err(network))
            .await
    }

    async fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, TransportError> {
        let url = self.config.users_url("profile");
        self.send(|d| with_json(d.attach(bearer(Request::put(&url), token)), update))
            .await
    }

    async fn list_users(&self, token: &str) -> Result<Vec<UserProfile>, TransportError> {
        let url = self.config.users_url("");
        self.send(|d| d.attach(bearer(Request::get(&url), token)).build().map_err(network))
            .await
    }

    async fn fetch_user(&self, token: &str, id: &str) -> Result<UserProfile, TransportError> {
        let url = self.config.user_url(id);
        self.send(|d| d.attach(bearer(Request::get(&url), token)).build().map_err(network))
            .await
    }

    async fn update_user(
        &self,
        token: &str,
        id: &str,
        update: &UserUpdate,
    ) -> Result<(), TransportError> {
        let url = self.config.user_url(id);
        self.send_empty(|d| with_json(d.attach(bearer(Request::patch(&url), token)), update))
            .await
    }

    async fn request_password_reset(
        &self,
        body: &PasswordResetRequest,
    ) -> Result<ApiMessage, TransportError> {
        let url = self.config.users_url("request-password-reset");
        self.send(|d| with_json(d.attach(Request::post(&url)), body)).await
    }

    async fn reset_password(
        &self,
        body: &ResetPasswordRequest,
    ) -> Result<ApiMessage, TransportError> {
        let url = self.config.users_url("reset-password");
        self.send(|d| with_json(d.attach(Request::post(&url)), body)).await
    }
}

/// The browser's local storage, read and written as raw strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStore;

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| StorageError::Write(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) {
        if let Err(e) = LocalStorage::raw().remove_item(key) {
            log::warn!("Could not remove {} from local storage: {:?}", key, e);
        }
    }
}

/// `window.confirm`; answers no when there is no window.
pub fn confirm_in_browser(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}
