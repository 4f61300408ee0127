mod api;
mod components;
mod route;

use api::{BrowserStore, HttpBackend, HttpClassifier, HttpUsers};
use client::config::{self, ClientConfig};
use client::{
    AnalysisOrchestrator, AnalysisOutcome, ClientError, DeleteOutcome, HistoryReconciler,
    Landing, LocalHistoryCache, RegistrationForm, Session,
};
use components::handlers;
use gloo_events::EventListener;
use gloo_file::{File as GlooFile, ObjectUrl};
use route::Route;
use shared::{AnalysisRecord, Mode, UserProfile, UserUpdate};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

type Orchestrator = AnalysisOrchestrator<HttpClassifier, HttpBackend, BrowserStore>;
type History = HistoryReconciler<HttpBackend, BrowserStore>;

/// The picked image and its preview URL; dropping it revokes the URL.
struct SelectedFile {
    file: GlooFile,
    preview: ObjectUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    LoginEmail,
    LoginPassword,
    RegisterEmail,
    RegisterPassword,
    RegisterConfirm,
    RegisterName,
    ResetEmail,
    NewPassword,
    ConfirmNewPassword,
    ProfileName,
    ProfileEmail,
    ProfilePassword,
    AnalysisText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserField {
    Name,
    Email,
    Role,
}

#[derive(Default)]
struct Forms {
    login_email: String,
    login_password: String,
    register: RegistrationForm,
    reset_email: String,
    new_password: String,
    confirm_new_password: String,
    profile_name: String,
    profile_email: String,
    profile_password: String,
    analysis_text: String,
}

impl Forms {
    fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::LoginEmail => &mut self.login_email,
            Field::LoginPassword => &mut self.login_password,
            Field::RegisterEmail => &mut self.register.email,
            Field::RegisterPassword => &mut self.register.password,
            Field::RegisterConfirm => &mut self.register.confirm_password,
            Field::RegisterName => &mut self.register.full_name,
            Field::ResetEmail => &mut self.reset_email,
            Field::NewPassword => &mut self.new_password,
            Field::ConfirmNewPassword => &mut self.confirm_new_password,
            Field::ProfileName => &mut self.profile_name,
            Field::ProfileEmail => &mut self.profile_email,
            Field::ProfilePassword => &mut self.profile_password,
            Field::AnalysisText => &mut self.analysis_text,
        };
        *slot = value;
    }

    fn clear_passwords(&mut self) {
        self.login_password.clear();
        self.register.password.clear();
        self.register.confirm_password.clear();
        self.new_password.clear();
        self.confirm_new_password.clear();
        self.profile_password.clear();
    }
}

enum Msg {
    // Navigation
    Navigate(Route),
    RouteChanged,

    // Analyzer
    SetMode(Mode),
    HealthChecked,
    FileChosen(GlooFile),
    ClearFile,
    SetDragging(bool),
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
    Analyze,
    AnalysisFinished(Result<AnalysisOutcome, ClientError>),

    // History
    HistoryLoaded,
    SelectAnalysis(String),
    AnalysisSelected(Result<AnalysisRecord, ClientError>),
    DeleteAnalysis(String),
    AnalysisDeleted(DeleteOutcome),

    // Accounts
    Input(Field, String),
    Login,
    LoggedIn(Result<(Session, Landing), ClientError>),
    Logout,
    Register,
    Registered(Result<(), ClientError>),
    RequestReset,
    ResetRequested(Result<String, ClientError>),
    ResetPassword(String),
    PasswordReset(Result<String, ClientError>),
    ProfileLoaded(Result<UserProfile, ClientError>),
    SaveProfile,
    ProfileSaved(Result<UserProfile, ClientError>),
    UsersLoaded(Result<Vec<UserProfile>, ClientError>),
    EditUser(String, UserField, String),
    SaveUser(String),
    UserSaved(String, Result<UserProfile, ClientError>),

    // UI states
    SetError(Option<String>),
}

struct Model {
    route: Route,
    session: Session,
    orchestrator: Rc<Orchestrator>,
    users_api: Rc<HttpUsers>,
    mode: Mode,
    upload: Option<SelectedFile>,
    forms: Forms,
    profile: Option<UserProfile>,
    users: Vec<UserProfile>,
    user_edits: HashMap<String, UserUpdate>,
    loading: bool,
    is_dragging: bool,
    error: Option<String>,
    notice: Option<String>,
    paste_listener: Option<EventListener>,
    popstate_listener: Option<EventListener>,
}

impl Model {
    fn history(&self) -> &Rc<History> {
        self.orchestrator.history()
    }
}

fn build_env(name: &str) -> Option<String> {
    let value = match name {
        config::ENV_API_URL => option_env!("REACT_APP_API_URL"),
        config::ENV_ML_API => option_env!("REACT_APP_ML_API"),
        config::ENV_DRAWING_API => option_env!("REACT_APP_DRAWING_API"),
        config::ENV_BACKEND_API => option_env!("REACT_APP_BACKEND_API"),
        _ => None,
    };
    value.map(str::to_string)
}

fn load_config() -> ClientConfig {
    ClientConfig::load(build_env).unwrap_or_else(|e| {
        log::error!("Invalid client configuration, using defaults: {}", e);
        ClientConfig::default()
    })
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let config = Rc::new(load_config());
        let cache = LocalHistoryCache::new(
            BrowserStore,
            config.history.cache_key.clone(),
            config.history.capacity,
        );
        let history = Rc::new(HistoryReconciler::new(HttpBackend::new(config.clone()), cache));
        let orchestrator = Rc::new(AnalysisOrchestrator::new(
            HttpClassifier::new(config.clone()),
            history,
            config.clone(),
        ));
        let session = Session::load(&BrowserStore);
        let requested = Route::current();
        let route = requested.clone().guard(&session);
        if route != requested {
            route.replace();
        }

        let mut model = Self {
            route,
            session,
            orchestrator,
            users_api: Rc::new(HttpUsers::new(config)),
            mode: Mode::Text,
            upload: None,
            forms: Forms::default(),
            profile: None,
            users: Vec::new(),
            user_edits: HashMap::new(),
            loading: false,
            is_dragging: false,
            error: None,
            notice: None,
            paste_listener: None,
            popstate_listener: None,
        };

        if let Some(window) = web_sys::window() {
            let link = ctx.link().clone();
            model.paste_listener = Some(EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            }));
            let link = ctx.link().clone();
            model.popstate_listener = Some(EventListener::new(&window, "popstate", move |_| {
                link.send_message(Msg::RouteChanged);
            }));
        }

        handlers::enter_route(&mut model, ctx);
        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            // Navigation
            Msg::Navigate(route) => handlers::handle_navigate(self, ctx, route),
            Msg::RouteChanged => handlers::handle_route_changed(self, ctx),

            // Analyzer
            Msg::SetMode(mode) => handlers::handle_set_mode(self, ctx, mode),
            Msg::HealthChecked => true,
            Msg::FileChosen(file) => handlers::handle_file_chosen(self, file),
            Msg::ClearFile => {
                self.upload = None;
                true
            }
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handlers::handle_paste(self, ctx, event),
            Msg::Analyze => handlers::handle_analyze(self, ctx),
            Msg::AnalysisFinished(result) => handlers::handle_analysis_finished(self, result),

            // History
            Msg::HistoryLoaded => true,
            Msg::SelectAnalysis(id) => handlers::handle_select_analysis(self, ctx, id),
            Msg::AnalysisSelected(result) => handlers::handle_analysis_selected(self, result),
            Msg::DeleteAnalysis(id) => handlers::handle_delete_analysis(self, ctx, id),
            Msg::AnalysisDeleted(outcome) => handlers::handle_analysis_deleted(self, outcome),

            // Accounts
            Msg::Input(field, value) => {
                self.forms.set(field, value);
                false
            }
            Msg::Login => handlers::handle_login(self, ctx),
            Msg::LoggedIn(result) => handlers::handle_logged_in(self, ctx, result),
            Msg::Logout => handlers::handle_logout(self, ctx),
            Msg::Register => handlers::handle_register(self, ctx),
            Msg::Registered(result) => handlers::handle_registered(self, ctx, result),
            Msg::RequestReset => handlers::handle_request_reset(self, ctx),
            Msg::ResetPassword(token) => handlers::handle_reset_password(self, ctx, token),
            Msg::ResetRequested(result) | Msg::PasswordReset(result) => {
                handlers::handle_account_message(self, result)
            }
            Msg::ProfileLoaded(result) => handlers::handle_profile_loaded(self, result),
            Msg::SaveProfile => handlers::handle_save_profile(self, ctx),
            Msg::ProfileSaved(result) => handlers::handle_profile_saved(self, result),
            Msg::UsersLoaded(result) => handlers::handle_users_loaded(self, result),
            Msg::EditUser(id, field, value) => handlers::handle_edit_user(self, id, field, value),
            Msg::SaveUser(id) => handlers::handle_save_user(self, ctx, id),
            Msg::UserSaved(id, result) => handlers::handle_user_saved(self, id, result),

            // UI states
            Msg::SetError(error) => {
                self.error = error;
                self.loading = false;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { components::header::render_header(self, ctx) }

                <main class="main-content">
                    { components::utils::render_error_message(self) }
                    { components::utils::render_notice(self) }
                    { self.render_route(ctx) }
                </main>

                <footer class="app-footer">
                    <p>{"Emotired | Análisis de emociones"}</p>
                </footer>
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.orchestrator.cancel_pending();
    }
}

impl Model {
    fn render_route(&self, ctx: &Context<Self>) -> Html {
        match &self.route {
            Route::Welcome => components::header::render_welcome(ctx),
            Route::Login => components::auth::render_login(self, ctx),
            Route::Register => components::auth::render_register(self, ctx),
            Route::RequestReset => components::auth::render_request_reset(self, ctx),
            Route::ResetPassword { token } => {
                components::auth::render_reset_password(self, ctx, token)
            }
            Route::Analyzer => html! {
                <>
                    { components::upload_section::render_upload_section(self, ctx) }
                    { components::results::render_results(self) }
                    { components::history::render_history(self, ctx) }
                </>
            },
            Route::Profile => components::profile::render_profile(self, ctx),
            Route::Admin => components::admin::render_admin(self, ctx),
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Emotired client starting...");
    yew::Renderer::<Model>::new().render();
}
