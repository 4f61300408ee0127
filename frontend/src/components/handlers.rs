use super::super::{Model, Msg, SelectedFile, UserField};
use super::utils::first_file;
use crate::api::{BrowserStore, confirm_in_browser};
use crate::route::Route;
use client::users;
use client::{
    AnalysisInput, AnalysisOutcome, ClientError, DeleteOutcome, FileMeta, Landing, Session,
};
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::{AnalysisRecord, Mode, Role, UserProfile};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent, FileList};
use yew::prelude::*;

/// Starts whatever the page being shown needs from the network.
pub fn enter_route(model: &mut Model, ctx: &Context<Model>) {
    model.error = None;
    model.notice = None;
    match model.route {
        Route::Analyzer => {
            check_health(model, ctx, model.mode);
            let history = model.history().clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                history.load().await;
                link.send_message(Msg::HistoryLoaded);
            });
        }
        Route::Profile => {
            let api = model.users_api.clone();
            let session = model.session.clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                let result = users::load_profile(&*api, &session).await;
                link.send_message(Msg::ProfileLoaded(result));
            });
        }
        Route::Admin => {
            let api = model.users_api.clone();
            let session = model.session.clone();
            let link = ctx.link().clone();
            spawn_local(async move {
                let result = users::list_users(&*api, &session).await;
                link.send_message(Msg::UsersLoaded(result));
            });
        }
        _ => {}
    }
}

fn show_route(model: &mut Model, ctx: &Context<Model>, route: Route) {
    let route = route.guard(&model.session);
    if model.route == Route::Analyzer && route != Route::Analyzer {
        model.orchestrator.cancel_pending();
        model.loading = false;
    }
    model.route = route;
    model.forms.clear_passwords();
    enter_route(model, ctx);
}

pub fn handle_navigate(model: &mut Model, ctx: &Context<Model>, route: Route) -> bool {
    let guarded = route.clone().guard(&model.session);
    guarded.push();
    show_route(model, ctx, guarded);
    true
}

pub fn handle_route_changed(model: &mut Model, ctx: &Context<Model>) -> bool {
    let route = Route::current();
    if route == model.route {
        return false;
    }
    show_route(model, ctx, route);
    true
}

fn check_health(model: &Model, ctx: &Context<Model>, mode: Mode) {
    let orchestrator = model.orchestrator.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        orchestrator.check_health(mode).await;
        link.send_message(Msg::HealthChecked);
    });
}

pub fn handle_set_mode(model: &mut Model, ctx: &Context<Model>, mode: Mode) -> bool {
    if model.mode == mode {
        return false;
    }
    model.mode = mode;
    model.error = None;
    check_health(model, ctx, mode);
    true
}

pub fn handle_file_chosen(model: &mut Model, file: GlooFile) -> bool {
    let meta = FileMeta::new(file.name(), file.raw_mime_type(), file.size());
    if let Err(e) = model.orchestrator.validate_upload(&meta) {
        log::warn!("Rejected {}: {}", meta.name, e);
        model.error = Some(e.to_string());
        return true;
    }
    model.error = None;
    // Replacing the previous selection drops (and revokes) its preview URL.
    model.upload = Some(SelectedFile {
        preview: ObjectUrl::from(file.clone()),
        file,
    });
    true
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if let Some(file_list) = event.data_transfer().and_then(|dt| dt.files()) {
        process_file_list(ctx, file_list);
    }
    true
}

pub fn handle_paste(model: &mut Model, ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    if model.route != Route::Analyzer {
        return false;
    }
    if let Some(file_list) = event.clipboard_data().and_then(|dt| dt.files()) {
        if file_list.length() > 0 {
            event.prevent_default();
            process_file_list(ctx, file_list);
            return true;
        }
    }
    false
}

/// Only the first file counts; the validator decides whether it is usable.
pub fn process_file_list(ctx: &Context<Model>, file_list: FileList) {
    match first_file(&file_list) {
        Some(file) => ctx.link().send_message(Msg::FileChosen(file)),
        None => log::debug!("Ignoring an empty file list"),
    }
}

pub fn handle_analyze(model: &mut Model, ctx: &Context<Model>) -> bool {
    if model.loading {
        return false;
    }
    let (input, image_ref) = match &model.upload {
        Some(selected) => (
            AnalysisInput::File(selected.file.clone()),
            Some(selected.preview.to_string()),
        ),
        None if model.mode == Mode::Text => {
            (AnalysisInput::Text(model.forms.analysis_text.clone()), None)
        }
        None => {
            model.error = Some("Selecciona una imagen antes de analizar.".into());
            return true;
        }
    };

    model.loading = true;
    model.error = None;
    model.notice = None;

    let orchestrator = model.orchestrator.clone();
    let session = model.session.clone();
    let mode = model.mode;
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = orchestrator.analyze(mode, input, image_ref, &session).await;
        link.send_message(Msg::AnalysisFinished(result));
    });
    true
}

pub fn handle_analysis_finished(
    model: &mut Model,
    result: Result<AnalysisOutcome, ClientError>,
) -> bool {
    match result {
        Ok(AnalysisOutcome::Superseded) => return false,
        Ok(AnalysisOutcome::Saved(record)) => {
            log::info!("Showing analysis {}", record.id);
        }
        Ok(AnalysisOutcome::SavedLocally { error, .. }) => {
            model.notice = Some(format!("{} El análisis se guardó en este navegador.", error));
        }
        Err(e) => {
            log::error!("Analysis failed: {}", e);
            model.error = Some(e.to_string());
        }
    }
    model.loading = false;
    true
}

pub fn handle_select_analysis(model: &mut Model, ctx: &Context<Model>, id: String) -> bool {
    let history = model.history().clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = history.select(&id).await;
        link.send_message(Msg::AnalysisSelected(result));
    });
    false
}

pub fn handle_analysis_selected(
    model: &mut Model,
    result: Result<AnalysisRecord, ClientError>,
) -> bool {
    if let Err(e) = result {
        model.error = Some(e.to_string());
    }
    true
}

pub fn handle_delete_analysis(model: &mut Model, ctx: &Context<Model>, id: String) -> bool {
    let history = model.history().clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        let outcome = history.delete(&id, &confirm_in_browser).await;
        link.send_message(Msg::AnalysisDeleted(outcome));
    });
    false
}

pub fn handle_analysis_deleted(model: &mut Model, outcome: DeleteOutcome) -> bool {
    match outcome {
        DeleteOutcome::Cancelled => false,
        DeleteOutcome::Removed { remote_error, .. } => {
            if let Some(e) = remote_error {
                model.notice = Some(e.to_string());
            }
            true
        }
    }
}

pub fn handle_login(model: &mut Model, ctx: &Context<Model>) -> bool {
    model.loading = true;
    model.error = None;
    let api = model.users_api.clone();
    let email = model.forms.login_email.clone();
    let password = model.forms.login_password.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = users::login(&*api, &BrowserStore, &email, &password).await;
        link.send_message(Msg::LoggedIn(result));
    });
    true
}

pub fn handle_logged_in(
    model: &mut Model,
    ctx: &Context<Model>,
    result: Result<(Session, Landing), ClientError>,
) -> bool {
    model.loading = false;
    match result {
        Ok((session, landing)) => {
            model.session = session;
            handle_navigate(model, ctx, Route::for_landing(landing))
        }
        Err(e) => {
            model.error = Some(e.to_string());
            true
        }
    }
}

pub fn handle_logout(model: &mut Model, ctx: &Context<Model>) -> bool {
    model.session = users::logout(&BrowserStore);
    model.profile = None;
    model.users.clear();
    model.user_edits.clear();
    model.upload = None;
    handle_navigate(model, ctx, Route::Login)
}

pub fn handle_register(model: &mut Model, ctx: &Context<Model>) -> bool {
    model.loading = true;
    model.error = None;
    let api = model.users_api.clone();
    let form = model.forms.register.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = users::register(&*api, &form).await;
        link.send_message(Msg::Registered(result));
    });
    true
}

pub fn handle_registered(
    model: &mut Model,
    ctx: &Context<Model>,
    result: Result<(), ClientError>,
) -> bool {
    model.loading = false;
    match result {
        Ok(()) => {
            model.forms.login_email = model.forms.register.email.trim().to_string();
            model.forms.register = Default::default();
            handle_navigate(model, ctx, Route::Login);
            model.notice = Some("Registro exitoso. Ya puedes iniciar sesión.".into());
        }
        Err(e) => model.error = Some(e.to_string()),
    }
    true
}

pub fn handle_request_reset(model: &mut Model, ctx: &Context<Model>) -> bool {
    model.loading = true;
    model.error = None;
    model.notice = None;
    let api = model.users_api.clone();
    let email = model.forms.reset_email.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = users::request_password_reset(&*api, &email).await;
        link.send_message(Msg::ResetRequested(result));
    });
    true
}

pub fn handle_reset_password(model: &mut Model, ctx: &Context<Model>, token: String) -> bool {
    model.loading = true;
    model.error = None;
    model.notice = None;
    let api = model.users_api.clone();
    let password = model.forms.new_password.clone();
    let confirm = model.forms.confirm_new_password.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = users::reset_password(&*api, &token, &password, &confirm).await;
        link.send_message(Msg::PasswordReset(result));
    });
    true
}

pub fn handle_account_message(model: &mut Model, result: Result<String, ClientError>) -> bool {
    model.loading = false;
    match result {
        Ok(message) => {
            model.forms.clear_passwords();
            model.notice = Some(message);
        }
        Err(e) => model.error = Some(e.to_string()),
    }
    true
}

pub fn handle_profile_loaded(model: &mut Model, result: Result<UserProfile, ClientError>) -> bool {
    match result {
        Ok(profile) => {
            model.forms.profile_name = profile.name.clone();
            model.forms.profile_email = profile.email.clone();
            model.profile = Some(profile);
        }
        Err(e) => model.error = Some(e.to_string()),
    }
    true
}

pub fn handle_save_profile(model: &mut Model, ctx: &Context<Model>) -> bool {
    model.loading = true;
    model.error = None;
    model.notice = None;
    let api = model.users_api.clone();
    let session = model.session.clone();
    let name = model.forms.profile_name.clone();
    let email = model.forms.profile_email.clone();
    let password = model.forms.profile_password.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = users::update_profile(&*api, &session, &name, &email, &password).await;
        link.send_message(Msg::ProfileSaved(result));
    });
    true
}

pub fn handle_profile_saved(model: &mut Model, result: Result<UserProfile, ClientError>) -> bool {
    model.loading = false;
    if result.is_ok() {
        model.forms.profile_password.clear();
        model.notice = Some("Perfil actualizado correctamente.".into());
    }
    handle_profile_loaded(model, result)
}

pub fn handle_users_loaded(
    model: &mut Model,
    result: Result<Vec<UserProfile>, ClientError>,
) -> bool {
    match result {
        Ok(users) => {
            log::debug!("Loaded {} users", users.len());
            model.users = users;
        }
        Err(e) => model.error = Some(e.to_string()),
    }
    true
}

pub fn handle_edit_user(model: &mut Model, id: String, field: UserField, value: String) -> bool {
    let edit = model.user_edits.entry(id).or_default();
    match field {
        UserField::Name => edit.name = Some(value),
        UserField::Email => edit.email = Some(value),
        UserField::Role => edit.role = value.parse::<Role>().ok(),
    }
    true
}

pub fn handle_save_user(model: &mut Model, ctx: &Context<Model>, id: String) -> bool {
    let Some(row) = model.users.iter().find(|u| u.id == id).cloned() else {
        return false;
    };
    let update = model.user_edits.get(&id).cloned().unwrap_or_default();
    let api = model.users_api.clone();
    let session = model.session.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = users::save_user_edit(&*api, &session, &row, &update).await;
        link.send_message(Msg::UserSaved(id, result));
    });
    false
}

pub fn handle_user_saved(
    model: &mut Model,
    id: String,
    result: Result<UserProfile, ClientError>,
) -> bool {
    match result {
        Ok(saved) => {
            if let Some(row) = model.users.iter_mut().find(|u| u.id == id) {
                *row = saved;
            }
            model.user_edits.remove(&id);
            model.notice = Some("Usuario actualizado correctamente.".into());
        }
        Err(e) => {
            log::warn!("Saving user {} failed: {}", id, e);
            model.error = Some(e.to_string());
        }
    }
    true
}
