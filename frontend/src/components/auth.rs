use super::super::{Field, Model, Msg};
use super::utils::{on_input, on_submit};
use crate::route::Route;
use yew::prelude::*;

fn text_field(
    ctx: &Context<Model>,
    field: Field,
    label: &'static str,
    kind: &'static str,
    value: &str,
) -> Html {
    html! {
        <label class="form-field">
            <span>{ label }</span>
            <input type={kind} value={value.to_string()} oninput={on_input(ctx, field)} required=true />
        </label>
    }
}

fn submit_button(model: &Model, label: &'static str) -> Html {
    html! {
        <button type="submit" class="analyze-btn" disabled={model.loading}>
            if model.loading {
                <i class="fa-solid fa-spinner fa-spin"></i>
            }
            { format!(" {}", label) }
        </button>
    }
}

fn link_to(ctx: &Context<Model>, route: Route, label: &'static str) -> Html {
    html! {
        <a
            href={route.path()}
            onclick={ctx.link().callback(move |e: MouseEvent| {
                e.prevent_default();
                Msg::Navigate(route.clone())
            })}
        >
            { label }
        </a>
    }
}

pub fn render_login(model: &Model, ctx: &Context<Model>) -> Html {
    let forms = &model.forms;
    html! {
        <form class="auth-card" onsubmit={on_submit(ctx, || Msg::Login)}>
            <h2>{"Iniciar sesión"}</h2>
            { text_field(ctx, Field::LoginEmail, "Correo", "email", &forms.login_email) }
            { text_field(ctx, Field::LoginPassword, "Contraseña", "password", &forms.login_password) }
            { submit_button(model, "Entrar") }
            <p class="auth-links">
                { link_to(ctx, Route::RequestReset, "¿Olvidaste tu contraseña?") }
                {" · "}
                { link_to(ctx, Route::Register, "Crear cuenta") }
            </p>
        </form>
    }
}

pub fn render_register(model: &Model, ctx: &Context<Model>) -> Html {
    let form = &model.forms.register;
    html! {
        <form class="auth-card" onsubmit={on_submit(ctx, || Msg::Register)}>
            <h2>{"Crear cuenta"}</h2>
            { text_field(ctx, Field::RegisterName, "Nombre completo", "text", &form.full_name) }
            { text_field(ctx, Field::RegisterEmail, "Correo", "email", &form.email) }
            { text_field(ctx, Field::RegisterPassword, "Contraseña", "password", &form.password) }
            { text_field(ctx, Field::RegisterConfirm, "Confirmar contraseña", "password", &form.confirm_password) }
            { submit_button(model, "Registrarse") }
            <p class="auth-links">{ link_to(ctx, Route::Login, "¿Ya tienes cuenta? Inicia sesión") }</p>
        </form>
    }
}

pub fn render_request_reset(model: &Model, ctx: &Context<Model>) -> Html {
    html! {
        <form class="auth-card" onsubmit={on_submit(ctx, || Msg::RequestReset)}>
            <h2>{"Restablecer contraseña"}</h2>
            { text_field(ctx, Field::ResetEmail, "Correo", "email", &model.forms.reset_email) }
            { submit_button(model, "Enviar instrucciones") }
            <p class="auth-links">{ link_to(ctx, Route::Login, "Volver a iniciar sesión") }</p>
        </form>
    }
}

pub fn render_reset_password(model: &Model, ctx: &Context<Model>, token: &str) -> Html {
    let token = token.to_string();
    html! {
        <form class="auth-card" onsubmit={on_submit(ctx, move || Msg::ResetPassword(token.clone()))}>
            <h2>{"Nueva contraseña"}</h2>
            { text_field(ctx, Field::NewPassword, "Contraseña nueva", "password", &model.forms.new_password) }
            { text_field(ctx, Field::ConfirmNewPassword, "Confirmar contraseña", "password", &model.forms.confirm_new_password) }
            { submit_button(model, "Guardar contraseña") }
            <p class="auth-links">{ link_to(ctx, Route::Login, "Ir a iniciar sesión") }</p>
        </form>
    }
}
