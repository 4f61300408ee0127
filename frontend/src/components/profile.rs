use super::super::{Field, Model, Msg};
use super::utils::{on_input, on_submit};
use yew::prelude::*;

pub fn render_profile(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(profile) = &model.profile else {
        return html! {
            <p class="loading-message"><i class="fa-solid fa-spinner fa-spin"></i>{" Cargando perfil..."}</p>
        };
    };
    let forms = &model.forms;

    html! {
        <form class="auth-card profile" onsubmit={on_submit(ctx, || Msg::SaveProfile)}>
            <h2><i class="fa-solid fa-user"></i>{ format!(" {}", profile.name) }</h2>
            <p class="profile-role">{ profile.role.label() }</p>
            <label class="form-field">
                <span>{"Nombre"}</span>
                <input type="text" value={forms.profile_name.clone()} oninput={on_input(ctx, Field::ProfileName)} />
            </label>
            <label class="form-field">
                <span>{"Correo"}</span>
                <input type="email" value={forms.profile_email.clone()} oninput={on_input(ctx, Field::ProfileEmail)} />
            </label>
            <label class="form-field">
                <span>{"Nueva contraseña (opcional)"}</span>
                <input type="password" value={forms.profile_password.clone()} oninput={on_input(ctx, Field::ProfilePassword)} />
            </label>
            <button type="submit" class="analyze-btn" disabled={model.loading}>{"Guardar cambios"}</button>
        </form>
    }
}
