use super::super::{Model, Msg, UserField};
use shared::{Role, UserProfile};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

fn edit_callback(ctx: &Context<Model>, id: &str, field: UserField) -> Callback<Event> {
    let id = id.to_string();
    ctx.link().callback(move |e: Event| {
        let value = match field {
            UserField::Role => e.target_unchecked_into::<HtmlSelectElement>().value(),
            _ => e.target_unchecked_into::<HtmlInputElement>().value(),
        };
        Msg::EditUser(id.clone(), field, value)
    })
}

fn render_row(model: &Model, ctx: &Context<Model>, user: &UserProfile) -> Html {
    let edit = model.user_edits.get(&user.id);
    let name = edit.and_then(|e| e.name.clone()).unwrap_or_else(|| user.name.clone());
    let email = edit.and_then(|e| e.email.clone()).unwrap_or_else(|| user.email.clone());
    let role = edit.and_then(|e| e.role.clone()).unwrap_or_else(|| user.role.clone());
    let dirty = edit.is_some_and(|e| !e.is_empty());
    let id = user.id.clone();

    html! {
        <tr key={user.id.clone()}>
            <td><input type="text" value={name} onchange={edit_callback(ctx, &user.id, UserField::Name)} /></td>
            <td><input type="email" value={email} onchange={edit_callback(ctx, &user.id, UserField::Email)} /></td>
            <td>
                <select onchange={edit_callback(ctx, &user.id, UserField::Role)}>
                    { for Role::ASSIGNABLE.iter().chain(std::iter::once(&Role::Usuario)).map(|option| html! {
                        <option value={option.to_string()} selected={*option == role}>{ option.label() }</option>
                    })}
                </select>
            </td>
            <td>
                <button
                    class="analyze-btn"
                    disabled={!dirty}
                    onclick={ctx.link().callback(move |_| Msg::SaveUser(id.clone()))}
                >
                    <i class="fa-solid fa-floppy-disk"></i>{" Guardar"}
                </button>
            </td>
        </tr>
    }
}

pub fn render_admin(model: &Model, ctx: &Context<Model>) -> Html {
    html! {
        <section class="admin">
            <h2><i class="fa-solid fa-users"></i>{" Gestionar usuarios"}</h2>
            <table class="users-table">
                <thead>
                    <tr>
                        <th>{"Nombre"}</th>
                        <th>{"Correo"}</th>
                        <th>{"Rol"}</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    { for model.users.iter().map(|user| render_row(model, ctx, user)) }
                </tbody>
            </table>
        </section>
    }
}
