use super::super::{Model, Msg};
use crate::route::Route;
use shared::Role;
use yew::prelude::*;

fn nav_link(ctx: &Context<Model>, route: Route, label: &'static str, active: bool) -> Html {
    html! {
        <a
            href={route.path()}
            class={classes!("nav-link", active.then_some("active"))}
            onclick={ctx.link().callback(move |e: MouseEvent| {
                e.prevent_default();
                Msg::Navigate(route.clone())
            })}
        >
            { label }
        </a>
    }
}

pub fn render_header(model: &Model, ctx: &Context<Model>) -> Html {
    let current = &model.route;
    let links = match model.session.role() {
        None => html! {
            <>
                { nav_link(ctx, Route::Login, "Iniciar sesión", *current == Route::Login) }
                { nav_link(ctx, Route::Register, "Registrarse", *current == Route::Register) }
            </>
        },
        Some(role) => html! {
            <>
                if *role == Role::Usuario {
                    { nav_link(ctx, Route::Analyzer, "Analizar", *current == Route::Analyzer) }
                }
                if *role == Role::Admin {
                    { nav_link(ctx, Route::Admin, "Usuarios", *current == Route::Admin) }
                }
                { nav_link(ctx, Route::Profile, "Perfil", *current == Route::Profile) }
                <button class="nav-button" onclick={ctx.link().callback(|_| Msg::Logout)}>
                    <i class="fa-solid fa-right-from-bracket"></i>{" Cerrar sesión"}
                </button>
            </>
        },
    };

    html! {
        <header class="app-header">
            <div class="brand">
                <i class="fa-solid fa-brain"></i>
                { nav_link(ctx, Route::Welcome, "Emotired", false) }
            </div>
            <nav class="app-nav">{ links }</nav>
        </header>
    }
}

pub fn render_welcome(ctx: &Context<Model>) -> Html {
    html! {
        <section class="welcome">
            <h1>{"Descubre las emociones detrás de cada trazo"}</h1>
            <p class="subtitle">
                {"Sube un dibujo o escribe un texto y obtén el análisis emocional al instante."}
            </p>
            <div class="button-container">
                <button class="analyze-btn" onclick={ctx.link().callback(|_| Msg::Navigate(Route::Login))}>
                    {"Iniciar sesión"}
                </button>
                <button class="analyze-btn secondary" onclick={ctx.link().callback(|_| Msg::Navigate(Route::Register))}>
                    {"Crear cuenta"}
                </button>
            </div>
        </section>
    }
}
