use super::super::{Field, Model, Msg};
use super::preview_area::render_preview_area;
use super::utils::{debounce, first_file, on_text_input};
use shared::{Mode, ServiceStatus};
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Text => "Texto e imagen",
        Mode::Drawing => "Dibujo",
    }
}

pub fn render_status_badge(status: ServiceStatus) -> Html {
    let (class, icon, label) = match status {
        ServiceStatus::Checking => ("checking", "fa-spinner fa-spin", "Verificando servicio..."),
        ServiceStatus::Available => ("available", "fa-circle-check", "Servicio disponible"),
        ServiceStatus::Loading => ("loading", "fa-hourglass-half", "El modelo se está cargando"),
        ServiceStatus::Unavailable => ("unavailable", "fa-circle-xmark", "Servicio no disponible"),
    };
    html! {
        <span class={classes!("status-badge", class)}>
            <i class={classes!("fa-solid", icon)}></i>{ format!(" {}", label) }
        </span>
    }
}

pub fn render_upload_section(model: &Model, ctx: &Context<Model>) -> Html {
    let status = model.orchestrator.status(model.mode);
    html! {
        <div class="upload-section">
            <div class="mode-switch">
                { for Mode::ALL.iter().map(|&mode| html! {
                    <button
                        class={classes!("mode-btn", (model.mode == mode).then_some("selected"))}
                        onclick={ctx.link().callback(move |_| Msg::SetMode(mode))}
                    >
                        { mode_label(mode) }
                    </button>
                })}
                { render_status_badge(status) }
            </div>
            { render_file_input_area(model, ctx) }
            { render_preview_area(model, ctx) }
            if model.mode == Mode::Text && model.upload.is_none() {
                <textarea
                    class="analysis-text"
                    placeholder="Escribe cómo te sientes..."
                    value={model.forms.analysis_text.clone()}
                    oninput={on_text_input(ctx, Field::AnalysisText)}
                />
            }
            { render_analyze_button(model, ctx, status) }
        </div>
    }
}

fn render_file_input_area(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let handle_change = link.batch_callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input.files().as_ref().and_then(first_file);
        input.set_value("");
        file.map(Msg::FileChosen)
    });

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);
    let trigger_file_input = Callback::from(|_| {
        let input = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("file-input"));
        if let Some(input) = input {
            if let Ok(html_input) = input.dyn_into::<web_sys::HtmlElement>() {
                html_input.click();
            }
        }
    });
    let accept = model.orchestrator.config().upload.accepted_types.join(",");

    html! {
        <>
            <input
                type="file"
                id="file-input"
                accept={accept}
                style="display: none;"
                onchange={handle_change}
            />

            <div
                id="drop-zone"
                class={classes!("upload-area", model.is_dragging.then_some("drag-over"))}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
                onclick={debounce(300, {
                    let trigger_file_input = trigger_file_input.clone();
                    move || trigger_file_input.emit(())
                })}
            >
                <div class="upload-placeholder">
                    <i class="fa-solid fa-cloud-arrow-up"></i>
                    <p>{"Arrastra una imagen aquí, pégala o haz clic"}</p>
                    <p class="file-types">
                        { format!("Formatos: JPG, PNG | Máximo {} MB", model.orchestrator.config().upload.max_megabytes) }
                    </p>
                </div>
            </div>
        </>
    }
}

fn render_analyze_button(model: &Model, ctx: &Context<Model>, status: ServiceStatus) -> Html {
    let disabled = model.loading || status != ServiceStatus::Available;
    let link = ctx.link().clone();
    html! {
        <div class="button-container">
            <button
                class="analyze-btn"
                disabled={disabled}
                onclick={debounce(300, move || link.send_message(Msg::Analyze))}
            >
                if model.loading {
                    <i class="fa-solid fa-spinner fa-spin"></i>{" Analizando..."}
                } else {
                    <i class="fa-solid fa-magnifying-glass"></i>{" Analizar emociones"}
                }
            </button>
        </div>
    }
}
