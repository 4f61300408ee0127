use super::super::{Model, Msg};
use yew::prelude::*;

pub fn render_preview_area(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(selected) = &model.upload else {
        return html! {};
    };
    let name = selected.file.name();

    html! {
        <div id="preview-container">
            <img
                id="actual-image-preview"
                src={selected.preview.to_string()}
                alt={name.clone()}
                style="max-width:100%; max-height: 400px; object-fit: contain; margin-bottom: 10px;"
            />
            <div class="preview-caption">
                <span title={name.clone()}>{ short_name(&name) }</span>
                <button
                    class="remove-btn"
                    title="Quitar imagen"
                    onclick={ctx.link().callback(|e: MouseEvent| {
                        e.stop_propagation();
                        Msg::ClearFile
                    })}
                >
                    <i class="fa-solid fa-times" style="font-size: 10px;"></i>
                </button>
            </div>
        </div>
    }
}

fn short_name(name: &str) -> String {
    if name.chars().count() > 20 {
        format!("{}...", name.chars().take(17).collect::<String>())
    } else {
        name.to_string()
    }
}
