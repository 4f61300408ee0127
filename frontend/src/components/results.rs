use super::super::Model;
use shared::emotion::{display_label, label_icon};
use yew::prelude::*;

pub fn render_results(model: &Model) -> Html {
    let Some(record) = model.history().displayed() else {
        return html! {};
    };
    let scale = model.orchestrator.config().scale(record.mode);
    let bars = record.emotions.bars(scale);
    let dominant = record.dominant_emotion.as_str();

    html! {
        <div class="results-container">
            <div class="result-header">
                <h2>
                    { label_icon(dominant) }
                    { format!(" Emoción dominante: {}", display_label(dominant)) }
                </h2>
                if !record.text.is_empty() {
                    <p class="analyzed-text">{ format!("\u{201c}{}\u{201d}", record.text) }</p>
                }
                if let Some(url) = &record.image_url {
                    <img class="analyzed-image" src={url.clone()} alt="Imagen analizada" />
                }
            </div>
            <div class="detailed-results">
                <h3>{"Distribución de emociones"}</h3>
                <div class="result-bars">
                    { for bars.iter().map(|bar| html! {
                        <div class={classes!("result-item", (bar.label == dominant).then_some("dominant"))}>
                            <div class="result-label">
                                { format!("{} {}", label_icon(&bar.label), display_label(&bar.label)) }
                            </div>
                            <div class="result-bar-container">
                                <div class="result-bar" style={bar.style()}></div>
                            </div>
                            <div class="result-value">{ bar.percent_text() }</div>
                        </div>
                    })}
                </div>
            </div>
        </div>
    }
}
