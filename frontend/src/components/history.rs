use super::super::{Model, Msg};
use shared::emotion::{display_label, label_icon};
use yew::prelude::*;

pub fn render_history(model: &Model, ctx: &Context<Model>) -> Html {
    let records = model.history().records();
    let displayed_id = model.history().displayed().map(|r| r.id);

    html! {
        <section class="history">
            <h2><i class="fa-solid fa-clock-rotate-left"></i>{" Historial de análisis"}</h2>
            if records.is_empty() {
                <p class="no-results-message">{"Todavía no hay análisis guardados."}</p>
            } else {
                <ul class="history-list">
                    { for records.into_iter().map(|record| {
                        let id = record.id.clone();
                        let delete_id = record.id.clone();
                        let selected = displayed_id.as_deref() == Some(record.id.as_str());
                        html! {
                            <li
                                key={record.id.clone()}
                                class={classes!("history-item", selected.then_some("selected"))}
                                onclick={ctx.link().callback(move |_| Msg::SelectAnalysis(id.clone()))}
                            >
                                <span class="history-icon">{ label_icon(&record.dominant_emotion) }</span>
                                <span class="history-label">{ display_label(&record.dominant_emotion) }</span>
                                <span class="history-date">
                                    { record.created_at.format("%d/%m/%Y %H:%M").to_string() }
                                </span>
                                <button
                                    class="remove-btn"
                                    title="Eliminar análisis"
                                    onclick={ctx.link().callback(move |e: MouseEvent| {
                                        e.stop_propagation();
                                        Msg::DeleteAnalysis(delete_id.clone())
                                    })}
                                >
                                    <i class="fa-solid fa-trash" style="font-size: 10px;"></i>
                                </button>
                            </li>
                        }
                    })}
                </ul>
            }
        </section>
    }
}
