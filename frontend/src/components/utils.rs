use super::super::{Field, Model, Msg};
use gloo_file::File as GlooFile;
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::{FileList, HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

// Debounce function to limit button events
pub fn debounce<F>(duration: u32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));

    Callback::from(move |_| {
        let mut timeout_ref = timeout.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        *timeout_ref = Some(Timeout::new(duration, move || inner_callback()));
    })
}

pub fn first_file(file_list: &FileList) -> Option<GlooFile> {
    file_list.item(0).map(GlooFile::from)
}

pub fn on_input(ctx: &Context<Model>, field: Field) -> Callback<InputEvent> {
    ctx.link().callback(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::Input(field, input.value())
    })
}

pub fn on_text_input(ctx: &Context<Model>, field: Field) -> Callback<InputEvent> {
    ctx.link().callback(move |e: InputEvent| {
        let area: HtmlTextAreaElement = e.target_unchecked_into();
        Msg::Input(field, area.value())
    })
}

pub fn on_submit(ctx: &Context<Model>, make: impl Fn() -> Msg + 'static) -> Callback<SubmitEvent> {
    ctx.link().callback(move |e: SubmitEvent| {
        e.prevent_default();
        make()
    })
}

pub fn render_error_message(model: &Model) -> Html {
    if let Some(error_msg) = &model.error {
        html! {
            <div class="error-message">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p>{ error_msg }</p>
            </div>
        }
    } else {
        html! {}
    }
}

pub fn render_notice(model: &Model) -> Html {
    match &model.notice {
        Some(notice) => html! {
            <div class="notice-message">
                <i class="fa-solid fa-circle-info"></i>
                <p>{ notice }</p>
            </div>
        },
        None => html! {},
    }
}
