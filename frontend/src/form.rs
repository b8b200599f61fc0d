use sauron::{html::attributes::*, html::*, prelude::*};
use shared::view::TaskForm;

use crate::Msg;

pub fn view_form(form: &TaskForm) -> Node<Msg> {
    div(
        [class("mb-6 p-6 bg-ctp-surface0 rounded-lg shadow-lg border border-ctp-surface1")],
        [div([class("space-y-4")], [
            input([
                r#type("text"),
                placeholder("What needs to be done?"),
                value(&form.title),
                on_input(|event| Msg::SetNewTaskTitle(event.value())),
                class("w-full px-3 py-2 bg-transparent text-lg text-ctp-text placeholder-ctp-subtext0 focus:outline-none"),
            ], []),
            textarea([
                placeholder("Additional description (optional)"),
                value(&form.description),
                on_input(|event| Msg::SetNewTaskDescription(event.value())),
                class("w-full px-3 py-2 bg-transparent text-ctp-text placeholder-ctp-subtext0 focus:outline-none h-16 resize-y"),
            ], []),
            button([
                on_click(|_| Msg::CreateTask),
                disabled(!form.can_submit()),
                class("w-full bg-ctp-blue hover:bg-ctp-sapphire disabled:opacity-50 text-ctp-base font-medium px-6 py-2 rounded-md transition-colors duration-200"),
            ], [text("+ Add Task")]),
        ])],
    )
}
