use sauron::{html::attributes::*, html::*, prelude::*};
use shared::view::{format_timestamp, TaskItemState};
use shared::Task;

use crate::Msg;

/// One task card. `state` is `None` while the item is in view mode.
pub fn view_item(task: &Task, state: Option<&TaskItemState>, index: usize) -> Node<Msg> {
    let body = match state.and_then(|s| s.draft().map(|d| (s, d))) {
        Some((state, draft)) => view_editor(task, state, &draft.title, &draft.description),
        None => view_details(task),
    };
    div(
        [
            key(task.id.to_string()),
            class(&format!(
                "group border rounded-xl p-4 bg-ctp-surface0 shadow-sm transition-all duration-300 hover:shadow-lg animate-fade-in {}",
                if task.completed {
                    "border-ctp-green bg-ctp-green/10"
                } else {
                    "border-ctp-surface1 hover:border-ctp-blue"
                }
            )),
            styles([("animation-delay", format!("{}ms", index * 50))]),
        ],
        [body],
    )
}

fn view_details(task: &Task) -> Node<Msg> {
    let id = task.id;
    div([class("flex items-start gap-3")], [
        button([
            on_click(move |_| Msg::ToggleTask(id)),
            r#type("button"),
            class(&format!(
                "mt-0.5 flex-shrink-0 w-6 h-6 rounded-full border-2 flex items-center justify-center transition-all duration-200 {}",
                if task.completed {
                    "bg-ctp-green border-ctp-green text-ctp-base"
                } else {
                    "border-ctp-surface2 text-ctp-subtext0 hover:border-ctp-blue"
                }
            )),
        ], [text(if task.completed { "✓" } else { "" })]),
        div([class("flex-1 min-w-0 space-y-2")], [
            h3([class(&format!(
                "font-medium leading-snug {}",
                if task.completed {
                    "line-through text-ctp-overlay1"
                } else {
                    "text-ctp-text"
                }
            ))], [text(&task.title)]),
            match &task.description {
                Some(description) => p([class(&format!(
                    "text-sm leading-relaxed break-words {}",
                    if task.completed {
                        "line-through text-ctp-overlay0"
                    } else {
                        "text-ctp-subtext1"
                    }
                ))], [text(description)]),
                None => span([], []),
            },
            div([class("flex items-center gap-4 text-xs text-ctp-subtext0")], [
                span([], [text(&format!("📅 Created {}", format_timestamp(task.created_at)))]),
                if task.was_updated() {
                    span([], [text(&format!("• Updated {}", format_timestamp(task.updated_at)))])
                } else {
                    span([], [])
                },
            ]),
        ]),
        div([class("flex gap-1 opacity-0 group-hover:opacity-100 transition-opacity")], [
            button([
                on_click(move |_| Msg::EditTask(id)),
                r#type("button"),
                class("inline-flex items-center justify-center w-8 h-8 rounded-lg text-ctp-subtext0 hover:text-ctp-blue hover:bg-ctp-blue/20"),
            ], [text("✏️")]),
            button([
                on_click(move |_| Msg::DeleteTask(id)),
                r#type("button"),
                class("inline-flex items-center justify-center w-8 h-8 rounded-lg text-ctp-subtext0 hover:text-ctp-red hover:bg-ctp-red/20"),
            ], [text("🗑️")]),
        ]),
    ])
}

fn view_editor(task: &Task, state: &TaskItemState, title: &str, description: &str) -> Node<Msg> {
    let id = task.id;
    div([class("space-y-3")], [
        input([
            r#type("text"),
            placeholder("Task title"),
            value(title.to_string()),
            on_input(move |event| Msg::SetEditTitle(id, event.value())),
            class("w-full px-3 py-2 bg-ctp-surface1 border border-ctp-surface2 rounded-md text-ctp-text font-medium focus:outline-none focus:ring-2 focus:ring-ctp-blue"),
        ], []),
        textarea([
            placeholder("Description (optional)"),
            value(description.to_string()),
            on_input(move |event| Msg::SetEditDescription(id, event.value())),
            class("w-full px-3 py-2 bg-ctp-surface1 border border-ctp-surface2 rounded-md text-ctp-text focus:outline-none focus:ring-2 focus:ring-ctp-blue h-16 resize-y"),
        ], []),
        div([class("flex gap-2")], [
            button([
                on_click(move |_| Msg::SaveEdit(id)),
                disabled(!state.can_save()),
                class("bg-ctp-green hover:bg-ctp-teal disabled:opacity-50 text-ctp-base font-medium px-4 py-2 rounded-md transition-colors duration-200"),
            ], [text("Save")]),
            button([
                on_click(move |_| Msg::CancelEdit(id)),
                class("bg-ctp-overlay0 hover:bg-ctp-overlay1 text-ctp-text font-medium px-4 py-2 rounded-md transition-colors duration-200"),
            ], [text("Cancel")]),
        ]),
    ])
}
