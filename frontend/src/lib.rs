use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use sauron::{html::attributes::*, html::*, prelude::*};
use shared::view::{empty_state, stats_summary, TaskForm, TaskItemState};
use shared::{
    Notice, Operation, PendingUpdate, Task, TaskError, TaskFilter, TaskPersistence, TaskStore,
};
use uuid::Uuid;

pub mod browser;
pub mod config;
pub mod filters;
pub mod form;
pub mod item;
pub mod logging;
pub mod remote;

use config::Backend;

#[derive(Debug, Clone)]
pub enum Msg {
    LoadTasks,
    TasksLoaded(Vec<Task>),

    // Form
    SetNewTaskTitle(String),
    SetNewTaskDescription(String),
    CreateTask,
    TaskCreated(Task),

    // Items
    ToggleTask(Uuid),
    EditTask(Uuid),
    SetEditTitle(Uuid, String),
    SetEditDescription(Uuid, String),
    SaveEdit(Uuid),
    CancelEdit(Uuid),
    TaskSaved(Task),
    DeleteTask(Uuid),
    TaskDeleted(Uuid),

    SetFilter(TaskFilter),

    Failed(Operation, Rc<TaskError>),
    DismissNotice(u64),
}

/// The task manager page.
#[derive(Debug, Clone)]
pub struct Model {
    store: TaskStore<Backend>,
    form: TaskForm,
    // Items currently in edit mode.
    items: HashMap<Uuid, TaskItemState>,
    loading: bool,
}

impl Model {
    pub fn new(store: TaskStore<Backend>) -> Self {
        Self {
            store,
            form: TaskForm::default(),
            items: HashMap::new(),
            loading: false,
        }
    }

    fn persist_update(&self, pending: PendingUpdate) -> Cmd<Msg> {
        let persistence = self.store.persistence().clone();
        Cmd::new(async move {
            match persistence.update(&pending.current, &pending.patch).await {
                Ok(task) => Msg::TaskSaved(task),
                Err(e) => Msg::Failed(Operation::Update, Rc::new(e)),
            }
        })
    }
}

impl Application for Model {
    type MSG = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        tracing::info!(backend = config::backend_name(), "task manager starting");
        Cmd::new(async { Msg::LoadTasks })
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::LoadTasks => {
                self.loading = true;
                let persistence = self.store.persistence().clone();
                Cmd::new(async move {
                    match persistence.load_all().await {
                        Ok(tasks) => Msg::TasksLoaded(tasks),
                        Err(e) => Msg::Failed(Operation::Load, Rc::new(e)),
                    }
                })
            }
            Msg::TasksLoaded(tasks) => {
                self.loading = false;
                self.store.apply_loaded(tasks);
                let store = &self.store;
                self.items.retain(|id, _| store.contains(*id));
                Cmd::none()
            }
            Msg::SetNewTaskTitle(title) => {
                self.form.title = title;
                Cmd::none()
            }
            Msg::SetNewTaskDescription(description) => {
                self.form.description = description;
                Cmd::none()
            }
            Msg::CreateTask => {
                let Some(data) = self.form.submit() else {
                    return Cmd::none();
                };
                let Some(draft) = self.store.prepare_add(&data) else {
                    return Cmd::none();
                };
                let persistence = self.store.persistence().clone();
                Cmd::new(async move {
                    match persistence.insert(draft).await {
                        Ok(task) => Msg::TaskCreated(task),
                        Err(e) => Msg::Failed(Operation::Create, Rc::new(e)),
                    }
                })
            }
            Msg::TaskCreated(task) => {
                self.store.commit_insert(task);
                Cmd::none()
            }
            Msg::ToggleTask(id) => match self.store.prepare_toggle(id) {
                Some(pending) => self.persist_update(pending),
                None => Cmd::none(),
            },
            Msg::EditTask(id) => {
                if let Some(task) = self.store.get(id) {
                    self.items.insert(id, TaskItemState::editing(task));
                }
                Cmd::none()
            }
            Msg::SetEditTitle(id, title) => {
                if let Some(item) = self.items.get_mut(&id) {
                    item.set_title(title);
                }
                Cmd::none()
            }
            Msg::SetEditDescription(id, description) => {
                if let Some(item) = self.items.get_mut(&id) {
                    item.set_description(description);
                }
                Cmd::none()
            }
            Msg::SaveEdit(id) => {
                let Some(patch) = self.items.get_mut(&id).and_then(|item| item.save()) else {
                    return Cmd::none();
                };
                self.items.remove(&id);
                match self.store.prepare_update(id, &patch) {
                    Some(pending) => self.persist_update(pending),
                    None => Cmd::none(),
                }
            }
            Msg::CancelEdit(id) => {
                if let Some(mut item) = self.items.remove(&id) {
                    item.cancel();
                }
                Cmd::none()
            }
            Msg::TaskSaved(task) => {
                self.store.commit_update(task);
                Cmd::none()
            }
            Msg::DeleteTask(id) => {
                let Some(id) = self.store.prepare_delete(id) else {
                    return Cmd::none();
                };
                let persistence = self.store.persistence().clone();
                Cmd::new(async move {
                    match persistence.delete(id).await {
                        Ok(()) => Msg::TaskDeleted(id),
                        Err(e) => Msg::Failed(Operation::Delete, Rc::new(e)),
                    }
                })
            }
            Msg::TaskDeleted(id) => {
                self.store.commit_delete(id);
                self.items.remove(&id);
                Cmd::none()
            }
            Msg::SetFilter(filter) => {
                self.store.set_filter(filter);
                Cmd::none()
            }
            Msg::Failed(operation, err) => {
                if operation == Operation::Load {
                    self.loading = false;
                }
                let id = self.store.fail(operation, err);
                Cmd::new(async move {
                    TimeoutFuture::new(config::NOTICE_TIMEOUT_MS).await;
                    Msg::DismissNotice(id)
                })
            }
            Msg::DismissNotice(id) => {
                // Already gone if the user closed it before the timer fired.
                self.store.dismiss_notice(id);
                Cmd::none()
            }
        }
    }

    fn view(&self) -> Node<Msg> {
        let stats = self.store.stats();
        div(
            [class("min-h-screen bg-ctp-base text-ctp-text")],
            [
                self.view_notices(),
                div([class("max-w-4xl mx-auto px-4 py-8")], [
                    self.view_header(),
                    form::view_form(&self.form),
                    filters::view_filters(self.store.filter(), &stats),
                    if self.loading {
                        div([class("text-center py-10 text-ctp-subtext0 italic")], [text("Loading...")])
                    } else {
                        self.view_task_list()
                    },
                    match stats_summary(&stats) {
                        Some(summary) => div([class("mt-8 text-center text-sm text-ctp-subtext0")], [
                            p([], [text(&summary)]),
                        ]),
                        None => span([], []),
                    },
                ]),
            ],
        )
    }
}

impl Model {
    fn view_header(&self) -> Node<Msg> {
        div([class("text-center mb-8")], [
            div([class("flex items-center justify-center gap-3 mb-4")], [
                span([class("p-3 bg-ctp-blue rounded-2xl shadow-lg text-3xl")], [text("📋")]),
                h1([class("text-4xl font-bold text-ctp-text")], [text("Task Manager")]),
            ]),
            p([class("text-lg text-ctp-subtext1")], [text("Organize your tasks simply and efficiently")]),
        ])
    }

    fn view_task_list(&self) -> Node<Msg> {
        let tasks = self.store.visible_tasks();
        if tasks.is_empty() {
            return self.view_empty_state();
        }
        div(
            [class("space-y-3")],
            tasks
                .iter()
                .enumerate()
                .map(|(index, task)| item::view_item(task, self.items.get(&task.id), index))
                .collect::<Vec<_>>(),
        )
    }

    fn view_empty_state(&self) -> Node<Msg> {
        let copy = empty_state(self.store.filter());
        div([class("text-center py-12")], [
            div([class("text-ctp-overlay0 text-6xl mb-4")], [text(copy.icon)]),
            h3([class("text-xl font-medium text-ctp-text mb-2")], [text(copy.title)]),
            p([class("text-ctp-subtext0")], [text(copy.hint)]),
        ])
    }

    fn view_notices(&self) -> Node<Msg> {
        div(
            [class("fixed top-4 right-4 z-50 space-y-2 w-80")],
            self.store
                .notices()
                .iter()
                .map(view_notice)
                .collect::<Vec<_>>(),
        )
    }
}

fn view_notice(notice: &Notice) -> Node<Msg> {
    let id = notice.id;
    div([
        key(format!("notice-{}", id)),
        class("flex items-start gap-3 p-4 rounded-lg shadow-lg border border-ctp-red bg-ctp-surface0"),
    ], [
        div([class("flex-1")], [
            p([class("font-medium text-ctp-red")], [text(&notice.message)]),
            p([class("text-xs text-ctp-subtext0 mt-1")], [text(&notice.detail)]),
        ]),
        button([
            on_click(move |_| Msg::DismissNotice(id)),
            r#type("button"),
            class("text-ctp-subtext0 hover:text-ctp-text"),
        ], [text("✕")]),
    ])
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init();
    Program::mount_to_body(Model::new(TaskStore::new(config::backend())));
}
