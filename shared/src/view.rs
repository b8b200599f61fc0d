//! Render-independent state for the form, item and filter components.
//!
//! Kept out of the frontend crate so it can be tested natively; the sauron
//! views only read these values and route events into them.

use chrono::{DateTime, Local, Utc};

use crate::task::{Task, TaskFilter, TaskFormData, TaskPatch, TaskStats};

/// Input state of the "new task" form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
}

impl TaskForm {
    pub fn can_submit(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Takes the input for a creation request and clears the form.
    /// A blank title leaves everything as typed.
    pub fn submit(&mut self) -> Option<TaskFormData> {
        if !self.can_submit() {
            return None;
        }
        let data = TaskFormData {
            title: std::mem::take(&mut self.title),
            description: std::mem::take(&mut self.description),
        };
        Some(data)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
}

impl TaskDraft {
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ItemMode {
    #[default]
    View,
    Edit(TaskDraft),
}

/// Per-item view/edit toggle. Nothing here is persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskItemState {
    mode: ItemMode,
}

impl TaskItemState {
    pub fn editing(task: &Task) -> Self {
        Self {
            mode: ItemMode::Edit(TaskDraft::from_task(task)),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, ItemMode::Edit(_))
    }

    pub fn draft(&self) -> Option<&TaskDraft> {
        match &self.mode {
            ItemMode::Edit(draft) => Some(draft),
            ItemMode::View => None,
        }
    }

    pub fn set_title(&mut self, title: String) {
        if let ItemMode::Edit(draft) = &mut self.mode {
            draft.title = title;
        }
    }

    pub fn set_description(&mut self, description: String) {
        if let ItemMode::Edit(draft) = &mut self.mode {
            draft.description = description;
        }
    }

    pub fn can_save(&self) -> bool {
        self.draft().is_some_and(|d| !d.title.trim().is_empty())
    }

    /// Ends editing and yields the patch to send, unless the draft title is
    /// blank, in which case the item stays in edit mode.
    pub fn save(&mut self) -> Option<TaskPatch> {
        if !self.can_save() {
            return None;
        }
        match std::mem::take(&mut self.mode) {
            ItemMode::Edit(draft) => Some(TaskPatch::edit(draft.title, draft.description)),
            ItemMode::View => None,
        }
    }

    pub fn cancel(&mut self) {
        self.mode = ItemMode::View;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOption {
    pub filter: TaskFilter,
    pub label: &'static str,
    pub icon: &'static str,
    pub count: usize,
    pub active: bool,
}

pub fn filter_options(current: TaskFilter, stats: &TaskStats) -> Vec<FilterOption> {
    TaskFilter::ALL
        .iter()
        .map(|&filter| FilterOption {
            filter,
            label: filter_label(filter),
            icon: filter_icon(filter),
            count: stats.count(filter),
            active: filter == current,
        })
        .collect()
}

pub fn filter_label(filter: TaskFilter) -> &'static str {
    match filter {
        TaskFilter::All => "All",
        TaskFilter::Pending => "Pending",
        TaskFilter::Completed => "Completed",
    }
}

fn filter_icon(filter: TaskFilter) -> &'static str {
    match filter {
        TaskFilter::All => "☰",
        TaskFilter::Pending => "○",
        TaskFilter::Completed => "✓",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyState {
    pub icon: &'static str,
    pub title: &'static str,
    pub hint: &'static str,
}

pub fn empty_state(filter: TaskFilter) -> EmptyState {
    match filter {
        TaskFilter::All => EmptyState {
            icon: "📝",
            title: "No tasks found",
            hint: "Start by adding your first task!",
        },
        TaskFilter::Pending => EmptyState {
            icon: "📝",
            title: "No pending tasks",
            hint: "All your tasks are completed.",
        },
        TaskFilter::Completed => EmptyState {
            icon: "✅",
            title: "No completed tasks",
            hint: "All your tasks are pending.",
        },
    }
}

/// Footer line, only shown once there is at least one task.
pub fn stats_summary(stats: &TaskStats) -> Option<String> {
    if stats.total == 0 {
        return None;
    }
    let plural = if stats.total == 1 { "" } else { "s" };
    Some(format!(
        "Total: {} task{} • Completed: {} • Pending: {}",
        stats.total, plural, stats.completed, stats.pending
    ))
}

/// `dd/mm/yyyy hh:mm` in the viewer's local time.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string()
}
