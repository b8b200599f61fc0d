use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A single to-do entry.
///
/// Serializes with the camelCase field names used by the browser storage blob.
/// `created_at`/`updated_at` are accepted as aliases so rows from the hosted
/// table can be read back without a separate mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(
        default,
        deserialize_with = "deserialize_description",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description: normalize_description(description),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// True once the task has been edited or toggled since creation.
    pub fn was_updated(&self) -> bool {
        self.updated_at != self.created_at
    }

    /// Returns a copy with `patch` applied and `updated_at` advanced.
    ///
    /// `id` and `created_at` are carried over untouched.
    pub fn patched(&self, patch: &TaskPatch) -> Task {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next.title = title.clone();
        }
        if let Some(description) = &patch.description {
            next.description = normalize_description(Some(description.clone()));
        }
        if let Some(completed) = patch.completed {
            next.completed = completed;
        }
        next.updated_at = next_timestamp(self.updated_at);
        next
    }

    pub fn matches(&self, filter: TaskFilter) -> bool {
        match filter {
            TaskFilter::All => true,
            TaskFilter::Pending => !self.completed,
            TaskFilter::Completed => self.completed,
        }
    }
}

/// Blank descriptions are stored as absent.
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|d| !d.trim().is_empty())
}

fn deserialize_description<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(normalize_description)
}

/// "Now", but strictly after `previous`.
///
/// Browser clocks only resolve milliseconds, so two mutations in the same tick
/// would otherwise share a timestamp.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl TaskFilter {
    pub const ALL: [TaskFilter; 3] = [TaskFilter::All, TaskFilter::Pending, TaskFilter::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Pending => "pending",
            TaskFilter::Completed => "completed",
        }
    }
}

/// Raw form input carried into a creation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskFormData {
    pub title: String,
    pub description: String,
}

impl TaskFormData {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Partial update. Identity and timestamps are deliberately not representable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn edit(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            completed: None,
        }
    }

    /// A patch that sets a blank title is rejected outright.
    pub fn is_valid(&self) -> bool {
        self.title.as_ref().map_or(true, |t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskStats {
    pub fn count(&self, filter: TaskFilter) -> usize {
        match filter {
            TaskFilter::All => self.total,
            TaskFilter::Pending => self.pending,
            TaskFilter::Completed => self.completed,
        }
    }
}

impl<'a> FromIterator<&'a Task> for TaskStats {
    fn from_iter<I: IntoIterator<Item = &'a Task>>(iter: I) -> Self {
        iter.into_iter().fold(TaskStats::default(), |mut stats, task| {
            stats.total += 1;
            if task.completed {
                stats.completed += 1;
            } else {
                stats.pending += 1;
            }
            stats
        })
    }
}

// Hosted table wire types. The table keeps snake_case column names.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRow {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskRow {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: normalize_description(row.description),
            completed: row.completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<&TaskFormData> for CreateTaskRequest {
    fn from(data: &TaskFormData) -> Self {
        Self {
            title: data.title.trim().to_string(),
            description: normalize_description(Some(data.description.clone())),
        }
    }
}

pub type UpdateTaskRequest = TaskPatch;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patched_keeps_identity_and_creation_time() {
        let task = Task::new("Write report".into(), None);
        let next = task.patched(&TaskPatch::title("Write the report"));
        assert_eq!(next.id, task.id);
        assert_eq!(next.created_at, task.created_at);
        assert_eq!(next.title, "Write the report");
        assert!(next.updated_at > task.updated_at);
        assert!(next.was_updated());
    }

    #[test]
    fn blank_description_becomes_none() {
        let task = Task::new("a".into(), Some("   ".into()));
        assert_eq!(task.description, None);
        let edited = task.patched(&TaskPatch::edit("a", "notes"));
        assert_eq!(edited.description.as_deref(), Some("notes"));
        let cleared = edited.patched(&TaskPatch::edit("a", ""));
        assert_eq!(cleared.description, None);
    }

    #[test]
    fn next_timestamp_is_strictly_later() {
        let future = Utc::now() + Duration::seconds(60);
        assert_eq!(next_timestamp(future), future + Duration::milliseconds(1));
    }

    #[test]
    fn blank_title_patch_is_invalid() {
        assert!(!TaskPatch::title("  ").is_valid());
        assert!(TaskPatch::completed(true).is_valid());
    }

    #[test]
    fn stats_partition_the_collection() {
        let mut done = Task::new("done".into(), None);
        done.completed = true;
        let open = Task::new("open".into(), None);
        let stats: TaskStats = [&done, &open, &open].into_iter().collect();
        assert_eq!(stats, TaskStats { total: 3, completed: 1, pending: 2 });
        assert_eq!(stats.count(TaskFilter::Pending), 2);
    }

    #[test]
    fn storage_record_uses_camel_case() {
        let task = Task::new("Buy milk".into(), None);
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("description").is_none());
    }

    #[test]
    fn snake_case_rows_deserialize_as_tasks() {
        let raw = r#"{
            "id": "6f9619ff-8b86-4d01-b42d-00cf4fc964ff",
            "title": "From the table",
            "description": "",
            "completed": true,
            "created_at": "2024-01-01T10:00:00Z",
            "updated_at": "2024-01-02T10:00:00Z"
        }"#;
        let row: TaskRow = serde_json::from_str(raw).unwrap();
        let task = Task::from(row);
        assert!(task.completed);
        assert_eq!(task.description, None);

        let aliased: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(aliased.created_at, task.created_at);
        assert_eq!(aliased.description, None);
    }
}
