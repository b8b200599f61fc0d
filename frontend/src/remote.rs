//! Persistence against the hosted `tasks` table over `fetch`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use shared::{
    CreateTaskRequest, Result, Task, TaskError, TaskPersistence, TaskRow, UpdateTaskRequest,
};
use uuid::Uuid;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

#[derive(Debug, Clone)]
pub struct HttpPersistence {
    base: String,
}

fn network(context: &str, err: JsValue) -> TaskError {
    TaskError::Network(format!("{}: {:?}", context, err))
}

impl HttpPersistence {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    fn task_url(&self, id: Uuid) -> String {
        format!("{}/{}", self.base, id)
    }

    async fn send(&self, method: &str, url: &str, body: Option<String>) -> Result<String> {
        let opts = RequestInit::new();
        opts.set_method(method);
        if let Some(body) = &body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(url, &opts)
            .map_err(|e| network("failed to create request", e))?;
        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(|e| network("failed to set header", e))?;
        }

        let window = web_sys::window()
            .ok_or_else(|| TaskError::Network("no window available".to_string()))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| network("failed to send request", e))?
            .dyn_into()
            .map_err(|e| network("unexpected fetch result", e))?;

        let text_promise = response
            .text()
            .map_err(|e| network("failed to read response", e))?;
        let text = JsFuture::from(text_promise)
            .await
            .map_err(|e| network("failed to get text", e))?
            .as_string()
            .unwrap_or_default();

        if !response.ok() {
            return Err(TaskError::Backend {
                status: response.status(),
                message: text,
            });
        }
        tracing::debug!(%method, %url, status = response.status(), "request finished");
        Ok(text)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: &str,
        url: &str,
        body: Option<String>,
    ) -> Result<T> {
        let text = self.send(method, url, body).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait(?Send)]
impl TaskPersistence for HttpPersistence {
    async fn load_all(&self) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = self.send_json("GET", &self.base, None).await?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn insert(&self, task: Task) -> Result<Task> {
        let request = CreateTaskRequest {
            title: task.title,
            description: task.description,
        };
        let body = serde_json::to_string(&request)?;
        let row: TaskRow = self.send_json("POST", &self.base, Some(body)).await?;
        Ok(row.into())
    }

    async fn update(&self, current: &Task, patch: &UpdateTaskRequest) -> Result<Task> {
        // Unset fields are skipped so concurrent edits to other fields survive.
        let body = serde_json::to_string(patch)?;
        let row: TaskRow = self
            .send_json("PUT", &self.task_url(current.id), Some(body))
            .await?;
        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.send("DELETE", &self.task_url(id), None).await?;
        Ok(())
    }
}
