use shared::{KeyValueStorage, Result, TaskError};
use web_sys::{window, Storage};

/// `window.localStorage`, if the browser exposes it.
#[derive(Debug, Clone)]
pub struct BrowserStorage {
    inner: Option<Storage>,
}

impl BrowserStorage {
    pub fn local() -> Self {
        let inner = window().and_then(|w| w.local_storage().ok().flatten());
        if inner.is_none() {
            tracing::warn!("localStorage is not available, tasks will not be saved");
        }
        Self { inner }
    }

    fn storage(&self) -> Result<&Storage> {
        self.inner
            .as_ref()
            .ok_or_else(|| TaskError::Storage("localStorage is not available".to_string()))
    }
}

impl KeyValueStorage for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage()?
            .get_item(key)
            .map_err(|e| TaskError::Storage(format!("{:?}", e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| TaskError::Storage(format!("{:?}", e)))
    }
}
