//! Build-time deployment settings.
//!
//! The persistence backend is fixed per build: browser local storage by
//! default, the hosted table with `--features remote`.

#[cfg(not(feature = "remote"))]
use shared::LocalPersistence;

#[cfg(not(feature = "remote"))]
use crate::browser::BrowserStorage;
#[cfg(feature = "remote")]
use crate::remote::HttpPersistence;

pub use shared::STORAGE_KEY;

pub const DEFAULT_API_BASE: &str = "/api/tasks";

/// How long a failure notice stays up before it dismisses itself.
pub const NOTICE_TIMEOUT_MS: u32 = 5_000;

/// Base URL of the tasks API; `TASKS_API_BASE` at compile time overrides it.
pub fn api_base() -> &'static str {
    option_env!("TASKS_API_BASE").unwrap_or(DEFAULT_API_BASE)
}

#[cfg(not(feature = "remote"))]
pub type Backend = LocalPersistence<BrowserStorage>;
#[cfg(feature = "remote")]
pub type Backend = HttpPersistence;

#[cfg(not(feature = "remote"))]
pub fn backend() -> Backend {
    LocalPersistence::with_key(BrowserStorage::local(), STORAGE_KEY)
}

#[cfg(feature = "remote")]
pub fn backend() -> Backend {
    HttpPersistence::new(api_base())
}

pub fn backend_name() -> &'static str {
    if cfg!(feature = "remote") {
        "hosted table"
    } else {
        "local storage"
    }
}
