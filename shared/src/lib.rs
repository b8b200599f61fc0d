//! Types, store and persistence port shared by the task manager frontend and
//! the hosted table backend.

pub mod error;
pub mod persistence;
pub mod store;
pub mod task;
pub mod view;

pub use error::{Result, TaskError};
pub use persistence::{
    KeyValueStorage, LocalPersistence, MemoryPersistence, MemoryStorage, TaskPersistence,
    STORAGE_KEY,
};
pub use store::{Notice, Operation, PendingUpdate, TaskStore};
pub use task::{
    CreateTaskRequest, Task, TaskFilter, TaskFormData, TaskPatch, TaskRow, TaskStats,
    UpdateTaskRequest,
};
