pub mod model;
pub mod service;

pub use model::{CreateTaskPayload, Priority, Task, TaskRecord, TaskStatus, UpdateTaskPayload};
pub use service::*;
