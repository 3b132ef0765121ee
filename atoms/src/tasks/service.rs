use serde_json::Value;
use thiserror::Error;

use super::model::{split_employee_names, CreateTaskPayload, Task, TaskRecord, TaskStatus, UpdateTaskPayload};
use crate::alert::{Alert, AlertKind, UserFacing};
use crate::dates;
use crate::store::{collections, from_document, to_document, Document, DocumentStore, StoreError};
use crate::validation::is_blank;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{0}")]
    Invalid(Alert),

    #[error("no authenticated user")]
    Unauthenticated,

    #[error("task {0} not found")]
    NotFound(String),

    #[error("{alert}")]
    Store {
        alert: Alert,
        #[source]
        source: StoreError,
    },
}

impl TaskError {
    fn store(message: &str) -> impl FnOnce(StoreError) -> Self + '_ {
        move |source| Self::Store {
            alert: Alert::untitled(message),
            source,
        }
    }
}

impl UserFacing for TaskError {
    fn alert(&self) -> Alert {
        match self {
            Self::Invalid(alert) | Self::Store { alert, .. } => alert.clone(),
            Self::Unauthenticated => Alert::untitled("Error: Usuario no autenticado."),
            Self::NotFound(_) => Alert::untitled("La tarea no existe o fue eliminada."),
        }
    }

    fn kind(&self) -> AlertKind {
        match self {
            Self::Invalid(_) => AlertKind::Warning,
            Self::Unauthenticated => AlertKind::Unauthenticated,
            Self::NotFound(_) => AlertKind::NotFound,
            Self::Store { source, .. } if source.is_unavailable() => AlertKind::Unavailable,
            Self::Store { .. } => AlertKind::Failure,
        }
    }
}

pub fn created_alert() -> Alert {
    Alert::untitled("Tarea creada exitosamente")
}

pub fn updated_alert() -> Alert {
    Alert::untitled("Tarea actualizada exitosamente")
}

pub fn deleted_alert() -> Alert {
    Alert::untitled("Tarea eliminada exitosamente")
}

fn missing_fields() -> TaskError {
    TaskError::Invalid(Alert::untitled(
        "Por favor, complete todos los campos obligatorios.",
    ))
}

fn checked_date(date: &str) -> Result<String, TaskError> {
    dates::parse_iso_date(date)
        .map(dates::iso_date)
        .map_err(|_| TaskError::Invalid(Alert::untitled("La fecha debe tener el formato aaaa-mm-dd.")))
}

fn require_user(uid: &str) -> Result<(), TaskError> {
    if is_blank(uid) {
        return Err(TaskError::Unauthenticated);
    }
    Ok(())
}

/// Create a task in the user's namespace.
///
/// Name, duration, employees and description are required; nothing is
/// written when one is missing.
pub async fn create_task(
    store: &dyn DocumentStore,
    uid: &str,
    payload: CreateTaskPayload,
) -> Result<Task, TaskError> {
    let employees = split_employee_names(&payload.employees);
    if is_blank(&payload.name)
        || is_blank(&payload.duration)
        || employees.is_empty()
        || is_blank(&payload.description)
    {
        tracing::warn!("Task rejected: missing required fields");
        return Err(missing_fields());
    }
    require_user(uid)?;

    let date = match payload.date.as_deref().filter(|d| !is_blank(d)) {
        Some(date) => checked_date(date)?,
        None => dates::iso_date(dates::today()),
    };

    let record = TaskRecord {
        name: payload.name.trim().to_string(),
        duration: payload.duration.trim().to_string(),
        date,
        employees,
        priority: payload.priority.unwrap_or_default(),
        status: payload.status.unwrap_or_default(),
        description: payload.description.trim().to_string(),
        created_at: dates::now_rfc3339(),
        updated_at: None,
    };

    let create_failed = "Hubo un error al crear la tarea. Intente nuevamente.";
    let doc = to_document(&record).map_err(TaskError::store(create_failed))?;
    let id = store
        .add(&collections::user_tasks(uid), doc)
        .await
        .map_err(TaskError::store(create_failed))?;

    tracing::info!("Task {} created for user {}", id, uid);
    Ok(Task { id, record })
}

/// The user's tasks, newest first, optionally narrowed to one status.
pub async fn list_tasks(
    store: &dyn DocumentStore,
    uid: &str,
    status: Option<TaskStatus>,
) -> Result<Vec<Task>, TaskError> {
    require_user(uid)?;
    let rows = store
        .list(&collections::user_tasks(uid))
        .await
        .map_err(TaskError::store("No se pudieron cargar las tareas."))?;

    let mut tasks: Vec<Task> = rows
        .into_iter()
        .filter_map(|(id, doc)| match from_document::<TaskRecord>(doc) {
            Ok(record) => Some(Task { id, record }),
            Err(e) => {
                tracing::warn!("Skipping unreadable task {}: {}", id, e);
                None
            }
        })
        .filter(|task| status.map_or(true, |s| task.record.status == s))
        .collect();

    tasks.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));
    Ok(tasks)
}

pub async fn get_task(store: &dyn DocumentStore, uid: &str, task_id: &str) -> Result<Task, TaskError> {
    require_user(uid)?;
    let load_failed = "No se pudo cargar la tarea.";
    let doc = store
        .get(&collections::user_tasks(uid), task_id)
        .await
        .map_err(TaskError::store(load_failed))?
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;

    let record = from_document(doc).map_err(TaskError::store(load_failed))?;
    Ok(Task {
        id: task_id.to_string(),
        record,
    })
}

/// Partial update. Provided required fields may not be blanked.
pub async fn update_task(
    store: &dyn DocumentStore,
    uid: &str,
    task_id: &str,
    payload: UpdateTaskPayload,
) -> Result<Task, TaskError> {
    require_user(uid)?;
    let mut doc = Document::new();

    for (field, value) in [
        ("name", &payload.name),
        ("duration", &payload.duration),
        ("description", &payload.description),
    ] {
        if let Some(value) = value {
            if is_blank(value) {
                return Err(missing_fields());
            }
            doc.insert(field.to_string(), Value::from(value.trim()));
        }
    }

    if let Some(employees) = &payload.employees {
        let names = split_employee_names(employees);
        if names.is_empty() {
            return Err(missing_fields());
        }
        doc.insert("employees".into(), Value::from(names));
    }
    if let Some(date) = &payload.date {
        doc.insert("date".into(), Value::from(checked_date(date)?));
    }
    if let Some(priority) = payload.priority {
        doc.insert("priority".into(), Value::from(priority.as_str()));
    }
    if let Some(status) = payload.status {
        doc.insert("status".into(), Value::from(status.as_str()));
    }
    if doc.is_empty() {
        return get_task(store, uid, task_id).await;
    }
    doc.insert("updatedAt".into(), Value::from(dates::now_rfc3339()));

    match store.update(&collections::user_tasks(uid), task_id, doc).await {
        Ok(()) => {}
        Err(StoreError::NotFound { .. }) => return Err(TaskError::NotFound(task_id.to_string())),
        Err(e) => return Err(TaskError::store("No se pudo actualizar la tarea.")(e)),
    }

    tracing::info!("Task {} updated for user {}", task_id, uid);
    get_task(store, uid, task_id).await
}

pub async fn delete_task(store: &dyn DocumentStore, uid: &str, task_id: &str) -> Result<(), TaskError> {
    require_user(uid)?;
    let collection = collections::user_tasks(uid);
    let delete_failed = "No se pudo eliminar la tarea.";

    if store
        .get(&collection, task_id)
        .await
        .map_err(TaskError::store(delete_failed))?
        .is_none()
    {
        return Err(TaskError::NotFound(task_id.to_string()));
    }

    store
        .delete(&collection, task_id)
        .await
        .map_err(TaskError::store(delete_failed))?;
    tracing::info!("Task {} deleted for user {}", task_id, uid);
    Ok(())
}
