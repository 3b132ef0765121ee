use serde_json::Value;
use thiserror::Error;

use super::model::{Employee, EmployeeEdit, EmployeeFilter, EmployeeForm, EmployeeRecord, NOT_REGISTERED};
use crate::alert::{Alert, AlertKind, UserFacing};
use crate::dates;
use crate::store::{collections, from_document, to_document, Document, DocumentStore, SetMode, StoreError};

/// Service-level errors for employee operations.
#[derive(Debug, Error)]
pub enum EmployeeError {
    /// Rejected before reaching the store.
    #[error("{0}")]
    Invalid(Alert),

    #[error("employee {0} not found")]
    NotFound(String),

    #[error("{alert}")]
    Store {
        alert: Alert,
        #[source]
        source: StoreError,
    },
}

impl EmployeeError {
    fn store(message: &str) -> impl FnOnce(StoreError) -> Self + '_ {
        move |source| Self::Store {
            alert: Alert::new("Error", message),
            source,
        }
    }
}

impl UserFacing for EmployeeError {
    fn alert(&self) -> Alert {
        match self {
            Self::Invalid(alert) | Self::Store { alert, .. } => alert.clone(),
            Self::NotFound(_) => Alert::new("Error", "El empleado no existe o fue eliminado."),
        }
    }

    fn kind(&self) -> AlertKind {
        match self {
            Self::Invalid(_) => AlertKind::Warning,
            Self::NotFound(_) => AlertKind::NotFound,
            Self::Store { source, .. } if source.is_unavailable() => AlertKind::Unavailable,
            Self::Store { .. } => AlertKind::Failure,
        }
    }
}

pub fn added_alert() -> Alert {
    Alert::new("Éxito", "Empleado agregado correctamente.")
}

pub fn updated_alert() -> Alert {
    Alert::new("Éxito", "Empleado actualizado correctamente.")
}

pub fn deleted_alert() -> Alert {
    Alert::new("Éxito", "Empleado eliminado correctamente.")
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// Nothing was touched; the caller must confirm first.
    ConfirmationRequired(Alert),
    /// The employee is gone; the list as it stands afterwards.
    Deleted(Vec<Employee>),
}

pub fn delete_confirmation_alert() -> Alert {
    Alert::new(
        "Eliminar empleado",
        "¿Estás seguro de que deseas eliminar este empleado? Esta acción no se puede deshacer.",
    )
}

fn validate(form: EmployeeForm) -> Result<EmployeeForm, EmployeeError> {
    let form = form.sanitized();
    if !form.has_required_fields() {
        tracing::warn!("Employee form rejected: missing name or surname");
        return Err(EmployeeError::Invalid(Alert::new(
            "Campos obligatorios",
            "El nombre y apellido son obligatorios.",
        )));
    }
    if !form.birth_date.is_empty() && dates::parse_birth_date(&form.birth_date).is_err() {
        tracing::warn!("Employee form rejected: bad birth date {}", form.birth_date);
        return Err(EmployeeError::Invalid(Alert::new(
            "Fecha inválida",
            "La fecha de nacimiento debe tener el formato dd/mm/aaaa y no puede ser futura.",
        )));
    }
    Ok(form)
}

fn employee_from(id: String, doc: Document) -> Result<Employee, StoreError> {
    Ok(Employee {
        id,
        record: from_document::<EmployeeRecord>(doc)?,
    })
}

/// Create an employee from the add form.
///
/// Hire date is today; the employee starts active.
pub async fn create_employee(
    store: &dyn DocumentStore,
    form: EmployeeForm,
) -> Result<Employee, EmployeeError> {
    let form = validate(form)?;

    let record = EmployeeRecord {
        domicile: form.domicile(),
        name: form.name,
        surname: form.surname,
        email: form.email,
        phone: form.phone,
        position: form.position,
        dni: form.dni,
        hire_date: dates::display_date(dates::today()),
        birth_date: form.birth_date,
        neighborhood: form.neighborhood,
        street: form.street,
        street_number: form.street_number,
        notes: form.notes,
        active: true,
        photo: form.photo.unwrap_or_default(),
        created_at: dates::now_rfc3339(),
        updated_at: None,
        location: None,
        completed_tasks: None,
        assigned_tasks: None,
    };

    let add_failed = "No se pudo agregar el empleado. Intenta de nuevo.";
    let doc = to_document(&record).map_err(EmployeeError::store(add_failed))?;
    let id = store
        .add(collections::EMPLOYEES, doc)
        .await
        .map_err(EmployeeError::store(add_failed))?;

    tracing::info!("Employee {} created", id);
    Ok(Employee { id, record })
}

/// Apply an edit over the stored employee. Fields the edit leaves out keep
/// their stored value; hire date and creation time are never written.
pub async fn update_employee(
    store: &dyn DocumentStore,
    id: &str,
    edit: EmployeeEdit,
) -> Result<Employee, EmployeeError> {
    let current = get_employee(store, id).await?;
    let form = validate(edit.over(&current.record))?;
    let update_failed = "No se pudo actualizar el empleado. Intenta de nuevo.";

    let mut doc = Document::new();
    doc.insert("domicilio".into(), Value::from(form.domicile()));
    doc.insert("nombre".into(), Value::from(form.name));
    doc.insert("apellido".into(), Value::from(form.surname));
    doc.insert("email".into(), Value::from(form.email));
    doc.insert("telefono".into(), Value::from(form.phone));
    doc.insert("puesto".into(), Value::from(form.position));
    doc.insert("dni".into(), Value::from(form.dni));
    doc.insert("fechaNacimiento".into(), Value::from(form.birth_date));
    doc.insert("barrio".into(), Value::from(form.neighborhood));
    doc.insert("calle".into(), Value::from(form.street));
    doc.insert("numeroDomicilio".into(), Value::from(form.street_number));
    doc.insert("notas".into(), Value::from(form.notes));
    doc.insert("activo".into(), Value::from(form.active.unwrap_or(current.record.active)));
    doc.insert("imagen".into(), Value::from(form.photo.unwrap_or_default()));
    doc.insert("updatedAt".into(), Value::from(dates::now_rfc3339()));

    match store.update(collections::EMPLOYEES, id, doc).await {
        Ok(()) => {}
        Err(StoreError::NotFound { .. }) => return Err(EmployeeError::NotFound(id.to_string())),
        Err(e) => return Err(EmployeeError::store(update_failed)(e)),
    }

    tracing::info!("Employee {} updated", id);
    get_employee(store, id).await
}

pub async fn get_employee(store: &dyn DocumentStore, id: &str) -> Result<Employee, EmployeeError> {
    let load_failed = "No se pudo cargar el empleado.";
    let doc = store
        .get(collections::EMPLOYEES, id)
        .await
        .map_err(EmployeeError::store(load_failed))?
        .ok_or_else(|| EmployeeError::NotFound(id.to_string()))?;

    employee_from(id.to_string(), doc).map_err(EmployeeError::store(load_failed))
}

/// All employees matching the filter, ordered by surname then name.
pub async fn list_employees(
    store: &dyn DocumentStore,
    filter: &EmployeeFilter,
) -> Result<Vec<Employee>, EmployeeError> {
    let list_failed = "No se pudieron cargar los empleados.";
    let rows = store
        .list(collections::EMPLOYEES)
        .await
        .map_err(EmployeeError::store(list_failed))?;

    let mut employees = Vec::with_capacity(rows.len());
    for (id, doc) in rows {
        match employee_from(id.clone(), doc) {
            Ok(employee) if filter.matches(&employee) => employees.push(employee),
            Ok(_) => {}
            Err(e) => tracing::warn!("Skipping unreadable employee {}: {}", id, e),
        }
    }

    employees.sort_by(|a, b| {
        let key = |e: &Employee| (e.record.surname.to_lowercase(), e.record.name.to_lowercase());
        key(a).cmp(&key(b))
    });
    Ok(employees)
}

/// Delete one employee once the user has confirmed.
///
/// Without confirmation the store is not touched and the confirmation
/// prompt is returned instead.
pub async fn delete_employee(
    store: &dyn DocumentStore,
    id: &str,
    confirmed: bool,
) -> Result<DeleteOutcome, EmployeeError> {
    if !confirmed {
        return Ok(DeleteOutcome::ConfirmationRequired(delete_confirmation_alert()));
    }

    let delete_failed = "No se pudo eliminar el empleado. Intenta de nuevo.";
    let exists = store
        .get(collections::EMPLOYEES, id)
        .await
        .map_err(EmployeeError::store(delete_failed))?
        .is_some();
    if !exists {
        return Err(EmployeeError::NotFound(id.to_string()));
    }

    store
        .delete(collections::EMPLOYEES, id)
        .await
        .map_err(EmployeeError::store(delete_failed))?;
    tracing::info!("Employee {} deleted", id);

    let remaining = list_employees(store, &EmployeeFilter::default()).await?;
    Ok(DeleteOutcome::Deleted(remaining))
}

/// Employee record written for a freshly signed-up account, keyed by its uid.
pub async fn register_account_employee(
    store: &dyn DocumentStore,
    uid: &str,
    name: &str,
    surname: &str,
    email: &str,
) -> Result<Employee, EmployeeError> {
    let record = EmployeeRecord {
        name: name.trim().to_string(),
        surname: surname.trim().to_string(),
        email: email.trim().to_string(),
        hire_date: dates::iso_date(dates::today()),
        domicile: NOT_REGISTERED.to_string(),
        location: Some(String::new()),
        active: true,
        created_at: dates::now_rfc3339(),
        completed_tasks: Some(0),
        assigned_tasks: Some(0),
        ..Default::default()
    };

    let failed = "Hubo un problema al registrar el usuario.";
    let doc = to_document(&record).map_err(EmployeeError::store(failed))?;
    store
        .set(collections::EMPLOYEES, uid, doc, SetMode::Overwrite)
        .await
        .map_err(EmployeeError::store(failed))?;

    Ok(Employee {
        id: uid.to_string(),
        record,
    })
}
