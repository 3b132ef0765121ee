use serde::{Deserialize, Serialize};

use crate::validation::{filter_dni_input, filter_name_input, initials};

pub const NOT_REGISTERED: &str = "No registrado";

fn default_active() -> bool {
    true
}

/// Employee document as stored in the `empleados` collection.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "apellido", default)]
    pub surname: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    #[serde(rename = "puesto", default)]
    pub position: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dni: String,

    /// Set once on creation and never rewritten.
    #[serde(rename = "fechaIngreso", default)]
    pub hire_date: String,
    #[serde(rename = "fechaNacimiento", default)]
    pub birth_date: String,

    #[serde(rename = "barrio", default)]
    pub neighborhood: String,
    #[serde(rename = "calle", default)]
    pub street: String,
    #[serde(rename = "numeroDomicilio", default)]
    pub street_number: String,
    /// Derived display string, see [`domicile`].
    #[serde(rename = "domicilio", default)]
    pub domicile: String,

    #[serde(rename = "notas", default)]
    pub notes: String,
    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
    /// Photo reference (URI), empty when none.
    #[serde(rename = "imagen", default)]
    pub photo: String,

    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    // Written only for employees created by sign-up.
    #[serde(rename = "ubicacion", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "tareasCompletadas", default, skip_serializing_if = "Option::is_none")]
    pub completed_tasks: Option<u32>,
    #[serde(rename = "tareasAsignadas", default, skip_serializing_if = "Option::is_none")]
    pub assigned_tasks: Option<u32>,
}

/// Employee with its document id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Employee {
    pub id: String,
    #[serde(flatten)]
    pub record: EmployeeRecord,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.record.name, self.record.surname)
            .trim()
            .to_string()
    }
}

/// Add/edit form input. Keys match the stored document.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EmployeeForm {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellido")]
    pub surname: String,
    pub email: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "puesto")]
    pub position: String,
    pub dni: String,
    #[serde(rename = "fechaNacimiento")]
    pub birth_date: String,
    #[serde(rename = "barrio")]
    pub neighborhood: String,
    #[serde(rename = "calle")]
    pub street: String,
    #[serde(rename = "numeroDomicilio")]
    pub street_number: String,
    #[serde(rename = "notas")]
    pub notes: String,
    #[serde(rename = "imagen")]
    pub photo: Option<String>,
    /// Ignored on create; new employees are always active.
    #[serde(rename = "activo")]
    pub active: Option<bool>,
}

impl EmployeeForm {
    /// Apply the input filters and trim every field.
    pub fn sanitized(self) -> Self {
        Self {
            name: filter_name_input(&self.name).trim().to_string(),
            surname: filter_name_input(&self.surname).trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            position: self.position.trim().to_string(),
            dni: filter_dni_input(&self.dni),
            birth_date: self.birth_date.trim().to_string(),
            neighborhood: self.neighborhood.trim().to_string(),
            street: self.street.trim().to_string(),
            street_number: self.street_number.trim().to_string(),
            notes: self.notes.trim().to_string(),
            photo: self
                .photo
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            active: self.active,
        }
    }

    pub fn has_required_fields(&self) -> bool {
        !self.name.trim().is_empty() && !self.surname.trim().is_empty()
    }

    pub fn domicile(&self) -> String {
        domicile(&self.street, &self.street_number, &self.neighborhood)
    }
}

/// Edit input. Fields left out of the body keep their stored value.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EmployeeEdit {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "apellido")]
    pub surname: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    #[serde(rename = "puesto")]
    pub position: Option<String>,
    pub dni: Option<String>,
    #[serde(rename = "fechaNacimiento")]
    pub birth_date: Option<String>,
    #[serde(rename = "barrio")]
    pub neighborhood: Option<String>,
    #[serde(rename = "calle")]
    pub street: Option<String>,
    #[serde(rename = "numeroDomicilio")]
    pub street_number: Option<String>,
    #[serde(rename = "notas")]
    pub notes: Option<String>,
    /// An empty string removes the photo.
    #[serde(rename = "imagen")]
    pub photo: Option<String>,
    #[serde(rename = "activo")]
    pub active: Option<bool>,
}

impl EmployeeEdit {
    /// The full form this edit produces over the stored record.
    pub fn over(self, current: &EmployeeRecord) -> EmployeeForm {
        let keep = |value: Option<String>, stored: &str| value.unwrap_or_else(|| stored.to_string());
        EmployeeForm {
            name: keep(self.name, &current.name),
            surname: keep(self.surname, &current.surname),
            email: keep(self.email, &current.email),
            phone: keep(self.phone, &current.phone),
            position: keep(self.position, &current.position),
            dni: keep(self.dni, &current.dni),
            birth_date: keep(self.birth_date, &current.birth_date),
            neighborhood: keep(self.neighborhood, &current.neighborhood),
            street: keep(self.street, &current.street),
            street_number: keep(self.street_number, &current.street_number),
            notes: keep(self.notes, &current.notes),
            photo: Some(keep(self.photo, &current.photo)),
            active: Some(self.active.unwrap_or(current.active)),
        }
    }
}

/// Street, number and `Barrio <neighborhood>` joined with commas.
pub fn domicile(street: &str, number: &str, neighborhood: &str) -> String {
    let mut parts = Vec::new();
    if !street.trim().is_empty() {
        parts.push(street.trim().to_string());
    }
    if !number.trim().is_empty() {
        parts.push(number.trim().to_string());
    }
    if !neighborhood.trim().is_empty() {
        parts.push(format!("Barrio {}", neighborhood.trim()));
    }

    if parts.is_empty() {
        NOT_REGISTERED.to_string()
    } else {
        parts.join(", ")
    }
}

/// List filters: free-text search and active flag.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EmployeeFilter {
    pub q: Option<String>,
    pub active: Option<bool>,
}

impl EmployeeFilter {
    pub fn matches(&self, employee: &Employee) -> bool {
        if let Some(active) = self.active {
            if employee.record.active != active {
                return false;
            }
        }

        match self.q.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => {
                let needle = q.to_lowercase();
                employee.full_name().to_lowercase().contains(&needle)
                    || employee.record.position.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

/// Read-only detail view of one employee.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EmployeeProfileView {
    pub id: String,
    pub full_name: String,
    pub initials: String,
    pub photo: Option<String>,
    pub active: bool,
    pub status_label: String,
    pub dni: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub hire_date: String,
    pub neighborhood: String,
    pub street: String,
    pub street_number: String,
    pub domicile: String,
    pub notes: Option<String>,
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

impl From<&Employee> for EmployeeProfileView {
    fn from(employee: &Employee) -> Self {
        let r = &employee.record;
        Self {
            id: employee.id.clone(),
            full_name: employee.full_name(),
            initials: initials(&r.name, &r.surname, "EM"),
            photo: Some(r.photo.clone()).filter(|p| !p.is_empty()),
            active: r.active,
            status_label: if r.active { "Activo" } else { "Inactivo" }.to_string(),
            dni: or_placeholder(&r.dni, NOT_REGISTERED),
            email: or_placeholder(&r.email, NOT_REGISTERED),
            phone: or_placeholder(&r.phone, NOT_REGISTERED),
            position: or_placeholder(&r.position, "No asignado"),
            hire_date: or_placeholder(&r.hire_date, "No registrada"),
            neighborhood: or_placeholder(&r.neighborhood, NOT_REGISTERED),
            street: or_placeholder(&r.street, "No registrada"),
            street_number: or_placeholder(&r.street_number, NOT_REGISTERED),
            domicile: domicile(&r.street, &r.street_number, &r.neighborhood),
            notes: Some(r.notes.clone()).filter(|n| !n.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Belgrano", "123", "Centro", "Belgrano, 123, Barrio Centro")]
    #[case("Belgrano", "", "", "Belgrano")]
    #[case("", "", "Centro", "Barrio Centro")]
    #[case("", "  ", "", "No registrado")]
    fn domicile_string(
        #[case] street: &str,
        #[case] number: &str,
        #[case] neighborhood: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(domicile(street, number, neighborhood), expected);
    }

    #[test]
    fn sanitized_form_filters_names_and_dni() {
        let form = EmployeeForm {
            name: " Ana3 ".into(),
            surname: "Pérez!".into(),
            dni: "30.123.456".into(),
            photo: Some("  ".into()),
            ..Default::default()
        }
        .sanitized();

        assert_eq!(form.name, "Ana");
        assert_eq!(form.surname, "Pérez");
        assert_eq!(form.dni, "30123456");
        assert_eq!(form.photo, None);
    }

    #[test]
    fn stored_documents_use_spanish_keys() {
        let employee = Employee {
            id: "e1".into(),
            record: EmployeeRecord {
                name: "Ana".into(),
                surname: "Pérez".into(),
                hire_date: "01/02/2024".into(),
                active: true,
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&employee).unwrap();
        assert_eq!(value["id"], "e1");
        assert_eq!(value["nombre"], "Ana");
        assert_eq!(value["fechaIngreso"], "01/02/2024");
        assert_eq!(value["activo"], true);
        assert!(value.get("updatedAt").is_none());
    }

    #[test]
    fn edit_keeps_what_it_leaves_out() {
        let stored = EmployeeRecord {
            name: "Ana".into(),
            surname: "Pérez".into(),
            phone: "341555".into(),
            active: false,
            photo: "file:///ana.jpg".into(),
            ..Default::default()
        };
        let edit: EmployeeEdit = serde_json::from_str(r#"{"puesto":"Tasadora"}"#).unwrap();

        let form = edit.over(&stored);

        assert_eq!(form.position, "Tasadora");
        assert_eq!(form.phone, "341555");
        assert_eq!(form.active, Some(false));
        assert_eq!(form.photo.as_deref(), Some("file:///ana.jpg"));
    }

    #[test]
    fn missing_active_flag_reads_as_active() {
        let record: EmployeeRecord = serde_json::from_str(r#"{"nombre":"Ana"}"#).unwrap();
        assert!(record.active);
    }

    fn employee(name: &str, surname: &str, position: &str, active: bool) -> Employee {
        Employee {
            id: name.to_lowercase(),
            record: EmployeeRecord {
                name: name.into(),
                surname: surname.into(),
                position: position.into(),
                active,
                ..Default::default()
            },
        }
    }

    #[test]
    fn filter_searches_name_and_position() {
        let ana = employee("Ana", "Pérez", "Tasadora", true);
        let by_surname = EmployeeFilter {
            q: Some("pérez".into()),
            active: None,
        };
        let by_position = EmployeeFilter {
            q: Some("TASA".into()),
            active: None,
        };
        let inactive_only = EmployeeFilter {
            q: None,
            active: Some(false),
        };

        assert!(by_surname.matches(&ana));
        assert!(by_position.matches(&ana));
        assert!(!inactive_only.matches(&ana));
    }

    #[test]
    fn profile_view_fills_placeholders() {
        let view = EmployeeProfileView::from(&employee("Luis", "", "", false));
        assert_eq!(view.initials, "L");
        assert_eq!(view.status_label, "Inactivo");
        assert_eq!(view.position, "No asignado");
        assert_eq!(view.hire_date, "No registrada");
        assert_eq!(view.domicile, "No registrado");
        assert_eq!(view.notes, None);
    }
}
