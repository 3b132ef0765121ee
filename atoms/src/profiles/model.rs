use serde::{Deserialize, Serialize};

use crate::employees::domicile;
use crate::users::AuthUser;
use crate::validation::{filter_name_input, initials};

/// Profile document in the `users` collection, keyed by auth uid.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "apellido", default)]
    pub surname: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    #[serde(rename = "fechaNacimiento", default)]
    pub birth_date: String,
    #[serde(rename = "ciudad", default)]
    pub city: String,
    #[serde(rename = "barrio", default)]
    pub neighborhood: String,
    #[serde(rename = "calle", default)]
    pub street: String,
    #[serde(rename = "numeroDomicilio", default)]
    pub street_number: String,
    /// Copy of the auth email; never edited through the profile.
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Edit-information form. There is deliberately no email field.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ProfileForm {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellido")]
    pub surname: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "fechaNacimiento")]
    pub birth_date: String,
    #[serde(rename = "ciudad")]
    pub city: String,
    #[serde(rename = "barrio")]
    pub neighborhood: String,
    #[serde(rename = "calle")]
    pub street: String,
    #[serde(rename = "numeroDomicilio")]
    pub street_number: String,
}

impl ProfileForm {
    pub fn sanitized(self) -> Self {
        Self {
            name: filter_name_input(&self.name).trim().to_string(),
            surname: filter_name_input(&self.surname).trim().to_string(),
            phone: self.phone.trim().to_string(),
            birth_date: self.birth_date.trim().to_string(),
            city: self.city.trim().to_string(),
            neighborhood: self.neighborhood.trim().to_string(),
            street: self.street.trim().to_string(),
            street_number: self.street_number.trim().to_string(),
        }
    }
}

/// Read-only profile screen.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ProfileView {
    pub full_name: String,
    pub initials: String,
    pub email: String,
    pub phone: String,
    pub birth_date: String,
    pub city: String,
    pub domicile: String,
    pub photo: Option<String>,
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

impl ProfileView {
    /// Stored names win when both are present; otherwise the auth display
    /// name is used.
    pub fn build(user: &AuthUser, stored: Option<&UserProfile>) -> Self {
        let stored_names = stored
            .filter(|p| !p.name.trim().is_empty() && !p.surname.trim().is_empty())
            .map(|p| (p.name.clone(), p.surname.clone()));

        let full_name = match &stored_names {
            Some((name, surname)) => format!("{} {}", name, surname),
            None => user
                .display_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Usuario no registrado".to_string()),
        };
        let (name, surname) = stored_names.unwrap_or_else(|| user.names());

        let empty = UserProfile::default();
        let profile = stored.unwrap_or(&empty);

        Self {
            full_name,
            initials: initials(&name, &surname, "US"),
            email: user
                .email
                .clone()
                .unwrap_or_else(|| "email@desconocido.com".to_string()),
            phone: or_placeholder(&profile.phone, "No especificado"),
            birth_date: or_placeholder(&profile.birth_date, "No especificada"),
            city: or_placeholder(&profile.city, "No especificada"),
            domicile: domicile(&profile.street, &profile.street_number, &profile.neighborhood),
            photo: profile.profile_image.clone().filter(|p| !p.is_empty()),
        }
    }
}
