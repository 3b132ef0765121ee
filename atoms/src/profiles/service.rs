use serde_json::Value;
use thiserror::Error;

use super::model::{ProfileForm, ProfileView, UserProfile};
use crate::alert::{Alert, AlertKind, UserFacing};
use crate::dates;
use crate::store::{collections, from_document, Document, DocumentStore, SetMode, StoreError};
use crate::users::AuthUser;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{0}")]
    Invalid(Alert),

    #[error("{alert}")]
    Store {
        alert: Alert,
        #[source]
        source: StoreError,
    },
}

impl UserFacing for ProfileError {
    fn alert(&self) -> Alert {
        match self {
            Self::Invalid(alert) | Self::Store { alert, .. } => alert.clone(),
        }
    }

    fn kind(&self) -> AlertKind {
        match self {
            Self::Invalid(_) => AlertKind::Warning,
            Self::Store { source, .. } if source.is_unavailable() => AlertKind::Unavailable,
            Self::Store { .. } => AlertKind::Failure,
        }
    }
}

pub fn saved_alert() -> Alert {
    Alert::new("Éxito", "Datos guardados correctamente")
}

pub fn photo_updated_alert() -> Alert {
    Alert::new("Éxito", "Foto de perfil actualizada correctamente")
}

/// The stored profile document, if any.
pub async fn fetch_profile(
    store: &dyn DocumentStore,
    uid: &str,
) -> Result<Option<UserProfile>, StoreError> {
    match store.get(collections::USERS, uid).await? {
        Some(doc) => Ok(Some(from_document(doc)?)),
        None => Ok(None),
    }
}

/// Values to prefill the edit form: stored fields first, auth data as
/// fallback. A failed read degrades to the auth data alone.
pub async fn load_profile(store: &dyn DocumentStore, user: &AuthUser) -> UserProfile {
    let stored = match fetch_profile(store, &user.uid).await {
        Ok(stored) => stored.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Could not load profile {}: {}", user.uid, e);
            UserProfile::default()
        }
    };

    let (auth_name, auth_surname) = user.names();
    UserProfile {
        name: if stored.name.is_empty() { auth_name } else { stored.name },
        surname: if stored.surname.is_empty() { auth_surname } else { stored.surname },
        email: user.email.clone().unwrap_or_default(),
        ..stored
    }
}

pub async fn view_profile(store: &dyn DocumentStore, user: &AuthUser) -> ProfileView {
    let stored = fetch_profile(store, &user.uid).await.unwrap_or_else(|e| {
        tracing::warn!("Could not load profile {}: {}", user.uid, e);
        None
    });
    ProfileView::build(user, stored.as_ref())
}

/// Upsert the profile. Email always comes from the auth record.
pub async fn save_profile(
    store: &dyn DocumentStore,
    user: &AuthUser,
    form: ProfileForm,
) -> Result<UserProfile, ProfileError> {
    let form = form.sanitized();
    if form.name.is_empty() || form.surname.is_empty() {
        return Err(ProfileError::Invalid(Alert::new(
            "Error",
            "Nombre y apellido son obligatorios",
        )));
    }
    if !form.birth_date.is_empty() && dates::parse_birth_date(&form.birth_date).is_err() {
        return Err(ProfileError::Invalid(Alert::new(
            "Error",
            "La fecha de nacimiento debe tener el formato dd/mm/aaaa y no puede ser futura.",
        )));
    }

    let mut doc = Document::new();
    doc.insert("nombre".into(), Value::from(form.name));
    doc.insert("apellido".into(), Value::from(form.surname));
    doc.insert("telefono".into(), Value::from(form.phone));
    doc.insert("fechaNacimiento".into(), Value::from(form.birth_date));
    doc.insert("ciudad".into(), Value::from(form.city));
    doc.insert("barrio".into(), Value::from(form.neighborhood));
    doc.insert("calle".into(), Value::from(form.street));
    doc.insert("numeroDomicilio".into(), Value::from(form.street_number));
    doc.insert("email".into(), Value::from(user.email.clone().unwrap_or_default()));
    doc.insert("updatedAt".into(), Value::from(dates::now_rfc3339()));

    let save_failed = |source: StoreError| ProfileError::Store {
        alert: Alert::new("Error", format!("No se pudieron guardar los datos: {}", source)),
        source,
    };

    store
        .set(collections::USERS, &user.uid, doc, SetMode::Merge)
        .await
        .map_err(save_failed)?;
    tracing::info!("Profile {} saved", user.uid);

    fetch_profile(store, &user.uid)
        .await
        .map_err(save_failed)
        .map(Option::unwrap_or_default)
}

/// Store the chosen photo reference on the profile.
pub async fn set_profile_photo(
    store: &dyn DocumentStore,
    user: &AuthUser,
    uri: &str,
) -> Result<(), ProfileError> {
    let uri = uri.trim();
    if uri.is_empty() {
        return Err(ProfileError::Invalid(Alert::untitled("No se pudo seleccionar la imagen")));
    }

    let mut doc = Document::new();
    doc.insert("profileImage".into(), Value::from(uri));
    doc.insert("updatedAt".into(), Value::from(dates::now_rfc3339()));

    store
        .set(collections::USERS, &user.uid, doc, SetMode::Merge)
        .await
        .map_err(|source| ProfileError::Store {
            alert: Alert::untitled("No se pudo actualizar la foto de perfil."),
            source,
        })?;
    tracing::info!("Profile {} photo updated", user.uid);
    Ok(())
}
