//! Domain layer: employees, user profiles and tasks over a document store.

pub mod alert;
pub mod dates;
pub mod employees;
pub mod profiles;
pub mod store;
pub mod tasks;
pub mod users;
pub mod validation;

pub use alert::{Alert, AlertKind, UserFacing};
pub use store::{DocumentStore, StoreError};
pub use users::AuthUser;
