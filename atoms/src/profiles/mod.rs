pub mod model;
pub mod service;

pub use model::{ProfileForm, ProfileView, UserProfile};
pub use service::*;
