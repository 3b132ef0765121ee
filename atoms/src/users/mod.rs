pub mod model;

pub use model::{split_display_name, AuthUser};
