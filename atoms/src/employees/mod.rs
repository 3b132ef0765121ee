pub mod model;
pub mod service;

pub use model::{domicile, Employee, EmployeeEdit, EmployeeFilter, EmployeeForm, EmployeeProfileView, EmployeeRecord};
pub use service::*;
