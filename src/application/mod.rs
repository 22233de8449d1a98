//! Application layer containing the HR and payroll use cases.
//!
//! Every use case is a method of [`engine::HrEngine`]; the submodules group
//! them by concern and share the engine's stores.

pub mod attendance;
pub mod employees;
pub mod engine;
pub mod leave;
pub mod payroll;
pub mod reports;
pub mod salary;
