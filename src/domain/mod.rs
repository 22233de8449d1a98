//! Domain layer: HR entities, payroll rules and the storage ports.

pub mod access;
pub mod attendance;
pub mod calculator;
pub mod employee;
pub mod leave;
pub mod money;
pub mod payrun;
pub mod ports;
pub mod salary;
pub mod settings;
