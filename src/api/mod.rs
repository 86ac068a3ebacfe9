pub mod dashboard;
pub mod employee;
pub mod payroll;
pub mod report;
pub mod settings;
pub mod user;
