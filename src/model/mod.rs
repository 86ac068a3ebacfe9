pub mod company;
pub mod employee;
pub mod payroll;
pub mod report;
pub mod user;
