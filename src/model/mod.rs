pub mod attendance;
pub mod employee;
pub mod location;
pub mod payroll;
pub mod penalty;
pub mod schedule;
