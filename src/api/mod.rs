pub mod approvals;
pub mod attendance;
pub mod employees;
pub mod queue;
pub mod reports;
pub mod services;
pub mod stores;
pub mod tickets;
