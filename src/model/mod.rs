pub mod attendance;
pub mod employee;
pub mod queue;
pub mod role;
pub mod service;
pub mod store;
pub mod ticket;
