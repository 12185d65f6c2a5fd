pub mod billing;
pub mod db_utils;
pub mod payroll;
pub mod queue_cache;
