pub mod actor;
pub mod log;
