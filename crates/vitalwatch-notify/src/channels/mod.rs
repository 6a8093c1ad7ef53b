pub mod file;
pub mod log;
pub mod memory;
