//! Concrete adapter implementations of the port traits.

pub mod file_config_adapter;
pub mod sqlite_adapter;
