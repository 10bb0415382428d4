pub mod config_item;
pub mod consumer;
pub mod diff_result;
pub mod document;
pub mod loaded_namespace;
pub mod namespace_ref;
pub mod namespace_usage;
pub mod server_config;
pub mod user;
