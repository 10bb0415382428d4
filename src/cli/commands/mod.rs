pub mod consumer;
pub mod diff;
pub mod envs;
pub mod namespace;
pub mod server_config;
pub mod snapshot;
pub mod users;
