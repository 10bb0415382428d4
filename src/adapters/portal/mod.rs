pub mod http_portal;
pub mod snapshot_source;
