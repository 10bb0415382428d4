pub mod consumer_service;
pub mod diff_service;
pub mod flattener;
pub mod namespace_admin_service;
pub mod namespace_loader;
pub mod permission_service;
pub mod search_filter;
pub mod server_config_service;
pub mod text_diff;
pub mod text_renderer;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support;
