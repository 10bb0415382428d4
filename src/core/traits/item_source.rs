use std::future::Future;

use crate::core::errors::Result;
use crate::core::models::config_item::ConfigItem;
use crate::core::models::namespace_ref::NamespaceRef;

/// Port for fetching the raw items of one namespace.
///
/// Implementations are shared across concurrently running fetches.
pub trait ItemSource: Send + Sync + 'static {
    fn find_items(
        &self,
        namespace: &NamespaceRef,
    ) -> impl Future<Output = Result<Vec<ConfigItem>>> + Send;
}
