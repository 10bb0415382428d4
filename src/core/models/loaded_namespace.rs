use crate::core::models::config_item::ConfigItem;
use crate::core::models::namespace_ref::NamespaceRef;

/// A namespace after loading: flat items ready for diffing plus
/// the text shown in the two-namespace text view.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedNamespace {
    pub reference: NamespaceRef,
    pub items: Vec<ConfigItem>,
    pub text: String,
}
