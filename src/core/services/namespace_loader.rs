use crate::adapters::parsers::json_parser::JsonParser;
use crate::adapters::parsers::xml_parser::XmlParser;
use crate::adapters::parsers::yaml_parser::YamlParser;
use crate::core::errors::Result;
use crate::core::models::config_item::ConfigItem;
use crate::core::models::loaded_namespace::LoadedNamespace;
use crate::core::models::namespace_ref::{NamespaceFormat, NamespaceRef};
use crate::core::services::flattener::flatten;
use crate::core::services::text_renderer::render_properties;
use crate::core::traits::parser::DocumentParser;

/// Turns the raw items of a namespace into flat, diffable items.
///
/// Comment-only items (empty key) are dropped first. Properties
/// namespaces are already flat; YAML, JSON and XML namespaces store the
/// whole document as the value of a single item, which is parsed and
/// flattened; any other format passes through untouched.
pub struct NamespaceLoader {
    parsers: Vec<Box<dyn DocumentParser>>,
}

impl Default for NamespaceLoader {
    fn default() -> Self {
        Self::new(vec![
            Box::new(YamlParser),
            Box::new(JsonParser),
            Box::new(XmlParser),
        ])
    }
}

impl NamespaceLoader {
    pub fn new(parsers: Vec<Box<dyn DocumentParser>>) -> Self {
        Self { parsers }
    }

    fn parser_for(&self, format: NamespaceFormat) -> Option<&dyn DocumentParser> {
        self.parsers
            .iter()
            .find(|p| p.format() == format)
            .map(|p| p.as_ref())
    }

    /// Load one namespace from the items the portal returned for it.
    ///
    /// # Errors
    ///
    /// `ParseError` when a structured namespace holds malformed content.
    pub fn load(&self, reference: &NamespaceRef, raw: Vec<ConfigItem>) -> Result<LoadedNamespace> {
        let items: Vec<ConfigItem> = raw.into_iter().filter(|i| !i.is_comment()).collect();
        let format = reference.format();

        if format == NamespaceFormat::Properties {
            let text = render_properties(&items);
            return Ok(LoadedNamespace {
                reference: reference.clone(),
                items,
                text,
            });
        }

        // Non-properties namespaces carry their content in one item. If the
        // portal ever returns several, the last one wins.
        let text = items.last().map(|i| i.value.clone()).unwrap_or_default();

        let items = match self.parser_for(format) {
            Some(parser) if !items.is_empty() => {
                let doc = parser.parse(&text, &reference.namespace_name)?;
                flatten(&doc, "").into_iter().map(ConfigItem::from).collect()
            }
            _ => items,
        };

        tracing::debug!(
            namespace = %reference,
            %format,
            items = items.len(),
            "namespace loaded"
        );

        Ok(LoadedNamespace {
            reference: reference.clone(),
            items,
            text,
        })
    }
}
