use serde_yaml::Value;

use crate::core::errors::{NsdiffError, Result};
use crate::core::models::document::Document;
use crate::core::models::namespace_ref::NamespaceFormat;
use crate::core::traits::parser::DocumentParser;

/// Parses `.yml` namespaces.
///
/// Merge keys (`<<`) are applied before conversion. Scalars keep their
/// YAML spelling; `~`/`null` becomes an empty value.
pub struct YamlParser;

impl YamlParser {
    fn to_document(value: Value) -> Document {
        match value {
            Value::Mapping(map) => map
                .into_iter()
                .map(|(k, v)| (Self::key_text(&k), Self::to_document(v)))
                .collect(),
            Value::Sequence(items) => {
                Document::sequence(items.into_iter().map(Self::to_document))
            }
            Value::Tagged(tagged) => Self::to_document(tagged.value),
            Value::Null => Document::leaf(""),
            Value::String(s) => Document::Leaf(s),
            Value::Bool(b) => Document::Leaf(b.to_string()),
            Value::Number(n) => Document::Leaf(n.to_string()),
        }
    }

    /// Mapping keys are usually strings, but YAML allows any scalar.
    fn key_text(key: &Value) -> String {
        match key {
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Null => "null".to_string(),
            Value::Tagged(tagged) => Self::key_text(&tagged.value),
            complex => serde_yaml::to_string(complex)
                .map(|s| s.trim_end().to_string())
                .unwrap_or_default(),
        }
    }
}

impl DocumentParser for YamlParser {
    fn parse(&self, content: &str, origin: &str) -> Result<Document> {
        let label = self.format().label();
        let mut value: Value =
            serde_yaml::from_str(content).map_err(|e| NsdiffError::parse(origin, label, e))?;
        value
            .apply_merge()
            .map_err(|e| NsdiffError::parse(origin, label, e))?;
        Ok(Self::to_document(value))
    }

    fn format(&self) -> NamespaceFormat {
        NamespaceFormat::Yaml
    }
}
