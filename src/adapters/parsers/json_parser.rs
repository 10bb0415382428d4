use serde_json::{Number, Value};

use crate::core::errors::{NsdiffError, Result};
use crate::core::models::document::Document;
use crate::core::models::namespace_ref::NamespaceFormat;
use crate::core::traits::parser::DocumentParser;

/// Parses `.json` namespaces.
///
/// Object key order is kept (`serde_json` is built with
/// `preserve_order`). Booleans keep their JSON spelling, integral numbers
/// print without a fraction (`1.0` and `1e2` become `1` and `100`), and
/// `null` becomes an empty value.
pub struct JsonParser;

impl JsonParser {
    fn to_document(value: Value) -> Document {
        match value {
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| (k, Self::to_document(v)))
                .collect(),
            Value::Array(items) => Document::sequence(items.into_iter().map(Self::to_document)),
            Value::Null => Document::leaf(""),
            Value::String(s) => Document::Leaf(s),
            Value::Number(n) => Document::Leaf(number_text(&n)),
            Value::Bool(b) => Document::Leaf(b.to_string()),
        }
    }
}

/// Largest magnitude below which every integer is exact in an `f64`.
const MAX_SAFE_FLOAT: f64 = 9_007_199_254_740_992.0;

fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_SAFE_FLOAT => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

impl DocumentParser for JsonParser {
    fn parse(&self, content: &str, origin: &str) -> Result<Document> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| NsdiffError::parse(origin, self.format().label(), e))?;
        Ok(Self::to_document(value))
    }

    fn format(&self) -> NamespaceFormat {
        NamespaceFormat::Json
    }
}
