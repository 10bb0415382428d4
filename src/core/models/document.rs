use indexmap::IndexMap;

/// A parsed structured document (YAML, JSON or XML).
///
/// Mappings keep their source key order. Sequences are stored as
/// nodes keyed by their zero-based index, the same way the portal's
/// object walk enumerates arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    Leaf(String),
    Node(IndexMap<String, Document>),
}

impl Document {
    /// An empty mapping.
    pub fn node() -> Self {
        Document::Node(IndexMap::new())
    }

    pub fn leaf(value: impl Into<String>) -> Self {
        Document::Leaf(value.into())
    }

    /// Build a node from a sequence, keying each element by its index.
    pub fn sequence(items: impl IntoIterator<Item = Document>) -> Self {
        Document::Node(
            items
                .into_iter()
                .enumerate()
                .map(|(i, doc)| (i.to_string(), doc))
                .collect(),
        )
    }
}

#[cfg(test)]
impl Document {
    /// Returns the child under `key` when this is a node.
    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Document::Node(children) => children.get(key),
            Document::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Document::Leaf(value) => Some(value),
            Document::Node(_) => None,
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Document)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, Document)>>(iter: I) -> Self {
        Document::Node(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
