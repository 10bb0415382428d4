use serde::{Deserialize, Deserializer, Serialize};

/// One configuration item as the portal stores it.
///
/// An empty `key` marks a free-floating comment line; such items
/// never take part in diffing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigItem {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub key: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub value: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub comment: String,
}

impl ConfigItem {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            comment: String::new(),
        }
    }

    /// Returns true for comment-only lines.
    pub fn is_comment(&self) -> bool {
        self.key.is_empty()
    }
}

/// A flattened `key = value` pair produced from a structured document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatEntry {
    pub key: String,
    pub value: String,
}

impl FlatEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl From<FlatEntry> for ConfigItem {
    fn from(entry: FlatEntry) -> Self {
        ConfigItem::new(entry.key, entry.value)
    }
}

/// The portal sends `null` for absent comments (and occasionally values).
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
