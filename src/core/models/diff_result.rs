use indexmap::IndexMap;

use crate::core::models::config_item::ConfigItem;

/// How a diff is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffMode {
    /// Per-key table across any number of namespaces.
    #[default]
    Table,
    /// Line diff of the text of exactly two namespaces.
    Text,
}

/// Per-key agreement across all participating namespaces.
pub type AgreementTable = IndexMap<String, bool>;

/// key -> slot id (`env:cluster:namespace`) -> item found there.
///
/// Keys keep first-seen order; slots keep the order in which the
/// namespaces were requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffTable {
    rows: IndexMap<String, IndexMap<String, ConfigItem>>,
}

impl DiffTable {
    pub fn insert(&mut self, slot_id: &str, item: ConfigItem) {
        self.rows
            .entry(item.key.clone())
            .or_default()
            .insert(slot_id.to_string(), item);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, ConfigItem>)> {
        self.rows.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
impl DiffTable {
    /// Items held for `key`, keyed by slot id.
    pub fn get(&self, key: &str) -> Option<&IndexMap<String, ConfigItem>> {
        self.rows.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }
}

/// A namespace that could not contribute to the diff.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceFailure {
    pub slot_id: String,
    pub reason: String,
}

/// One line of a two-namespace text diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextDiffLine {
    Same(String),
    /// Only in the left namespace.
    Left(String),
    /// Only in the right namespace.
    Right(String),
}

/// Line diff between the text renderings of two namespaces.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDiff {
    pub left_name: String,
    pub right_name: String,
    pub lines: Vec<TextDiffLine>,
}

impl TextDiff {
    pub fn is_identical(&self) -> bool {
        self.lines
            .iter()
            .all(|line| matches!(line, TextDiffLine::Same(_)))
    }
}

/// A row of the rendered diff table.
#[derive(Debug, Clone, Copy)]
pub struct DiffRow<'a> {
    pub key: &'a str,
    pub equal: bool,
    pub items: &'a IndexMap<String, ConfigItem>,
}

impl DiffRow<'_> {
    /// True when every item present for this key carries the same comment.
    pub fn comments_equal(&self) -> bool {
        let mut comments = self.items.values().map(|item| item.comment.as_str());
        let first = comments.next();
        comments.all(|comment| Some(comment) == first)
    }
}

/// Result of comparing one namespace across several clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDiff {
    /// Slot ids of every requested namespace, in request order.
    pub slots: Vec<String>,
    pub table: DiffTable,
    pub agreement: AgreementTable,
    /// Text rendering per loaded slot.
    pub texts: IndexMap<String, String>,
    pub text_diff: Option<TextDiff>,
    pub failures: Vec<NamespaceFailure>,
}

impl NamespaceDiff {
    /// True when every participating namespace holds `key` with one value.
    pub fn is_equal(&self, key: &str) -> bool {
        self.agreement.get(key).copied().unwrap_or(false)
    }

    /// Rows in key order, optionally restricted to disagreeing keys.
    pub fn rows(&self, only_diff: bool) -> Vec<DiffRow<'_>> {
        self.table
            .iter()
            .map(|(key, items)| DiffRow {
                key,
                equal: self.is_equal(key),
                items,
            })
            .filter(|row| !only_diff || !row.equal)
            .collect()
    }

    pub fn equal_count(&self) -> usize {
        self.agreement.values().filter(|equal| **equal).count()
    }

    pub fn differing_count(&self) -> usize {
        self.agreement.len() - self.equal_count()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
