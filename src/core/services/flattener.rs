use indexmap::IndexMap;

use crate::core::models::config_item::FlatEntry;
use crate::core::models::document::Document;

/// Flatten a document into dot-joined `key = value` pairs.
///
/// Keys are visited in the document's own order. Nested nodes recurse
/// with `prefix + key + "."`; leaves are emitted as-is. A bare leaf at
/// the top level has no key and produces nothing.
pub fn flatten(doc: &Document, prefix: &str) -> Vec<FlatEntry> {
    let mut out = Vec::new();
    if let Document::Node(children) = doc {
        flatten_into(children, prefix, &mut out);
    }
    out
}

fn flatten_into(children: &IndexMap<String, Document>, prefix: &str, out: &mut Vec<FlatEntry>) {
    for (key, child) in children {
        match child {
            Document::Node(nested) => {
                let nested_prefix = format!("{prefix}{key}.");
                flatten_into(nested, &nested_prefix, out);
            }
            Document::Leaf(value) => out.push(FlatEntry::new(format!("{prefix}{key}"), value)),
        }
    }
}

/// Rebuild a nested document by splitting keys on `.`.
///
/// Inverse of [`flatten`] for documents whose keys contain no dots.
/// When a path needs a node where a leaf already sits, the node wins.
#[cfg(test)]
pub fn unflatten(entries: &[FlatEntry]) -> Document {
    let mut root = IndexMap::new();
    for entry in entries {
        let segments: Vec<&str> = entry.key.split('.').collect();
        insert_path(&mut root, &segments, &entry.value);
    }
    Document::Node(root)
}

#[cfg(test)]
fn insert_path(node: &mut IndexMap<String, Document>, segments: &[&str], value: &str) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    if rest.is_empty() {
        node.insert(head.to_string(), Document::leaf(value));
        return;
    }

    let child = node
        .entry(head.to_string())
        .or_insert_with(Document::node);
    if let Document::Leaf(_) = child {
        *child = Document::node();
    }
    if let Document::Node(children) = child {
        insert_path(children, rest, value);
    }
}
