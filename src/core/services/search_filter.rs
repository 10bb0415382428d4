use crate::core::models::server_config::ServerConfig;
use crate::core::models::user::UserRecord;

/// Something a list view can be searched by.
pub trait Searchable {
    /// The name matched against the search key. Empty names never match.
    fn search_name(&self) -> &str;
}

impl Searchable for ServerConfig {
    fn search_name(&self) -> &str {
        &self.key
    }
}

impl Searchable for UserRecord {
    fn search_name(&self) -> &str {
        &self.user_id
    }
}

/// An in-memory, case-insensitive substring filter over a fetched list.
///
/// The original list is never modified, so applying an empty key after
/// any other key restores the full (named) list.
#[derive(Debug, Clone)]
pub struct SearchFilter<T> {
    all: Vec<T>,
    visible: Vec<usize>,
    key: String,
}

impl<T: Searchable> SearchFilter<T> {
    pub fn new(items: Vec<T>) -> Self {
        let mut filter = Self {
            all: items,
            visible: Vec::new(),
            key: String::new(),
        };
        filter.apply("");
        filter
    }

    /// Filter by `key`, matched case-insensitively against each search name.
    pub fn apply(&mut self, key: &str) {
        self.key = key.to_lowercase();
        self.visible = self
            .all
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                let name = item.search_name();
                !name.is_empty() && name.to_lowercase().contains(&self.key)
            })
            .map(|(i, _)| i)
            .collect();
    }

    pub fn reset(&mut self) {
        self.apply("");
    }

    /// The current (lower-cased) search key.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn visible(&self) -> impl Iterator<Item = &T> {
        self.visible.iter().map(|&i| &self.all[i])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn all(&self) -> &[T] {
        &self.all
    }
}
