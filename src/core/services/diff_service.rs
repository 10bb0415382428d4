use std::collections::HashSet;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::core::errors::{NsdiffError, Result};
use crate::core::models::config_item::ConfigItem;
use crate::core::models::diff_result::{
    AgreementTable, DiffMode, DiffTable, NamespaceDiff, NamespaceFailure,
};
use crate::core::models::loaded_namespace::LoadedNamespace;
use crate::core::models::namespace_ref::NamespaceRef;
use crate::core::services::namespace_loader::NamespaceLoader;
use crate::core::services::text_diff::diff_lines;
use crate::core::traits::item_source::ItemSource;

/// Compares one namespace across several (env, cluster) locations.
#[derive(Default)]
pub struct DiffService {
    loader: NamespaceLoader,
}

impl DiffService {
    pub fn new(loader: NamespaceLoader) -> Self {
        Self { loader }
    }

    /// Check that a selection of namespaces can be diffed in `mode`.
    ///
    /// At least two distinct namespaces are needed; the text view
    /// compares exactly two.
    pub fn validate_selection(namespaces: &[NamespaceRef], mode: DiffMode) -> Result<()> {
        if namespaces.len() < 2 {
            return Err(NsdiffError::InvalidSelection {
                detail: "choose at least two clusters to compare".into(),
            });
        }
        if mode == DiffMode::Text && namespaces.len() > 2 {
            return Err(NsdiffError::InvalidSelection {
                detail: "text diff compares exactly two clusters".into(),
            });
        }

        let mut seen = HashSet::new();
        for ns in namespaces {
            if !seen.insert(ns.slot_id()) {
                return Err(NsdiffError::InvalidSelection {
                    detail: format!("'{}' is selected more than once", ns.slot_id()),
                });
            }
        }
        Ok(())
    }

    /// Fetch every namespace concurrently, then aggregate.
    ///
    /// `on_progress(loaded, total)` is called as each fetch completes.
    /// A namespace whose fetch or parse fails is left out of the table
    /// and listed in `failures`; the rest of the diff still completes.
    pub async fn diff_with_progress<S, F>(
        &self,
        source: Arc<S>,
        namespaces: &[NamespaceRef],
        mode: DiffMode,
        on_progress: F,
    ) -> Result<NamespaceDiff>
    where
        S: ItemSource,
        F: FnMut(usize, usize),
    {
        Self::validate_selection(namespaces, mode)?;

        let fetched = fetch_all(source, namespaces, on_progress).await?;

        let mut loaded = Vec::with_capacity(namespaces.len());
        let mut failures = Vec::new();
        for (reference, result) in namespaces.iter().zip(fetched) {
            match result.and_then(|raw| self.loader.load(reference, raw)) {
                Ok(namespace) => loaded.push(namespace),
                Err(e) => {
                    tracing::warn!(namespace = %reference, error = %e, "namespace skipped");
                    failures.push(NamespaceFailure {
                        slot_id: reference.slot_id(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let (table, agreement) = Self::aggregate(namespaces.len(), &loaded);

        let text_diff = match (mode, loaded.as_slice()) {
            (DiffMode::Text, [left, right]) => Some(diff_lines(
                &left.reference.slot_id(),
                &left.text,
                &right.reference.slot_id(),
                &right.text,
            )),
            _ => None,
        };

        let diff = NamespaceDiff {
            slots: namespaces.iter().map(NamespaceRef::slot_id).collect(),
            table,
            agreement,
            texts: loaded
                .iter()
                .map(|ns| (ns.reference.slot_id(), ns.text.clone()))
                .collect(),
            text_diff,
            failures,
        };

        tracing::info!(
            namespaces = namespaces.len(),
            keys = diff.table.len(),
            differing = diff.differing_count(),
            failed = diff.failures.len(),
            "diff complete"
        );

        Ok(diff)
    }

    /// Build the diff table and per-key agreement.
    ///
    /// `total` is the number of participating namespaces. A key held by
    /// fewer namespaces than that never agrees; otherwise it agrees when
    /// every value equals the first one, taken in `loaded` order.
    pub fn aggregate(total: usize, loaded: &[LoadedNamespace]) -> (DiffTable, AgreementTable) {
        let mut table = DiffTable::default();
        for namespace in loaded {
            let slot_id = namespace.reference.slot_id();
            for item in &namespace.items {
                table.insert(&slot_id, item.clone());
            }
        }

        let agreement = table
            .iter()
            .map(|(key, slots)| {
                let equal = slots.len() == total && {
                    let mut values = slots.values().map(|item| item.value.as_str());
                    let first = values.next();
                    values.all(|v| Some(v) == first)
                };
                (key.to_string(), equal)
            })
            .collect();

        (table, agreement)
    }
}

/// Spawn one fetch per namespace and wait for all of them.
///
/// Results come back in request order regardless of completion order.
async fn fetch_all<S, F>(
    source: Arc<S>,
    namespaces: &[NamespaceRef],
    mut on_progress: F,
) -> Result<Vec<Result<Vec<ConfigItem>>>>
where
    S: ItemSource,
    F: FnMut(usize, usize),
{
    let total = namespaces.len();
    let mut tasks = JoinSet::new();

    for (index, namespace) in namespaces.iter().cloned().enumerate() {
        let source = Arc::clone(&source);
        tasks.spawn(async move {
            tracing::debug!(namespace = %namespace, "fetching items");
            let result = source.find_items(&namespace).await;
            (index, result)
        });
    }

    let mut results: Vec<Option<Result<Vec<ConfigItem>>>> = (0..total).map(|_| None).collect();
    let mut completed = 0;
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.map_err(|e| NsdiffError::TaskFailed {
            detail: e.to_string(),
        })?;
        completed += 1;
        on_progress(completed, total);
        results[index] = Some(result);
    }

    Ok(results
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| {
                Err(NsdiffError::TaskFailed {
                    detail: "fetch did not report a result".into(),
                })
            })
        })
        .collect())
}

#[cfg(test)]
impl DiffService {
    /// [`Self::diff_with_progress`] without progress reporting.
    pub async fn diff<S: ItemSource>(
        &self,
        source: Arc<S>,
        namespaces: &[NamespaceRef],
        mode: DiffMode,
    ) -> Result<NamespaceDiff> {
        self.diff_with_progress(source, namespaces, mode, |_, _| {})
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::core::models::diff_result::TextDiffLine;

    /// In-memory item source. `yields` delays a namespace by that many
    /// scheduler turns so completion order can be reversed.
    #[derive(Default)]
    struct FakeSource {
        items: HashMap<String, Vec<ConfigItem>>,
        yields: HashMap<String, usize>,
    }

    impl FakeSource {
        fn with(mut self, ns: &NamespaceRef, pairs: &[(&str, &str)]) -> Self {
            self.items.insert(
                ns.slot_id(),
                pairs.iter().map(|(k, v)| ConfigItem::new(*k, *v)).collect(),
            );
            self
        }

        fn with_content(mut self, ns: &NamespaceRef, content: &str) -> Self {
            self.items
                .insert(ns.slot_id(), vec![ConfigItem::new("content", content)]);
            self
        }

        fn delayed(mut self, ns: &NamespaceRef, turns: usize) -> Self {
            self.yields.insert(ns.slot_id(), turns);
            self
        }
    }

    impl ItemSource for FakeSource {
        async fn find_items(&self, namespace: &NamespaceRef) -> Result<Vec<ConfigItem>> {
            let turns = self.yields.get(&namespace.slot_id()).copied().unwrap_or(0);
            for _ in 0..turns {
                tokio::task::yield_now().await;
            }
            self.items
                .get(&namespace.slot_id())
                .cloned()
                .ok_or_else(|| NsdiffError::Http {
                    status: 404,
                    message: format!("namespace {namespace} not found"),
                })
        }
    }

    fn ns(env: &str, name: &str) -> NamespaceRef {
        NamespaceRef::new("shop", env, "default", name)
    }

    fn loaded(reference: NamespaceRef, pairs: &[(&str, &str)]) -> LoadedNamespace {
        LoadedNamespace {
            reference,
            items: pairs.iter().map(|(k, v)| ConfigItem::new(*k, *v)).collect(),
            text: String::new(),
        }
    }

    #[test]
    fn key_missing_from_one_namespace_disagrees() {
        let (x, y, z) = (ns("X", "app"), ns("Y", "app"), ns("Z", "app"));
        let namespaces = vec![
            loaded(x, &[("k", "v")]),
            loaded(y, &[("k", "v")]),
            loaded(z, &[("other", "1")]),
        ];
        let (table, agreement) = DiffService::aggregate(3, &namespaces);

        assert_eq!(table.get("k").unwrap().len(), 2);
        assert!(!agreement["k"]);
        assert!(!agreement["other"]);
    }

    #[test]
    fn same_value_everywhere_agrees() {
        let namespaces = vec![
            loaded(ns("A", "app"), &[("k", "same")]),
            loaded(ns("B", "app"), &[("k", "same")]),
            loaded(ns("C", "app"), &[("k", "same")]),
        ];
        let (_, agreement) = DiffService::aggregate(3, &namespaces);

        assert!(agreement["k"]);
    }

    #[test]
    fn one_different_value_disagrees() {
        let namespaces = vec![
            loaded(ns("A", "app"), &[("k", "1")]),
            loaded(ns("B", "app"), &[("k", "1")]),
            loaded(ns("C", "app"), &[("k", "2")]),
        ];
        let (_, agreement) = DiffService::aggregate(3, &namespaces);

        assert!(!agreement["k"]);
    }

    #[test]
    fn missing_namespace_counts_against_total() {
        // Only two of three requested namespaces loaded
        let namespaces = vec![
            loaded(ns("A", "app"), &[("k", "1")]),
            loaded(ns("B", "app"), &[("k", "1")]),
        ];
        let (_, agreement) = DiffService::aggregate(3, &namespaces);

        assert!(!agreement["k"]);
    }

    #[test]
    fn empty_values_compare_equal() {
        let namespaces = vec![
            loaded(ns("A", "app"), &[("k", "")]),
            loaded(ns("B", "app"), &[("k", "")]),
        ];
        let (_, agreement) = DiffService::aggregate(2, &namespaces);

        assert!(agreement["k"]);
    }

    #[test]
    fn selection_needs_two_namespaces() {
        let one = vec![ns("A", "app")];
        assert!(matches!(
            DiffService::validate_selection(&one, DiffMode::Table),
            Err(NsdiffError::InvalidSelection { .. })
        ));
    }

    #[test]
    fn text_mode_needs_exactly_two() {
        let three = vec![ns("A", "app"), ns("B", "app"), ns("C", "app")];

        assert!(DiffService::validate_selection(&three, DiffMode::Table).is_ok());
        assert!(DiffService::validate_selection(&three, DiffMode::Text).is_err());
        assert!(DiffService::validate_selection(&three[..2], DiffMode::Text).is_ok());
    }

    #[test]
    fn duplicate_selection_is_rejected() {
        let twice = vec![ns("A", "app"), ns("A", "app")];
        assert!(DiffService::validate_selection(&twice, DiffMode::Table).is_err());
    }

    #[tokio::test]
    async fn diff_across_three_clusters() {
        let (a, b, c) = (ns("DEV", "app"), ns("FAT", "app"), ns("PRO", "app"));
        let source = FakeSource::default()
            .with(&a, &[("timeout", "30"), ("host", "dev-db")])
            .with(&b, &[("timeout", "30"), ("host", "fat-db")])
            .with(&c, &[("timeout", "30"), ("host", "pro-db"), ("extra", "1")]);

        let diff = DiffService::default()
            .diff(Arc::new(source), &[a, b, c], DiffMode::Table)
            .await
            .unwrap();

        assert!(diff.is_equal("timeout"));
        assert!(!diff.is_equal("host"));
        assert!(!diff.is_equal("extra"));
        assert_eq!(diff.equal_count(), 1);
        assert_eq!(diff.differing_count(), 2);
        assert!(diff.failures.is_empty());
        assert!(diff.text_diff.is_none());
    }

    #[tokio::test]
    async fn slot_order_follows_request_order_not_completion_order() {
        let (a, b, c) = (ns("DEV", "app"), ns("FAT", "app"), ns("PRO", "app"));
        let source = FakeSource::default()
            .with(&a, &[("k", "1")])
            .with(&b, &[("k", "2")])
            .with(&c, &[("k", "3")])
            .delayed(&a, 20)
            .delayed(&b, 10);

        let diff = DiffService::default()
            .diff(
                Arc::new(source),
                &[a.clone(), b.clone(), c.clone()],
                DiffMode::Table,
            )
            .await
            .unwrap();

        let slots: Vec<&str> = diff
            .table
            .get("k")
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(slots, vec!["DEV:default:app", "FAT:default:app", "PRO:default:app"]);
        assert_eq!(diff.slots, slots);
    }

    #[tokio::test]
    async fn failed_fetch_is_skipped_and_reported() {
        let (a, b, missing) = (ns("DEV", "app"), ns("FAT", "app"), ns("UAT", "app"));
        let source = FakeSource::default()
            .with(&a, &[("k", "v")])
            .with(&b, &[("k", "v")]);

        let diff = DiffService::default()
            .diff(Arc::new(source), &[a, b, missing], DiffMode::Table)
            .await
            .unwrap();

        assert_eq!(diff.failures.len(), 1);
        assert_eq!(diff.failures[0].slot_id, "UAT:default:app");
        assert!(diff.failures[0].reason.contains("404"));
        // Agreement is still judged against all three requested namespaces
        assert!(!diff.is_equal("k"));
        assert_eq!(diff.table.get("k").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn parse_failure_only_drops_that_namespace() {
        let (a, b) = (ns("DEV", "ds.json"), ns("PRO", "ds.json"));
        let source = FakeSource::default()
            .with_content(&a, r#"{"db": {"url": "x"}}"#)
            .with_content(&b, "{broken");

        let diff = DiffService::default()
            .diff(Arc::new(source), &[a, b], DiffMode::Table)
            .await
            .unwrap();

        assert_eq!(diff.failures.len(), 1);
        assert_eq!(diff.failures[0].slot_id, "PRO:default:ds.json");
        assert!(diff.table.get("db.url").is_some());
        assert!(!diff.is_equal("db.url"));
    }

    #[tokio::test]
    async fn structured_namespaces_compare_flattened_keys() {
        let (a, b) = (ns("DEV", "app.yml"), ns("PRO", "app.yml"));
        let source = FakeSource::default()
            .with_content(&a, "server:\n  port: 8080\n  host: a\n")
            .with_content(&b, "server:\n  host: a\n  port: 9090\n");

        let diff = DiffService::default()
            .diff(Arc::new(source), &[a, b], DiffMode::Table)
            .await
            .unwrap();

        assert!(diff.is_equal("server.host"));
        assert!(!diff.is_equal("server.port"));
    }

    #[tokio::test]
    async fn text_mode_diffs_rendered_properties() {
        let (a, b) = (ns("DEV", "app"), ns("PRO", "app"));
        let source = FakeSource::default()
            .with(&a, &[("b", "2"), ("a", "1")])
            .with(&b, &[("a", "1"), ("b", "3")]);

        let diff = DiffService::default()
            .diff(Arc::new(source), &[a, b], DiffMode::Text)
            .await
            .unwrap();

        let text = diff.text_diff.unwrap();
        assert_eq!(text.left_name, "DEV:default:app");
        assert_eq!(
            text.lines,
            vec![
                TextDiffLine::Same("a = 1".into()),
                TextDiffLine::Left("b = 2".into()),
                TextDiffLine::Right("b = 3".into()),
            ]
        );
        assert_eq!(diff.texts["DEV:default:app"], "a = 1\nb = 2\n");
    }

    #[tokio::test]
    async fn progress_reports_every_completion() {
        let (a, b, c) = (ns("DEV", "app"), ns("FAT", "app"), ns("PRO", "app"));
        let source = FakeSource::default()
            .with(&a, &[])
            .with(&b, &[])
            .with(&c, &[]);

        let mut seen = Vec::new();
        DiffService::default()
            .diff_with_progress(Arc::new(source), &[a, b, c], DiffMode::Table, |n, total| {
                seen.push((n, total))
            })
            .await
            .unwrap();

        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn invalid_selection_fetches_nothing() {
        let result = DiffService::default()
            .diff(
                Arc::new(FakeSource::default()),
                &[ns("DEV", "app")],
                DiffMode::Table,
            )
            .await;

        assert!(matches!(result, Err(NsdiffError::InvalidSelection { .. })));
    }
}
