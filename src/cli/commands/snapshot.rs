use crate::adapters::portal::snapshot_source::SnapshotSource;
use crate::cli::{Selection, context, output};
use crate::core::errors::Result;
use crate::core::traits::item_source::ItemSource;

/// Execute the `nsdiff snapshot` command.
///
/// Fetches the namespace from every requested cluster and writes each as
/// `{out}/{app}/{env}/{cluster}/{namespace}.json`, ready for
/// `nsdiff diff --snapshot`.
pub fn execute(selection: &Selection, out: &str) -> Result<()> {
    let refs = context::namespace_refs(&selection.app, &selection.namespace, &selection.clusters)?;
    let portal = context::portal()?;
    let target = SnapshotSource::new(out);

    output::header(&format!(
        "📦 nsdiff snapshot: {}/{}",
        selection.app, selection.namespace
    ));

    context::block_on(async {
        for reference in &refs {
            let sp = output::spinner(&format!("Fetching {reference}..."));
            let items = match portal.find_items(reference).await {
                Ok(items) => items,
                Err(e) => {
                    sp.finish_and_clear();
                    return Err(e);
                }
            };
            let path = target.save(reference, &items).await?;
            output::finish_spinner(
                sp,
                &format!("{} items → {}", items.len(), path.display()),
            );
        }
        Ok(())
    })
}
