use std::sync::Arc;

use colored::Colorize;

use crate::adapters::portal::snapshot_source::SnapshotSource;
use crate::cli::{Selection, context, output};
use crate::core::errors::Result;
use crate::core::models::diff_result::{DiffMode, DiffRow, NamespaceDiff, TextDiff, TextDiffLine};
use crate::core::models::namespace_ref::NamespaceRef;
use crate::core::services::diff_service::DiffService;
use crate::core::services::namespace_loader::NamespaceLoader;
use crate::core::traits::item_source::ItemSource;

const VALUE_WIDTH: usize = 24;

/// Execute the `nsdiff diff` command.
///
/// Loads one namespace from every requested cluster and shows, per key,
/// whether all clusters agree. With `--text`, shows a line diff of the
/// two namespace texts instead. With `--comments`, each value is followed
/// by its comment and keys whose comments disagree are flagged.
pub fn execute(
    selection: &Selection,
    text: bool,
    all_keys: bool,
    comments: bool,
    snapshot: Option<&str>,
) -> Result<()> {
    let refs = context::namespace_refs(&selection.app, &selection.namespace, &selection.clusters)?;
    let mode = if text { DiffMode::Text } else { DiffMode::Table };
    DiffService::validate_selection(&refs, mode)?;

    let only_diff = !all_keys && context::app_config()?.diff.only_show_diff_keys;

    let diff = match snapshot {
        Some(dir) => load(SnapshotSource::new(dir), &refs, mode)?,
        None => load(context::portal()?, &refs, mode)?,
    };

    output::header(&format!(
        "🔍 nsdiff diff: {}/{} ({})",
        selection.app,
        selection.namespace,
        refs[0].format()
    ));

    if diff.has_failures() {
        for failure in &diff.failures {
            output::warning(&format!(
                "{} skipped: {}",
                failure.slot_id,
                output::first_line(&failure.reason)
            ));
        }
        output::warning("Keys are compared against every requested cluster, skipped ones included");
    }

    match &diff.text_diff {
        Some(text_diff) => print_text_diff(text_diff),
        None if mode == DiffMode::Text => {
            output::warning("Text diff needs both namespaces to load");
        }
        None => print_table_view(&diff, only_diff, comments),
    }

    Ok(())
}

fn load<S: ItemSource>(source: S, refs: &[NamespaceRef], mode: DiffMode) -> Result<NamespaceDiff> {
    let sp = output::spinner(&format!("Loading {} namespaces...", refs.len()));
    let service = DiffService::new(NamespaceLoader::default());
    let diff = context::block_on(service.diff_with_progress(
        Arc::new(source),
        refs,
        mode,
        |loaded, total| sp.set_message(format!("Loaded {loaded}/{total} namespaces...")),
    ));
    sp.finish_and_clear();
    diff
}

fn print_table_view(diff: &NamespaceDiff, only_diff: bool, comments: bool) {
    if diff.table.is_empty() {
        output::warning("No configuration items found");
        return;
    }

    let rows: Vec<DiffRow<'_>> = diff
        .rows(false)
        .into_iter()
        .filter(|row| !only_diff || !row.equal || (comments && !row.comments_equal()))
        .collect();
    if rows.is_empty() {
        output::success(&format!(
            "All {} keys are identical in {} clusters",
            diff.table.len(),
            diff.slots.len()
        ));
        return;
    }

    print_diff_table(&diff.slots, &rows, comments);
    let comment_mismatches = if comments {
        diff.rows(false).iter().filter(|row| !row.comments_equal()).count()
    } else {
        0
    };
    print_diff_summary(diff, comment_mismatches);
}

/// Print one row per key with one column per cluster.
fn print_diff_table(slots: &[String], rows: &[DiffRow<'_>], comments: bool) {
    let key_width = rows
        .iter()
        .map(|r| r.key.chars().count())
        .max()
        .unwrap_or(8)
        .clamp(8, 48);
    let column_width = slots
        .iter()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(VALUE_WIDTH)
        .max(VALUE_WIDTH);

    let mut header = format!("  {:<key_width$}", "Key");
    for slot in slots {
        header.push_str(&format!("   {slot:<column_width$}"));
    }
    println!("{}", header.trim_end().bold());
    println!("  {}", "─".repeat(header.trim_end().chars().count().saturating_sub(2)));

    for row in rows {
        let key = format!("{:<key_width$}", output::truncate(row.key, key_width));
        let mut line = format!(
            "  {}",
            if row.equal { key.normal() } else { key.yellow() }
        );

        let reference = row.items.values().next().map(|item| item.value.as_str());
        for slot in slots {
            let cell = match row.items.get(slot) {
                Some(item) => {
                    let value = format!("{:<column_width$}", output::truncate(&item.value, column_width));
                    if row.equal || Some(item.value.as_str()) == reference {
                        value.normal()
                    } else {
                        value.yellow()
                    }
                }
                None => format!("{:<column_width$}", "(missing)").red(),
            };
            line.push_str(&format!("   {cell}"));
        }
        println!("{}", line.trim_end());

        if comments {
            print_comment_line(slots, row, key_width, column_width);
        }
    }
}

/// Print the comments of one row under its values.
fn print_comment_line(slots: &[String], row: &DiffRow<'_>, key_width: usize, column_width: usize) {
    let equal = row.comments_equal();
    let mut line = format!("  {:<key_width$}", "#");
    for slot in slots {
        let comment = row.items.get(slot).map(|item| item.comment.as_str()).unwrap_or("");
        let cell = format!("{:<column_width$}", output::truncate(comment, column_width));
        line.push_str(&format!(
            "   {}",
            if equal { cell.dimmed() } else { cell.magenta() }
        ));
    }
    if !equal {
        line.push_str(&format!("   {}", "(comments differ)".magenta()));
    }
    println!("{}", line.trim_end());
}

/// Print a summary line below the table.
fn print_diff_summary(diff: &NamespaceDiff, comment_mismatches: usize) {
    let differing = diff.differing_count();
    let mut summary = format!("{} equal, {differing} different", diff.equal_count());
    if comment_mismatches > 0 {
        summary.push_str(&format!(", {comment_mismatches} with differing comments"));
    }

    println!();
    if differing > 0 || comment_mismatches > 0 {
        output::warning(&summary);
    } else {
        output::success(&summary);
    }
}

fn print_text_diff(text_diff: &TextDiff) {
    if text_diff.is_identical() {
        output::success(&format!(
            "{} and {} are identical",
            text_diff.left_name, text_diff.right_name
        ));
        return;
    }

    println!("{}", format!("--- {}", text_diff.left_name).red());
    println!("{}", format!("+++ {}", text_diff.right_name).green());
    for line in &text_diff.lines {
        match line {
            TextDiffLine::Same(text) => println!("  {}", text.dimmed()),
            TextDiffLine::Left(text) => println!("{}", format!("- {text}").red()),
            TextDiffLine::Right(text) => println!("{}", format!("+ {text}").green()),
        }
    }

    let (removed, added) = text_diff.lines.iter().fold((0, 0), |(r, a), line| match line {
        TextDiffLine::Left(_) => (r + 1, a),
        TextDiffLine::Right(_) => (r, a + 1),
        TextDiffLine::Same(_) => (r, a),
    });
    println!();
    output::warning(&format!(
        "{removed} line(s) only in {}, {added} line(s) only in {}",
        text_diff.left_name, text_diff.right_name
    ));
}
