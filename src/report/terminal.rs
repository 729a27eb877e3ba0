use std::collections::BTreeMap;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::category::{CategoryStore, EnabledCategories};
use crate::models::{LibraryUsageRecord, RepoOutcome, RunSummary};
use crate::transform::transform_record;

/// Print the per-repository outcome of a scan.
pub fn render_scan_summary(summary: &RunSummary, quiet: bool) {
    let scanned = summary.outcomes.len() - summary.skipped_repositories();
    let files = summary.records().count();
    let rows: usize = summary.records().map(|r| transform_record(r).len()).sum();

    if quiet {
        println!(
            "Repositories: {}  Skipped: {}  Files: {}  Rows: {}",
            scanned.to_string().green(),
            summary.skipped_repositories().to_string().yellow(),
            files,
            rows,
        );
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Repository").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Files").add_attribute(Attribute::Bold),
            Cell::new("Rows").add_attribute(Attribute::Bold),
            Cell::new("Notes").add_attribute(Attribute::Bold),
        ]);

    for outcome in &summary.outcomes {
        match outcome {
            RepoOutcome::Scanned {
                repository,
                records,
                skipped_files,
            } => {
                let rows: usize = records.iter().map(|r| transform_record(r).len()).sum();
                let notes = if skipped_files.is_empty() {
                    String::new()
                } else {
                    format!("{} file(s) not decoded", skipped_files.len())
                };
                table.add_row(vec![
                    Cell::new(repository),
                    Cell::new("✓ scanned").fg(Color::Green),
                    Cell::new(records.len()).set_alignment(CellAlignment::Right),
                    Cell::new(rows).set_alignment(CellAlignment::Right),
                    Cell::new(notes).fg(Color::Yellow),
                ]);
            }
            RepoOutcome::Skipped { repository, reason } => {
                table.add_row(vec![
                    Cell::new(repository),
                    Cell::new("✗ skipped").fg(Color::Red),
                    Cell::new("-").set_alignment(CellAlignment::Right),
                    Cell::new("-").set_alignment(CellAlignment::Right),
                    Cell::new(reason).fg(Color::DarkGrey),
                ]);
            }
        }
    }

    println!("{}", table);
    println!(
        " {} {} repositories scanned, {} skipped, {} files, {} rows\n",
        "→".cyan(),
        scanned,
        summary.skipped_repositories(),
        files,
        rows,
    );
}

/// Print every category with its library count and whether it is enabled.
pub fn render_categories(
    records: &[LibraryUsageRecord],
    store: &CategoryStore,
    enabled: &EnabledCategories,
) {
    let mut libraries: BTreeMap<&str, std::collections::BTreeSet<&str>> = store
        .categories()
        .into_iter()
        .map(|c| (c, Default::default()))
        .collect();
    for record in records {
        libraries
            .entry(store.lookup(&record.library))
            .or_default()
            .insert(&record.library);
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Libraries").add_attribute(Attribute::Bold),
            Cell::new("Enabled").add_attribute(Attribute::Bold),
        ]);

    for (category, libs) in &libraries {
        let on = enabled.contains(category);
        table.add_row(vec![
            Cell::new(category),
            Cell::new(libs.len()).set_alignment(CellAlignment::Right),
            if on {
                Cell::new("✓").fg(Color::Green)
            } else {
                Cell::new("legend only").fg(Color::DarkGrey)
            }
            .set_alignment(CellAlignment::Center),
        ]);
    }

    println!("\n {}\n", "Categories".bold());
    println!("{}", table);

    let unknown: Vec<&str> = enabled
        .names()
        .iter()
        .map(String::as_str)
        .filter(|name| !libraries.contains_key(name))
        .collect();
    if !unknown.is_empty() {
        eprintln!(
            "{} enabled categories with no libraries: {}",
            "warning:".yellow().bold(),
            unknown.join(", ")
        );
    }
}
