//! `import-timeline` — chart when a hosting account's repositories adopted each library.
//!
//! # Flow
//! `scan`:
//! 1. Load config ([`config::load_config`]) and ask for the account and token.
//! 2. Walk every repository ([`walker`]) through the hosting API ([`host`]),
//!    extracting imports from scripts, notebooks and requirement files ([`extractor`]).
//! 3. Flatten to one row per (file, library) ([`transform`]) and write the CSV export ([`export`]).
//! 4. Add new libraries to the category file ([`category`]) for manual labelling.
//!
//! `report`:
//! 1. Read the export, category file and enabled categories.
//! 2. Build the per-category timeline ([`report::timeline`]).
//! 3. Write the interactive HTML page ([`report::html`]) and optionally a PNG ([`report::png`]).

mod category;
mod cli;
mod config;
mod detector;
mod error;
mod export;
mod extractor;
mod host;
mod models;
mod report;
mod transform;
mod walker;

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use category::{CategoryStore, EnabledCategories};
use cli::{Cli, Command, ReportArgs, ScanArgs};
use config::{load_config, Config};
use host::github::GitHubClient;
use models::RepoOutcome;
use walker::Walker;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().unwrap_or_else(|_| ".".into());
    let config = load_config(&cwd, cli.config.as_deref())?;

    match cli.command {
        Command::Scan(args) => scan(&config, args, cli.quiet).await,
        Command::Report(args) => report(&config, args, cli.quiet),
    }
}

async fn scan(config: &Config, args: ScanArgs, quiet: bool) -> Result<()> {
    let user = match args.user {
        Some(user) => user,
        None => prompt("Enter your GitHub username: ")?,
    };
    let token = match std::env::var("GITHUB_TOKEN") {
        Ok(token) if !token.trim().is_empty() => token,
        _ => prompt("Enter your GitHub token: ")?,
    };
    let export_path = args.export.unwrap_or_else(|| config.files.export.clone());
    let categories_path = args
        .categories
        .unwrap_or_else(|| config.files.categories.clone());

    let client = GitHubClient::new(
        &config.github.api_url,
        &token,
        Duration::from_secs(config.github.timeout_secs),
    )?;

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        pb
    };

    let summary = Walker::new(&client)
        .scan_account(&user, |total, outcome| {
            pb.set_length(total as u64);
            pb.inc(1);
            pb.set_message(outcome.repository().to_string());
            log_outcome(&pb, outcome);
        })
        .await
        .with_context(|| format!("Failed to list repositories of {}", user))?;
    pb.finish_and_clear();

    let usages = transform::transform_records(summary.records());
    export::write_usage_csv(&export_path, &usages)?;

    let mut store = CategoryStore::load_or_default(&categories_path)?;
    let libraries = export::distinct_libraries(&usages);
    let added = store.merge_libraries(libraries.iter().map(String::as_str));
    store.save(&categories_path)?;

    report::terminal::render_scan_summary(&summary, quiet);

    if !quiet {
        println!(
            " {} {} rows written to {}",
            "→".cyan(),
            usages.len(),
            export_path.display()
        );
        println!(
            " {} {} new of {} libraries in {}; fill in their categories, then run `import-timeline report`",
            "→".cyan(),
            added,
            store.len(),
            categories_path.display()
        );
    }

    Ok(())
}

fn report(config: &Config, args: ReportArgs, quiet: bool) -> Result<()> {
    let export_path = args.export.unwrap_or_else(|| config.files.export.clone());
    let categories_path = args
        .categories
        .unwrap_or_else(|| config.files.categories.clone());
    let enabled_path = args.enabled.unwrap_or_else(|| config.files.enabled.clone());
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.files.output_dir.clone());

    let usages = export::read_usage_csv(&export_path)?;
    let store = CategoryStore::load(&categories_path)?;
    if store.is_empty() {
        eprintln!(
            "{} {} has no entries; every library is reported as Other",
            "warning:".yellow().bold(),
            categories_path.display()
        );
    }
    let enabled = if enabled_path.exists() {
        EnabledCategories::load(&enabled_path)?
    } else {
        eprintln!(
            "{} {} not found; every category starts collapsed",
            "warning:".yellow().bold(),
            enabled_path.display()
        );
        EnabledCategories::default()
    };

    if !quiet {
        report::terminal::render_categories(&usages, &store, &enabled);
    }

    let timeline = report::timeline::build_report(
        &usages,
        &store,
        &enabled,
        &config.report.palette,
        &config.report.title,
    );

    if !quiet {
        println!(
            " {} {} libraries in {} categories",
            "→".cyan(),
            timeline.libraries().len(),
            timeline.series.len()
        );
    }

    let html_path = output_dir.join(&timeline.filename);
    report::html::render(&timeline, &html_path)?;
    println!("Report written to: {}", html_path.display());

    if args.png {
        let png_path = html_path.with_extension("png");
        match report::png::render(&timeline, &png_path) {
            Ok(()) => println!("Snapshot written to: {}", png_path.display()),
            Err(e) => eprintln!("{} {:#}", "warning:".yellow().bold(), e),
        }
    }

    if args.open {
        open_in_browser(&html_path)?;
    }

    Ok(())
}

/// Print a warning for every repository or file the scan had to skip.
fn log_outcome(pb: &ProgressBar, outcome: &RepoOutcome) {
    match outcome {
        RepoOutcome::Skipped { repository, reason } => pb.suspend(|| {
            eprintln!(
                "{} skipping {}: {}",
                "error:".red().bold(),
                repository,
                reason
            )
        }),
        RepoOutcome::Scanned {
            repository,
            skipped_files,
            ..
        } => {
            for (path, reason) in skipped_files {
                pb.suspend(|| {
                    eprintln!(
                        "{} {}/{} skipped: {}",
                        "warning:".yellow().bold(),
                        repository,
                        path,
                        reason
                    )
                });
            }
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("Failed to read from stdin")?;

    let answer = answer.trim().to_string();
    if answer.is_empty() {
        bail!("No value entered for {:?}", label.trim_end_matches(": "));
    }
    Ok(answer)
}

fn open_in_browser(path: &Path) -> Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        std::process::Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        std::process::Command::new("xdg-open")
    };

    command
        .arg(path)
        .spawn()
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(())
}
