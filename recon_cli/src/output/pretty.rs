//! Pretty formatter for terminal output.
//!
//! Results table first, then the per-source summary, then failures last where
//! the eye settles.

use super::{terminal_width, truncate_text};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;
use recon_core::{SearchOutcome, SearchReport, SourceInfo};

pub fn print_search_report(report: &SearchReport, outcome: &SearchOutcome) {
    let width = terminal_width();

    println!("{} {}", "Search:".bold().cyan(), report.keyword.yellow());
    println!();

    if outcome.results.is_empty() {
        println!("   {}", "No results".dimmed());
    } else {
        let url_width = width.saturating_sub(50).max(40);
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_width(width as u16)
            .set_header(vec!["#", "URL", "Domain", "Source", "Info"]);

        for (i, record) in outcome.results.iter().enumerate() {
            table.add_row(vec![
                (i + 1).to_string(),
                truncate_text(&record.url, url_width),
                truncate_text(&record.domain, 40),
                record.source.clone(),
                record.info.clone().unwrap_or_default(),
            ]);
        }
        println!("{}", table);
    }

    // Per-source summary
    println!();
    let header = format!("Sources ({} ok, {} failed)", report.completed.len(), report.errors.len());
    let line_len = width.saturating_sub(header.len() + 6).min(60);
    println!("{} {} {}", "──".cyan(), header.green().bold(), "─".repeat(line_len).cyan());
    for source in &report.completed {
        let timing = source
            .duration_ms
            .map(|ms| format!(" in {}ms", ms))
            .unwrap_or_default();
        println!(
            "   {} {:<14} {} records{}",
            "✓".green(),
            source.source,
            source.count,
            timing.dimmed()
        );
    }

    if report.has_errors() {
        println!();
        println!("{}", "⚠ Partial results - some sources failed:".yellow());
        for err in &report.errors {
            let timeout_marker = if err.is_timeout { " (timeout)" } else { "" };
            println!(
                "   {} {}: {}{}",
                "•".dimmed(),
                err.source.yellow(),
                err.error.dimmed(),
                timeout_marker.dimmed()
            );
        }
    }

    println!();
    let footer = format!(
        "{} unique URLs from {} raw records",
        outcome.count,
        report.raw_count()
    );
    match report.duration_ms {
        Some(ms) => println!("{}", format!("{} in {}ms", footer, ms).dimmed()),
        None => println!("{}", footer.dimmed()),
    }
}

pub fn print_source_table(sources: &[SourceInfo]) {
    let width = terminal_width();

    println!("{}", "Available Sources".bold().cyan());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(width as u16)
        .set_header(vec!["Name", "Category", "Credentials", "Status", "Timeout"]);

    for source in sources {
        let credentials = if source.required_env.is_empty() {
            "-".to_string()
        } else {
            source.required_env.join(", ")
        };
        let status = if source.configured { "ready" } else { "missing credentials" };
        table.add_row(vec![
            source.name.clone(),
            source.category.to_string(),
            credentials,
            status.to_string(),
            format!("{}s", source.timeout_ms / 1000),
        ]);
    }

    println!("{}", table);
    println!();
    println!(
        "{} Set the listed environment variables to enable premium sources",
        "Tip:".green().bold()
    );
}
