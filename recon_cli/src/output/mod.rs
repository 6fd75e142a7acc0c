use crate::cli::OutputFormat;
use crate::commands::Result;
use recon_core::{SearchOutcome, SourceInfo};
use serde::Serialize;

mod pretty;
pub use pretty::{print_search_report, print_source_table};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OutputData {
    SourceList(Vec<SourceInfo>),
    SearchResults {
        keyword: String,
        outcome: SearchOutcome,
    },
}

/// Machine-readable output. Pretty output is rendered by the commands
/// themselves, which have the full per-source report.
pub fn format_output(data: &OutputData, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(data)?);
        }
        OutputFormat::Text | OutputFormat::Pretty => {
            print!("{}", format_text(data));
        }
    }
    Ok(())
}

fn format_text(data: &OutputData) -> String {
    let mut out = String::new();
    match data {
        OutputData::SourceList(sources) => {
            for source in sources {
                let status = if source.configured { "configured" } else { "unconfigured" };
                out.push_str(&format!("{}\t{}\t{}\n", source.name, source.category, status));
            }
        }
        OutputData::SearchResults { outcome, .. } => {
            for record in &outcome.results {
                out.push_str(&record.url);
                out.push('\n');
            }
            for error in outcome.errors.iter().flatten() {
                out.push_str(&format!("# error: {}\n", error));
            }
        }
    }
    out
}

/// Get the terminal width, defaulting to 80 if detection fails
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Truncate text to max length, adding ellipsis if needed
pub fn truncate_text(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    } else {
        s.chars().take(max_len).collect()
    }
}
