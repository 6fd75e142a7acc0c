use crate::cli::{Cli, OutputFormat};
use crate::commands::{create_registry, parse_source_list, CommandError, Result};
use crate::output::{format_output, print_search_report, OutputData};
use indicatif::{ProgressBar, ProgressStyle};
use recon_core::federated::normalize_keyword;
use recon_core::FederatedSearch;
use tracing::debug;

/// Run a search across every eligible source, or the `-s` subset.
pub async fn run(cli: &Cli, keyword: &str, sources: Option<&str>) -> Result<()> {
    let keyword = normalize_keyword(Some(keyword))?;
    let registry = create_registry()?;
    let names = sources.map(parse_source_list).unwrap_or_default();
    debug!(requested = ?names, "sources requested");

    // Machine-readable output stays clean on stderr too
    let spinner = if cli.output == OutputFormat::Pretty {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("Searching for '{}'...", keyword));
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        spinner
    } else {
        ProgressBar::hidden()
    };

    let task_keyword = keyword.clone();
    let result = tokio::spawn(async move {
        FederatedSearch::new(&registry)
            .search_adhoc(&task_keyword, &names)
            .await
    })
    .await;
    spinner.finish_and_clear();
    let report = result.map_err(|e| CommandError::Task(e.to_string()))??;

    let outcome = report.clone().into_outcome();

    match cli.output {
        OutputFormat::Pretty => print_search_report(&report, &outcome),
        _ => {
            let output_data = OutputData::SearchResults { keyword, outcome };
            format_output(&output_data, &cli.output)?;
        }
    }

    Ok(())
}
