use crate::cli::{Cli, OutputFormat};
use crate::commands::{create_registry, Result};
use crate::output::{format_output, print_source_table, OutputData};

pub fn run(cli: &Cli) -> Result<()> {
    let registry = create_registry()?;
    let sources = registry.list();

    match cli.output {
        OutputFormat::Pretty => print_source_table(&sources),
        _ => format_output(&OutputData::SourceList(sources), &cli.output)?,
    }

    Ok(())
}
