use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "recon")]
#[command(about = "Search public OSINT sources for URLs and domains matching a keyword")]
#[command(version)]
#[command(after_help = "\x1b[1;36mQuick Start:\x1b[0m
  recon sources                           List sources and whether they are configured
  recon search example.com                Search every eligible source
  recon search acme -s crt.sh,wayback     Search selected sources only
  recon search acme --output json         Machine-readable output

\x1b[1;36mPremium sources:\x1b[0m
  CENSYS_API_ID + CENSYS_API_SECRET       Enable censys
  SHODAN_API_KEY                          Enable shodan")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search every eligible source for a keyword
    ///
    /// Sources run concurrently, each under its own timeout. Failed sources are
    /// reported alongside the merged results.
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  recon search example.com
  recon search \"acme corp\" -s urlscan,alienvault
  recon search acme --output yaml")]
    Search {
        /// Brand, domain or company name
        keyword: String,

        /// Comma-separated list of sources (default: all eligible)
        #[arg(short = 's', long = "sources")]
        sources: Option<String>,
    },

    /// List all sources with category, credentials and status
    #[command(alias = "ls")]
    Sources,
}

#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Plain text output, one URL per line
    Text,
}
