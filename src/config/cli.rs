use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "mail-verify-etl")]
#[command(about = "Verify a table of email addresses and record the results in a spreadsheet")]
pub struct CliConfig {
    #[arg(long, default_value = "mail-verify.toml")]
    pub config: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Verify an uploaded file, write the results to a new sheet and delete the upload
    Run {
        /// File name inside the upload directory
        file: String,
    },
    /// Verify a stored upload without writing anywhere; the file is kept
    ReadBack {
        /// File name inside the upload directory
        file: String,
    },
    /// Show the remaining verification credits
    Credits,
}
