//! CLI argument definitions using clap

use crate::config::Settings;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tls-trustcheck")]
#[command(version)]
#[command(about = "Validate a server's TLS certificate chain and check OCSP revocation", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Settings file (default: config/default.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check the certificate chain of one host
    Check(CheckArgs),

    /// Check multiple hosts from a file
    Batch(BatchArgs),
}

#[derive(Args)]
pub struct CheckArgs {
    /// URL or host[:port] to check
    #[arg(required = true, value_name = "URL")]
    pub url: String,

    #[command(flatten)]
    pub trust: TrustArgs,
}

#[derive(Args)]
pub struct BatchArgs {
    /// File containing targets (one per line, # starts a comment)
    #[arg(required = true)]
    pub file: PathBuf,

    /// Number of parallel checks
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Only show hosts with issues
    #[arg(long)]
    pub issues_only: bool,

    #[command(flatten)]
    pub trust: TrustArgs,
}

/// Options shared by every check command
#[derive(Args, Clone, Default)]
pub struct TrustArgs {
    /// PEM bundle to trust instead of the built-in anchor and feed
    #[arg(long, value_name = "FILE")]
    pub ca: Option<PathBuf>,

    /// Retry without verification when the handshake fails, to inspect the chain
    #[arg(long, env = "TRUSTCHECK_INSECURE")]
    pub insecure: bool,

    /// Do not download the public root program feed
    #[arg(long)]
    pub no_feed: bool,

    /// Skip OCSP checking
    #[arg(long)]
    pub skip_ocsp: bool,

    /// Connection and handshake timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

impl TrustArgs {
    /// Override file settings with the flags that were given
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(ca) = &self.ca {
            settings.trust.ca_file = Some(ca.clone());
        }
        if self.insecure {
            settings.trust.allow_insecure_fallback = true;
        }
        if self.no_feed {
            settings.trust.use_feed = false;
        }
        if self.skip_ocsp {
            settings.checks.check_revocation = false;
        }
        if let Some(timeout) = self.timeout {
            settings.network.connect_timeout_secs = timeout;
            settings.network.handshake_timeout_secs = timeout;
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}
