//! tls-trustcheck - TLS certificate chain trust and revocation checker
//!
//! Retrieves a server's certificate chain, validates it against a trust
//! store assembled from an embedded root, a public root program feed or a
//! local CA bundle, and checks the leaf's revocation status over OCSP.

mod commands;

use clap::Parser;
use console::style;
use tls_trustcheck::cli::{Cli, Commands};
use tls_trustcheck::config::Settings;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // A second install only fails if a provider is already set
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from_file(path)?,
        None => Settings::load_default()?,
    };

    match cli.command {
        Commands::Check(args) => {
            args.trust.apply(&mut settings);
            commands::run_check(&args.url, &settings, cli.format, cli.verbose).await
        }
        Commands::Batch(args) => {
            args.trust.apply(&mut settings);
            commands::run_batch(
                &args.file,
                args.parallel,
                args.issues_only,
                &settings,
                cli.format,
                cli.verbose,
            )
            .await
        }
    }
}
