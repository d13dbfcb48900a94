//! Check command implementation

use std::sync::Arc;
use tls_trustcheck::cli::OutputFormat;
use tls_trustcheck::config::Settings;
use tls_trustcheck::models::Target;
use tls_trustcheck::output::{print_host_report, print_json, JsonOutput};
use tls_trustcheck::runner::{build_trust_store, CheckEvent, HostChecker};
use tls_trustcheck::utils::create_spinner;

/// Run the check command for a single target
pub async fn run_check(
    url: &str,
    settings: &Settings,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let target = Target::parse(url)?;

    let spinner = (format == OutputFormat::Table).then(|| create_spinner("Assembling trust anchors..."));
    let store = build_trust_store(settings).await?;
    tracing::info!("Trusting {} anchors", store.len());

    let checker = HostChecker::new(settings, Arc::new(store))?;
    let on_event = |event: CheckEvent<'_>| {
        if let Some(spinner) = &spinner {
            match event {
                CheckEvent::RetrieveStarted { target } => {
                    spinner.set_message(format!("Retrieving chain from {}...", target))
                }
                CheckEvent::RevocationStarted { .. } => {
                    spinner.set_message("Checking OCSP status...")
                }
                _ => {}
            }
        }
    };

    let result = checker.check_host(&target, &on_event).await;
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }
    let report = result?;

    match format {
        OutputFormat::Table => print_host_report(&report, verbose),
        OutputFormat::Json => print_json(&[JsonOutput {
            target: &target,
            report: Some(&report),
            error: None,
        }])?,
    }

    Ok(())
}
