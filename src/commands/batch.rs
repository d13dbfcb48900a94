//! Batch check command implementation

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tls_trustcheck::cli::OutputFormat;
use tls_trustcheck::config::Settings;
use tls_trustcheck::models::Target;
use tls_trustcheck::output::{
    print_batch_summary, print_error, print_host_failure, print_host_report, print_json,
    JsonOutput,
};
use tls_trustcheck::runner::{build_trust_store, check_hosts, CheckEvent, HostChecker};
use tls_trustcheck::utils::create_progress_bar;

/// Read targets from a file, one per line; blank lines and `#` comments
/// are ignored and unparseable lines are reported and skipped.
pub fn read_targets(content: &str) -> Vec<Target> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match Target::parse(line) {
            Ok(target) => Some(target),
            Err(e) => {
                print_error(&e.to_string());
                None
            }
        })
        .collect()
}

/// Run the batch check command
pub async fn run_batch(
    file: &Path,
    parallel: Option<usize>,
    issues_only: bool,
    settings: &Settings,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let targets = read_targets(&content);
    if targets.is_empty() {
        anyhow::bail!("No targets found in {}", file.display());
    }

    let store = build_trust_store(settings).await?;
    let checker = HostChecker::new(settings, Arc::new(store))?;

    let progress = (format == OutputFormat::Table)
        .then(|| create_progress_bar(targets.len() as u64, "Checking hosts"));
    let on_event = |event: CheckEvent<'_>| {
        if let Some(progress) = &progress {
            match event {
                CheckEvent::HostComplete { .. } | CheckEvent::HostFailed { .. } => progress.inc(1),
                _ => {}
            }
        }
    };

    let parallelism = parallel.unwrap_or(settings.checks.parallelism);
    let results = check_hosts(&checker, targets, parallelism, &on_event).await;
    if let Some(progress) = &progress {
        progress.finish_and_clear();
    }

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    let healthy = results
        .iter()
        .filter(|(_, r)| matches!(r, Ok(report) if report.is_healthy()))
        .count();

    match format {
        OutputFormat::Json => {
            let entries: Vec<JsonOutput<'_>> = results
                .iter()
                .filter(|(_, r)| !issues_only || !matches!(r, Ok(report) if report.is_healthy()))
                .map(|(target, result)| JsonOutput {
                    target,
                    report: result.as_ref().ok(),
                    error: result.as_ref().err().map(|e| e.to_string()),
                })
                .collect();
            print_json(&entries)?;
        }
        OutputFormat::Table => {
            for (target, result) in &results {
                match result {
                    Ok(report) if issues_only && report.is_healthy() => {}
                    Ok(report) => print_host_report(report, verbose),
                    Err(e) => print_host_failure(target, &e.to_string()),
                }
            }
            print_batch_summary(results.len(), healthy, results.len() - healthy - failed, failed);
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} hosts could not be checked", failed, results.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_targets_skips_comments_and_blanks() {
        let targets = read_targets("# hosts\nexample.com\n\n  https://example.org:8443/  \n");
        assert_eq!(
            targets,
            vec![
                Target::new("example.com", 443),
                Target::new("example.org", 8443)
            ]
        );
    }

    #[test]
    fn test_read_targets_drops_invalid_lines() {
        let targets = read_targets("http://plain.example.com\nexample.com");
        assert_eq!(targets, vec![Target::new("example.com", 443)]);
    }
}
