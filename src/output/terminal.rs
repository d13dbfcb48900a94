//! Rich terminal output formatting

use crate::models::{
    CertificateReport, HostReport, RevocationVerdict, Target, ValidationVerdict,
};
use crate::utils::progress::{print_fail, print_info, print_pass, print_warning};
use chrono::Utc;
use console::style;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style as TabledStyle},
    Table, Tabled,
};

/// Print section header
pub fn print_header(title: &str) {
    println!();
    println!("{}", style(format!("━━━ {} ━━━", title)).cyan().bold());
    println!();
}

/// Print the full report for one host
pub fn print_host_report(report: &HostReport, verbose: bool) {
    print_header(&format!("Certificate chain for {}", report.target));

    if report.retrieved_insecurely {
        print_warning("Chain retrieved with verification disabled; it is not trusted");
    }

    print_certificate_table(&report.certificates);
    for unparsed in &report.unparsed {
        print_warning(&format!(
            "Certificate #{} could not be parsed: {}",
            unparsed.position, unparsed.error
        ));
    }

    if verbose {
        if let Some(leaf) = report.certificates.first() {
            print_leaf_details(leaf);
        }
    }

    println!();
    match &report.chain {
        ValidationVerdict::ChainValid => print_pass("Chain of trust: valid"),
        other => print_fail(&format!("Chain of trust: {}", other)),
    }

    match &report.revocation {
        Some(RevocationVerdict::Good) => print_pass("Revocation (OCSP): not revoked"),
        Some(verdict @ RevocationVerdict::Revoked { .. }) => {
            print_fail(&format!("Revocation (OCSP): {}", verdict))
        }
        Some(RevocationVerdict::Unknown) => {
            print_warning("Revocation (OCSP): responder does not know this certificate")
        }
        Some(RevocationVerdict::CheckFailed { reason }) => {
            print_warning(&format!("Revocation (OCSP): check failed ({})", reason))
        }
        None => print_info("Revocation (OCSP): skipped"),
    }
}

fn print_certificate_table(certificates: &[CertificateReport]) {
    #[derive(Tabled)]
    struct CertRow {
        #[tabled(rename = "#")]
        position: String,
        #[tabled(rename = "Subject")]
        subject: String,
        #[tabled(rename = "Issuer")]
        issuer: String,
        #[tabled(rename = "Expires")]
        expires: String,
        #[tabled(rename = "Validity")]
        validity: String,
    }

    let now = Utc::now();
    let rows: Vec<CertRow> = certificates
        .iter()
        .enumerate()
        .map(|(i, cert)| CertRow {
            position: if i == 0 {
                "leaf".to_string()
            } else {
                i.to_string()
            },
            subject: cert.details.display_name().to_string(),
            issuer: cert
                .details
                .issuer_cn
                .clone()
                .unwrap_or_else(|| cert.details.issuer.clone()),
            expires: format_expiry_days(cert.details.days_until_expiry(now)),
            validity: format_validity(&cert.validity),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(TabledStyle::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    for line in table.to_string().lines() {
        println!("  {}", line);
    }
}

fn print_leaf_details(leaf: &CertificateReport) {
    let details = &leaf.details;
    println!();
    println!("{}", style("Leaf certificate:").bold());
    println!("  Subject:     {}", details.subject);
    println!("  Issuer:      {}", details.issuer);
    println!("  Serial:      {}", details.serial);
    println!(
        "  Valid:       {} to {}",
        details.not_before.format("%Y-%m-%d %H:%M:%S UTC"),
        details.not_after.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  Key:         {} ({} bits)",
        details.public_key_algorithm, details.public_key_size
    );
    println!("  SHA-256:     {}", format_fingerprint(&details.fingerprint_sha256));

    for name in &details.dns_names {
        println!("  {} {}", style("•").cyan(), name);
    }
    for responder in &details.ocsp_responders {
        println!("  OCSP:        {}", responder);
    }
    for point in &details.crl_distribution_points {
        println!("  CRL:         {}", point);
    }
}

fn format_validity(verdict: &ValidationVerdict) -> String {
    match verdict {
        ValidationVerdict::Valid => style("✓ Valid").green().to_string(),
        ValidationVerdict::Expired => style("✗ Expired").red().to_string(),
        ValidationVerdict::NotYetValid => style("✗ Not Yet Valid").red().to_string(),
        other => other.to_string(),
    }
}

fn format_expiry_days(days: i64) -> String {
    if days < 0 {
        style(format!("Expired {} days ago", days.abs()))
            .red()
            .to_string()
    } else if days <= 30 {
        style(format!("{} days", days)).yellow().to_string()
    } else {
        style(format!("{} days", days)).green().to_string()
    }
}

fn format_fingerprint(fingerprint: &str) -> String {
    fingerprint
        .as_bytes()
        .chunks(2)
        .map(|c| String::from_utf8_lossy(c).to_uppercase())
        .collect::<Vec<_>>()
        .join(":")
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a host that could not be checked at all
pub fn print_host_failure(target: &Target, error: &str) {
    print_fail(&format!("{}: {}", target, error));
}

/// Print batch check summary
pub fn print_batch_summary(total: usize, healthy: usize, with_issues: usize, failed: usize) {
    print_header("Batch Check Summary");

    println!("  Total hosts checked: {}", style(total).bold());
    println!("  Healthy: {}", style(healthy).green());
    println!("  With issues: {}", style(with_issues).yellow());
    println!("  Could not be checked: {}", style(failed).red());
}
