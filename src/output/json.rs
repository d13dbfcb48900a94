//! JSON output formatter

use crate::models::{HostReport, Target};
use serde::Serialize;

/// One entry of JSON output: a report, or why the host could not be checked
#[derive(Serialize)]
pub struct JsonOutput<'a> {
    pub target: &'a Target,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<&'a HostReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Render host results as pretty JSON
pub fn to_json(results: &[JsonOutput<'_>]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}

/// Print host results as JSON to stdout
pub fn print_json(results: &[JsonOutput<'_>]) -> anyhow::Result<()> {
    println!("{}", to_json(results)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RevocationVerdict, UntrustedReason, ValidationVerdict};

    #[test]
    fn test_failure_entry_omits_report() {
        let target = Target::new("example.com", 443);
        let json = to_json(&[JsonOutput {
            target: &target,
            report: None,
            error: Some("Connection refused".to_string()),
        }])
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["target"]["host"], "example.com");
        assert_eq!(value[0]["error"], "Connection refused");
        assert!(value[0].get("report").is_none());
    }

    #[test]
    fn test_report_entry_carries_verdicts() {
        let target = Target::new("example.com", 443);
        let report = HostReport {
            target: target.clone(),
            retrieved_insecurely: true,
            certificates: Vec::new(),
            unparsed: Vec::new(),
            chain: ValidationVerdict::ChainUntrusted(
                UntrustedReason::RetrievedWithoutVerification {
                    handshake_error: "UnknownIssuer".to_string(),
                },
            ),
            revocation: Some(RevocationVerdict::Good),
        };

        let json = to_json(&[JsonOutput {
            target: &target,
            report: Some(&report),
            error: None,
        }])
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["report"]["retrieved_insecurely"], true);
        assert!(value[0].get("error").is_none());
    }
}
