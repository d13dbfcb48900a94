//! Check orchestration engine
//!
//! Wires the components together for a run: assemble the trust store once,
//! then for each target retrieve the chain, validate it, and check the
//! leaf's revocation status. Progress is reported through [`CheckEvent`]s so
//! any frontend can drive it.

use crate::checks::{CertificateChecker, ChainRetriever, ChainValidator, OcspChecker};
use crate::config::Settings;
use crate::models::{
    CertificateChain, CertificateDetails, CertificateReport, HostReport, RetrievedChain,
    RevocationVerdict, Target, UnparsedCertificate, UntrustedReason, ValidationVerdict,
};
use crate::trust::TrustAnchorStore;
use crate::utils::{OcspError, Result, StoreError};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Events emitted during check execution
pub enum CheckEvent<'a> {
    RetrieveStarted { target: &'a Target },
    ChainRetrieved { target: &'a Target, certificates: usize, insecure: bool },
    RevocationStarted { target: &'a Target },
    RevocationComplete { target: &'a Target, verdict: &'a RevocationVerdict },
    HostComplete { target: &'a Target, healthy: bool },
    HostFailed { target: &'a Target, error: String },
}

/// Assemble the trust store the settings select
pub async fn build_trust_store(settings: &Settings) -> std::result::Result<TrustAnchorStore, StoreError> {
    TrustAnchorStore::from_sources(
        &settings.trust.anchor_sources(),
        settings.network.feed_timeout(),
    )
    .await
}

/// Runs the per-host checks against one shared, read-only trust store
pub struct HostChecker {
    store: Arc<TrustAnchorStore>,
    retriever: ChainRetriever,
    validator: ChainValidator,
    ocsp: Option<OcspChecker>,
    allow_insecure_fallback: bool,
}

impl HostChecker {
    pub fn new(settings: &Settings, store: Arc<TrustAnchorStore>) -> Result<Self> {
        let ocsp = if settings.checks.check_revocation {
            Some(OcspChecker::new(settings.network.ocsp_timeout())?)
        } else {
            None
        };

        Ok(Self {
            store,
            retriever: ChainRetriever::new(
                settings.network.connect_timeout(),
                settings.network.handshake_timeout(),
            ),
            validator: ChainValidator::new(),
            ocsp,
            allow_insecure_fallback: settings.trust.allow_insecure_fallback,
        })
    }

    /// Check a single host.
    ///
    /// Only retrieval failures are errors; every verdict, including an
    /// unparsable certificate, an untrusted chain or a failed revocation
    /// check, is part of the returned report.
    pub async fn check_host(
        &self,
        target: &Target,
        on_event: &dyn Fn(CheckEvent<'_>),
    ) -> Result<HostReport> {
        on_event(CheckEvent::RetrieveStarted { target });
        let retrieved = self
            .retriever
            .fetch(target, &self.store, self.allow_insecure_fallback)
            .await?;
        on_event(CheckEvent::ChainRetrieved {
            target,
            certificates: retrieved.chain.len(),
            insecure: retrieved.retrieved_insecurely(),
        });

        let now = Utc::now();
        let (details, unparsed) = parse_presented(&retrieved.chain);
        let certificates: Vec<CertificateReport> = details
            .iter()
            .flatten()
            .map(|cert| CertificateReport {
                details: cert.clone(),
                validity: self.validator.check_validity(cert, now),
            })
            .collect();

        let chain = self.chain_verdict(&retrieved, now);

        let revocation = match &self.ocsp {
            Some(ocsp) => {
                on_event(CheckEvent::RevocationStarted { target });
                let verdict = self.revocation_verdict(ocsp, &retrieved, &details).await;
                on_event(CheckEvent::RevocationComplete {
                    target,
                    verdict: &verdict,
                });
                Some(verdict)
            }
            None => None,
        };

        let report = HostReport {
            target: target.clone(),
            retrieved_insecurely: retrieved.retrieved_insecurely(),
            certificates,
            unparsed,
            chain,
            revocation,
        };
        on_event(CheckEvent::HostComplete {
            target,
            healthy: report.is_healthy(),
        });
        Ok(report)
    }

    fn chain_verdict(&self, retrieved: &RetrievedChain, now: chrono::DateTime<Utc>) -> ValidationVerdict {
        if let Some(handshake_error) = &retrieved.insecure_reason {
            return ValidationVerdict::ChainUntrusted(UntrustedReason::RetrievedWithoutVerification {
                handshake_error: handshake_error.clone(),
            });
        }

        match retrieved.chain.leaf() {
            Some(leaf) => self.validator.verify_chain(
                leaf,
                retrieved.chain.intermediates(),
                &self.store,
                &retrieved.target.host,
                now,
            ),
            None => ValidationVerdict::ChainUntrusted(UntrustedReason::NoPathFound),
        }
    }

    async fn revocation_verdict(
        &self,
        ocsp: &OcspChecker,
        retrieved: &RetrievedChain,
        details: &[Option<CertificateDetails>],
    ) -> RevocationVerdict {
        let (leaf, leaf_details) = match (retrieved.chain.leaf(), details.first()) {
            (Some(leaf), Some(Some(leaf_details))) => (leaf, leaf_details),
            (Some(_), Some(None)) => {
                return RevocationVerdict::CheckFailed {
                    reason: "leaf certificate could not be parsed".to_string(),
                }
            }
            _ => {
                return RevocationVerdict::CheckFailed {
                    reason: "no leaf certificate".to_string(),
                }
            }
        };

        // The presented issuer if it names the leaf's issuer, otherwise an
        // anchor with that subject.
        let presented = retrieved
            .chain
            .leaf_issuer()
            .zip(details.get(1).and_then(Option::as_ref))
            .filter(|(_, issuer)| issuer.subject == leaf_details.issuer)
            .map(|(der, _)| der.as_ref());
        let issuer = presented.or_else(|| {
            self.store
                .find_issuer(leaf.as_ref())
                .map(|anchor| anchor.der().as_ref())
        });

        let Some(issuer) = issuer else {
            tracing::warn!(
                "No issuer certificate for {}; skipping OCSP",
                leaf_details.display_name()
            );
            return RevocationVerdict::CheckFailed {
                reason: "issuer certificate not available".to_string(),
            };
        };

        match ocsp.check_ocsp(leaf.as_ref(), issuer).await {
            Ok(verdict) => verdict,
            Err(e @ OcspError::NoResponder) => {
                tracing::info!("{} has no OCSP responder", leaf_details.display_name());
                RevocationVerdict::CheckFailed {
                    reason: e.to_string(),
                }
            }
            Err(e) => RevocationVerdict::CheckFailed {
                reason: e.to_string(),
            },
        }
    }
}

/// Parse the presented certificates, keeping positions aligned with the
/// chain. A certificate that fails to parse leaves `None` in its slot.
fn parse_presented(
    chain: &CertificateChain,
) -> (Vec<Option<CertificateDetails>>, Vec<UnparsedCertificate>) {
    let mut details = Vec::with_capacity(chain.len());
    let mut unparsed = Vec::new();

    let parsed = CertificateChecker::new().parse_chain(chain.certificates());
    for (position, result) in parsed.into_iter().enumerate() {
        match result {
            Ok(cert) => details.push(Some(cert)),
            Err(e) => {
                tracing::warn!("Certificate #{} could not be parsed: {}", position, e);
                unparsed.push(UnparsedCertificate {
                    position,
                    error: e.to_string(),
                });
                details.push(None);
            }
        }
    }

    (details, unparsed)
}

/// Check many hosts concurrently, at most `parallelism` at a time.
///
/// Results come back in completion order; a failing host does not stop
/// the others.
pub async fn check_hosts(
    checker: &HostChecker,
    targets: Vec<Target>,
    parallelism: usize,
    on_event: &dyn Fn(CheckEvent<'_>),
) -> Vec<(Target, Result<HostReport>)> {
    stream::iter(targets)
        .map(|target| async move {
            let result = checker.check_host(&target, on_event).await;
            if let Err(e) = &result {
                on_event(CheckEvent::HostFailed {
                    target: &target,
                    error: e.to_string(),
                });
            }
            (target, result)
        })
        .buffer_unordered(parallelism.max(1))
        .collect()
        .await
}
