//! Certificate validity and chain-of-trust verification
//!
//! Validity is a plain comparison against the certificate's window. Chain
//! verification builds a path from the leaf through the presented
//! intermediates to an anchor in the store with `rustls-webpki`, adding the
//! checks webpki leaves to the caller: anchor expiry and the anchor's own
//! path-length constraint.

use crate::models::{CertificateDetails, UntrustedReason, ValidationVerdict};
use crate::trust::{TrustAnchor, TrustAnchorStore};
use chrono::{DateTime, Utc};
use rustls::pki_types::{
    self, CertificateDer, ServerName, SignatureVerificationAlgorithm, UnixTime,
};
use std::time::Duration;

/// Checks validity windows and verifies chains against a trust store
pub struct ChainValidator {
    algorithms: &'static [&'static dyn SignatureVerificationAlgorithm],
}

impl Default for ChainValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainValidator {
    pub fn new() -> Self {
        Self {
            algorithms: rustls::crypto::ring::default_provider()
                .signature_verification_algorithms
                .all,
        }
    }

    /// Compare `now` with the certificate's validity window.
    ///
    /// A window that is both not yet open and already closed reports
    /// `Expired`.
    pub fn check_validity(&self, cert: &CertificateDetails, now: DateTime<Utc>) -> ValidationVerdict {
        if now > cert.not_after {
            ValidationVerdict::Expired
        } else if now < cert.not_before {
            ValidationVerdict::NotYetValid
        } else {
            ValidationVerdict::Valid
        }
    }

    /// Verify that `leaf` chains to an anchor in `store` through
    /// `intermediates` and is valid for `hostname` at `now`.
    pub fn verify_chain(
        &self,
        leaf: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        store: &TrustAnchorStore,
        hostname: &str,
        now: DateTime<Utc>,
    ) -> ValidationVerdict {
        let end_entity = match webpki::EndEntityCert::try_from(leaf) {
            Ok(cert) => cert,
            Err(e) => {
                return ValidationVerdict::ChainUntrusted(UntrustedReason::Malformed {
                    message: format!("{:?}", e),
                })
            }
        };

        let server_name = match ServerName::try_from(hostname) {
            Ok(name) => name,
            Err(_) => {
                return ValidationVerdict::ChainUntrusted(UntrustedReason::HostnameMismatch {
                    hostname: hostname.to_string(),
                })
            }
        };

        let time = UnixTime::since_unix_epoch(Duration::from_secs(now.timestamp().max(0) as u64));
        let (current, expired): (Vec<&TrustAnchor>, Vec<&TrustAnchor>) = store
            .anchors()
            .iter()
            .partition(|anchor| anchor.details().not_after >= now);

        let result = self.build_path(&end_entity, intermediates, &current, time);
        if let Err(webpki::Error::UnknownIssuer) = result {
            if let Some(anchor) = self.anchor_for_path(&end_entity, intermediates, &expired, time) {
                return ValidationVerdict::ChainUntrusted(UntrustedReason::ExpiredAnchor {
                    anchor: anchor.details().display_name().to_string(),
                });
            }
        }
        if let Err(e) = result {
            tracing::debug!("No trusted path for {}: {:?}", hostname, e);
            return ValidationVerdict::ChainUntrusted(untrusted_reason(e, hostname));
        }

        match end_entity.verify_is_valid_for_subject_name(&server_name) {
            Ok(()) => ValidationVerdict::ChainValid,
            Err(e) => ValidationVerdict::ChainUntrusted(untrusted_reason(e, hostname)),
        }
    }

    fn build_path(
        &self,
        end_entity: &webpki::EndEntityCert<'_>,
        intermediates: &[CertificateDer<'_>],
        anchors: &[&TrustAnchor],
        time: UnixTime,
    ) -> Result<(), webpki::Error> {
        let trust_anchors: Vec<pki_types::TrustAnchor<'_>> =
            anchors.iter().map(|a| a.trust_anchor().clone()).collect();

        // webpki enforces intermediate path lengths but not the anchor's own
        // constraint. Rejecting a candidate here makes webpki try the next one.
        let anchor_path_len: &dyn Fn(&webpki::VerifiedPath<'_>) -> Result<(), webpki::Error> =
            &|path| {
                let used = path.anchor();
                let limit = anchors
                    .iter()
                    .find(|a| {
                        let candidate = a.trust_anchor();
                        candidate.subject_public_key_info == used.subject_public_key_info
                            && candidate.subject == used.subject
                    })
                    .and_then(|a| a.details().path_len_constraint);
                let depth = path.intermediate_certificates().count();

                match limit {
                    Some(limit) if depth > limit as usize => {
                        Err(webpki::Error::PathLenConstraintViolated)
                    }
                    _ => Ok(()),
                }
            };

        end_entity
            .verify_for_usage(
                self.algorithms,
                &trust_anchors,
                intermediates,
                time,
                webpki::KeyUsage::server_auth(),
                None,
                Some(anchor_path_len),
            )
            .map(|_| ())
    }

    /// The expired anchor a path would have reached, if any
    fn anchor_for_path<'s>(
        &self,
        end_entity: &webpki::EndEntityCert<'_>,
        intermediates: &[CertificateDer<'_>],
        expired: &[&'s TrustAnchor],
        time: UnixTime,
    ) -> Option<&'s TrustAnchor> {
        expired
            .iter()
            .find(|anchor| {
                self.build_path(end_entity, intermediates, &[**anchor], time)
                    .is_ok()
            })
            .copied()
    }
}

fn untrusted_reason(error: webpki::Error, hostname: &str) -> UntrustedReason {
    use webpki::Error;

    match error {
        Error::UnknownIssuer { .. } => UntrustedReason::NoPathFound,
        Error::CertNotValidForName { .. } => UntrustedReason::HostnameMismatch {
            hostname: hostname.to_string(),
        },
        Error::PathLenConstraintViolated { .. } => UntrustedReason::PathLengthExceeded,
        Error::CertExpired { .. } => UntrustedReason::CertificateExpired,
        Error::CertNotValidYet { .. } => UntrustedReason::CertificateNotYetValid,
        Error::CaUsedAsEndEntity { .. } | Error::EndEntityUsedAsCa { .. } => {
            UntrustedReason::InvalidBasicConstraints
        }
        Error::InvalidSignatureForPublicKey { .. } => UntrustedReason::BadSignature,
        Error::BadDer { .. } | Error::BadDerTime { .. } => UntrustedReason::Malformed {
            message: format!("{:?}", error),
        },
        other => UntrustedReason::Other {
            message: format!("{:?}", other),
        },
    }
}
