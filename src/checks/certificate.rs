//! Certificate parsing
//!
//! Extracts the fields validation and reporting need from DER certificates
//! using x509-parser.

use crate::models::CertificateDetails;
use crate::utils::CertificateError;
use chrono::{DateTime, TimeZone, Utc};
use sha2::{Digest, Sha256};
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;

const OID_ACCESS_DESCRIPTOR_OCSP: &str = "1.3.6.1.5.5.7.48.1";

/// Certificate parser
pub struct CertificateChecker;

impl CertificateChecker {
    pub fn new() -> Self {
        Self
    }

    /// Parse a single DER-encoded certificate
    pub fn parse_certificate(&self, der: &[u8]) -> Result<CertificateDetails, CertificateError> {
        let (_, cert) = X509Certificate::from_der(der).map_err(|e| CertificateError::Parse {
            message: format!("{:?}", e),
        })?;

        let not_before = asn1_time_to_datetime(cert.validity().not_before)?;
        let not_after = asn1_time_to_datetime(cert.validity().not_after)?;

        let (dns_names, ip_addresses) = self.extract_san(&cert);
        let (public_key_algorithm, public_key_size) = self.extract_public_key_info(&cert);

        let (is_ca, path_len_constraint) = match cert.basic_constraints() {
            Ok(Some(bc)) => (bc.value.ca, bc.value.path_len_constraint),
            _ => (false, None),
        };

        let serial = cert
            .raw_serial()
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(":");

        Ok(CertificateDetails {
            subject: cert.subject().to_string(),
            subject_cn: common_name(cert.subject()),
            issuer: cert.issuer().to_string(),
            issuer_cn: common_name(cert.issuer()),
            serial,
            not_before,
            not_after,
            dns_names,
            ip_addresses,
            public_key_algorithm,
            public_key_size,
            is_ca,
            path_len_constraint,
            is_self_signed: cert.subject() == cert.issuer(),
            ocsp_responders: self.extract_ocsp_responders(&cert),
            crl_distribution_points: self.extract_crl_distribution_points(&cert),
            fingerprint_sha256: hex::encode(Sha256::digest(der)),
            raw_der: der.to_vec(),
        })
    }

    /// Parse every certificate of a chain, leaf first, keeping each
    /// certificate's outcome at its position
    pub fn parse_chain<C: AsRef<[u8]>>(
        &self,
        chain: &[C],
    ) -> Vec<Result<CertificateDetails, CertificateError>> {
        chain
            .iter()
            .map(|der| self.parse_certificate(der.as_ref()))
            .collect()
    }

    fn extract_san(&self, cert: &X509Certificate) -> (Vec<String>, Vec<String>) {
        let mut dns_names = Vec::new();
        let mut ip_addresses = Vec::new();

        if let Ok(Some(san_ext)) = cert.subject_alternative_name() {
            for name in &san_ext.value.general_names {
                match name {
                    GeneralName::DNSName(dns) => dns_names.push(dns.to_string()),
                    GeneralName::IPAddress(ip) => {
                        if ip.len() == 4 {
                            ip_addresses.push(format!("{}.{}.{}.{}", ip[0], ip[1], ip[2], ip[3]));
                        } else if ip.len() == 16 {
                            let mut octets = [0u8; 16];
                            octets.copy_from_slice(ip);
                            ip_addresses.push(std::net::Ipv6Addr::from(octets).to_string());
                        }
                    }
                    _ => {}
                }
            }
        }

        (dns_names, ip_addresses)
    }

    fn extract_public_key_info(&self, cert: &X509Certificate) -> (String, u32) {
        let pk = cert.public_key();
        let oid = pk.algorithm.algorithm.to_id_string();
        let algorithm = match oid.as_str() {
            "1.2.840.113549.1.1.1" => "RSA".to_string(),
            "1.2.840.10045.2.1" => "ECDSA".to_string(),
            "1.3.101.112" => "Ed25519".to_string(),
            "1.3.101.113" => "Ed448".to_string(),
            _ => oid,
        };

        let key_size = match pk.parsed() {
            Ok(PublicKey::RSA(rsa)) => (rsa.key_size() * 8) as u32,
            Ok(PublicKey::EC(ec)) => (ec.key_size() * 8) as u32,
            _ => 0,
        };

        (algorithm, key_size)
    }

    /// OCSP responder URLs from the Authority Information Access extension
    fn extract_ocsp_responders(&self, cert: &X509Certificate) -> Vec<String> {
        let mut urls = Vec::new();
        for ext in cert.extensions() {
            if ext.oid == x509_parser::oid_registry::OID_PKIX_AUTHORITY_INFO_ACCESS {
                if let Ok((_, aia)) =
                    x509_parser::extensions::AuthorityInfoAccess::from_der(ext.value)
                {
                    for desc in aia.accessdescs.iter() {
                        if desc.access_method.to_id_string() == OID_ACCESS_DESCRIPTOR_OCSP {
                            if let GeneralName::URI(uri) = &desc.access_location {
                                urls.push(uri.to_string());
                            }
                        }
                    }
                }
            }
        }
        urls
    }

    fn extract_crl_distribution_points(&self, cert: &X509Certificate) -> Vec<String> {
        let mut points = Vec::new();
        for ext in cert.extensions() {
            if ext.oid == x509_parser::oid_registry::OID_X509_EXT_CRL_DISTRIBUTION_POINTS {
                if let Ok((_, cdp)) =
                    x509_parser::extensions::CRLDistributionPoints::from_der(ext.value)
                {
                    for dp in cdp.iter() {
                        if let Some(x509_parser::extensions::DistributionPointName::FullName(
                            names,
                        )) = &dp.distribution_point
                        {
                            for name in names {
                                if let GeneralName::URI(uri) = name {
                                    points.push(uri.to_string());
                                }
                            }
                        }
                    }
                }
            }
        }
        points
    }
}

impl Default for CertificateChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert ASN.1 time to chrono DateTime
pub(crate) fn asn1_time_to_datetime(time: ASN1Time) -> Result<DateTime<Utc>, CertificateError> {
    Utc.timestamp_opt(time.timestamp(), 0)
        .single()
        .ok_or(CertificateError::InvalidTime)
}

fn common_name(name: &X509Name) -> Option<String> {
    name.iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(|s| s.to_string())
}
