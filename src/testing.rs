//! Test PKI helpers shared by the unit tests

use crate::checks::der::{
    self, context, context_primitive, TAG_BIT_STRING, TAG_ENUMERATED, TAG_GENERALIZED_TIME,
    TAG_INTEGER, TAG_NULL, TAG_OCTET_STRING, TAG_OID,
};
use crate::checks::ocsp::HashAlgorithm;
use chrono::{DateTime, Duration, Utc};
use rcgen::{
    BasicConstraints, CertificateParams, CustomExtension, DistinguishedName, DnType,
    ExtendedKeyUsagePurpose, IsCa, KeyPair, SerialNumber,
};
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU8, Ordering};
use x509_parser::prelude::*;

static NEXT_SERIAL: AtomicU8 = AtomicU8::new(1);

const OID_AIA: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 1, 1];
const OID_AD_OCSP: &[u8] = &[0x2b, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, 0x01];
const OID_OCSP_BASIC: &[u8] = &[0x2b, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, 0x01, 0x01];
const OID_ECDSA_SHA256: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x04, 0x03, 0x02];
const OID_SHA1: &[u8] = &[0x2b, 0x0e, 0x03, 0x02, 0x1a];
const OID_SHA256: &[u8] = &[0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01];

fn distinguished_name(common_name: &str) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    dn
}

fn next_serial() -> SerialNumber {
    let n = NEXT_SERIAL.fetch_add(1, Ordering::Relaxed);
    // Alternate the high bit so sign padding is exercised
    SerialNumber::from_slice(&[n | if n % 2 == 0 { 0x80 } else { 0x00 }, 0x42, n])
}

/// AuthorityInfoAccess extension value naming one OCSP responder
fn aia_extension(url: &str) -> CustomExtension {
    let access_description = der::sequence(
        &[der::tlv(TAG_OID, OID_AD_OCSP), der::tlv(0x86, url.as_bytes())].concat(),
    );
    CustomExtension::from_oid_content(OID_AIA, der::sequence(&access_description))
}

/// A self-signed certificate authority
pub struct TestCa {
    pub der: Vec<u8>,
    cert: rcgen::Certificate,
    key: KeyPair,
}

/// A certificate issued by a [`TestCa`]
pub struct TestCert {
    pub der: Vec<u8>,
    key: KeyPair,
}

impl TestCa {
    pub fn new(common_name: &str) -> Self {
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::default();
        params.distinguished_name = distinguished_name(common_name);
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.serial_number = Some(next_serial());
        let cert = params.self_signed(&key).unwrap();
        Self {
            der: cert.der().to_vec(),
            cert,
            key,
        }
    }

    /// Issue a server certificate for `dns_name`
    pub fn leaf(&self, dns_name: &str, ocsp_url: Option<&str>) -> TestCert {
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(vec![dns_name.to_string()]).unwrap();
        params.distinguished_name = distinguished_name(dns_name);
        params.serial_number = Some(next_serial());
        params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
        if let Some(url) = ocsp_url {
            params.custom_extensions.push(aia_extension(url));
        }
        let cert = params.signed_by(&key, &self.cert, &self.key).unwrap();
        TestCert {
            der: cert.der().to_vec(),
            key,
        }
    }

    /// Issue a delegated OCSP responder certificate, with the OCSP signing
    /// usage only when `ocsp_signing` is set
    pub fn responder(&self, common_name: &str, ocsp_signing: bool) -> TestCert {
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::default();
        params.distinguished_name = distinguished_name(common_name);
        params.serial_number = Some(next_serial());
        params.extended_key_usages = if ocsp_signing {
            vec![ExtendedKeyUsagePurpose::OcspSigning]
        } else {
            vec![ExtendedKeyUsagePurpose::ServerAuth]
        };
        let cert = params.signed_by(&key, &self.cert, &self.key).unwrap();
        TestCert {
            der: cert.der().to_vec(),
            key,
        }
    }
}

fn sign(key: &KeyPair, message: &[u8]) -> Vec<u8> {
    let rng = SystemRandom::new();
    let signer =
        EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &key.serialize_der(), &rng)
            .unwrap();
    signer.sign(&rng, message).unwrap().as_ref().to_vec()
}

/// Status to place in a generated OCSP response
pub enum OcspStatus {
    Good,
    Revoked {
        at: DateTime<Utc>,
        reason: Option<u8>,
    },
    Unknown,
}

fn generalized_time(time: DateTime<Utc>) -> Vec<u8> {
    der::tlv(
        TAG_GENERALIZED_TIME,
        time.format("%Y%m%d%H%M%SZ").to_string().as_bytes(),
    )
}

/// A successful OCSP response about `leaf`, signed directly by `ca`
pub fn ocsp_response(
    ca: &TestCa,
    leaf: &TestCert,
    status: OcspStatus,
    hash: HashAlgorithm,
) -> Vec<u8> {
    build_response(ca, leaf, status, hash, &ca.der, &ca.key, false)
}

/// A successful OCSP response about `leaf` issued by `ca`, signed by
/// `responder` and carrying its certificate
pub fn delegated_ocsp_response(
    ca: &TestCa,
    leaf: &TestCert,
    responder: &TestCert,
    status: OcspStatus,
) -> Vec<u8> {
    build_response(
        ca,
        leaf,
        status,
        HashAlgorithm::Sha256,
        &responder.der,
        &responder.key,
        true,
    )
}

fn build_response(
    ca: &TestCa,
    leaf: &TestCert,
    status: OcspStatus,
    hash: HashAlgorithm,
    signer_der: &[u8],
    signer_key: &KeyPair,
    include_signer: bool,
) -> Vec<u8> {
    let (_, parsed_ca) = X509Certificate::from_der(&ca.der).unwrap();
    let (_, parsed_signer) = X509Certificate::from_der(signer_der).unwrap();
    let (_, parsed_leaf) = X509Certificate::from_der(&leaf.der).unwrap();
    let digest = |data: &[u8]| match hash {
        HashAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
        HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
    };
    let hash_oid = match hash {
        HashAlgorithm::Sha1 => OID_SHA1,
        HashAlgorithm::Sha256 => OID_SHA256,
    };

    let cert_id = der::sequence(
        &[
            der::sequence(&[der::tlv(TAG_OID, hash_oid), der::tlv(TAG_NULL, &[])].concat()),
            der::tlv(TAG_OCTET_STRING, &digest(parsed_ca.subject().as_raw())),
            der::tlv(
                TAG_OCTET_STRING,
                &digest(&parsed_ca.public_key().subject_public_key.data),
            ),
            der::tlv(TAG_INTEGER, parsed_leaf.raw_serial()),
        ]
        .concat(),
    );

    let cert_status = match status {
        OcspStatus::Good => der::tlv(context_primitive(0), &[]),
        OcspStatus::Revoked { at, reason } => {
            let mut info = generalized_time(at);
            if let Some(reason) = reason {
                info.extend(der::tlv(context(0), &der::tlv(TAG_ENUMERATED, &[reason])));
            }
            der::tlv(context(1), &info)
        }
        OcspStatus::Unknown => der::tlv(context_primitive(2), &[]),
    };

    let now = Utc::now();
    let single_response = der::sequence(
        &[
            cert_id,
            cert_status,
            generalized_time(now - Duration::hours(1)),
            der::tlv(context(0), &generalized_time(now + Duration::days(7))),
        ]
        .concat(),
    );

    let key_hash = Sha1::digest(&parsed_signer.public_key().subject_public_key.data);
    let tbs_response_data = der::sequence(
        &[
            der::tlv(context(2), &der::tlv(TAG_OCTET_STRING, &key_hash)),
            generalized_time(now),
            der::sequence(&single_response),
        ]
        .concat(),
    );

    let signature = sign(signer_key, &tbs_response_data);
    let mut signature_bits = vec![0];
    signature_bits.extend(signature);

    let mut basic_fields = [
        tbs_response_data,
        der::sequence(&der::tlv(TAG_OID, OID_ECDSA_SHA256)),
        der::tlv(TAG_BIT_STRING, &signature_bits),
    ]
    .concat();
    if include_signer {
        basic_fields.extend(der::tlv(context(0), &der::sequence(signer_der)));
    }
    let basic = der::sequence(&basic_fields);

    let response_bytes = der::sequence(
        &[
            der::tlv(TAG_OID, OID_OCSP_BASIC),
            der::tlv(TAG_OCTET_STRING, &basic),
        ]
        .concat(),
    );

    der::sequence(
        &[
            der::tlv(TAG_ENUMERATED, &[0]),
            der::tlv(context(0), &response_bytes),
        ]
        .concat(),
    )
}
