//! OCSP revocation checking
//!
//! Builds an RFC 6960 request for a (leaf, issuer) pair, POSTs it to the
//! leaf's responder, and maps the signed answer to a [`RevocationVerdict`].
//! A response only counts if its signature verifies and one of its
//! `SingleResponse`s names exactly the certificate that was asked about.

use crate::checks::certificate::CertificateChecker;
use crate::checks::der::{self, trim_leading_zeros, TAG_NULL, TAG_OCTET_STRING, TAG_OID};
use crate::models::RevocationVerdict;
use crate::utils::OcspError;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HOST};
use reqwest::Url;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::time::Duration;
use x509_parser::der_parser::asn1_rs::{Class, Length, Tag};
use x509_parser::der_parser::ber::{BerObject, BerObjectContent};
use x509_parser::der_parser::der::der_read_element_header;
use x509_parser::der_parser::parse_der;
use x509_parser::prelude::*;

/// id-sha1 (1.3.14.3.2.26)
const OID_SHA1: &[u8] = &[0x2b, 0x0e, 0x03, 0x02, 0x1a];
/// id-sha256 (2.16.840.1.101.3.4.2.1)
const OID_SHA256: &[u8] = &[0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01];
/// id-pkix-ocsp-basic (1.3.6.1.5.5.7.48.1.1)
const OID_OCSP_BASIC: &[u8] = &[0x2b, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, 0x01, 0x01];

const OCSP_REQUEST_CONTENT_TYPE: &str = "application/ocsp-request";
const OCSP_RESPONSE_CONTENT_TYPE: &str = "application/ocsp-response";

/// Hash algorithm used in a CertID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    fn oid(self) -> &'static [u8] {
        match self {
            HashAlgorithm::Sha1 => OID_SHA1,
            HashAlgorithm::Sha256 => OID_SHA256,
        }
    }

    fn from_oid(oid: &[u8]) -> Option<Self> {
        match oid {
            OID_SHA1 => Some(HashAlgorithm::Sha1),
            OID_SHA256 => Some(HashAlgorithm::Sha256),
            _ => None,
        }
    }

    fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        }
    }
}

/// The certificate identifier carried in OCSP requests and responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertId {
    pub hash_algorithm: HashAlgorithm,
    pub issuer_name_hash: Vec<u8>,
    pub issuer_key_hash: Vec<u8>,
    /// Serial number as INTEGER content bytes
    pub serial: Vec<u8>,
}

impl CertId {
    /// Compute the CertID of `leaf` under `issuer`
    fn compute(
        hash_algorithm: HashAlgorithm,
        leaf: &X509Certificate<'_>,
        issuer: &X509Certificate<'_>,
    ) -> Self {
        Self {
            hash_algorithm,
            issuer_name_hash: hash_algorithm.digest(issuer.subject().as_raw()),
            issuer_key_hash: hash_algorithm.digest(&issuer.public_key().subject_public_key.data),
            serial: leaf.raw_serial().to_vec(),
        }
    }

    fn to_der(&self) -> Vec<u8> {
        // AlgorithmIdentifier ::= SEQUENCE { algorithm OID, parameters NULL }
        let algorithm = der::sequence(
            &[
                der::tlv(TAG_OID, self.hash_algorithm.oid()),
                der::tlv(TAG_NULL, &[]),
            ]
            .concat(),
        );

        der::sequence(
            &[
                algorithm,
                der::tlv(TAG_OCTET_STRING, &self.issuer_name_hash),
                der::tlv(TAG_OCTET_STRING, &self.issuer_key_hash),
                der::integer(&self.serial),
            ]
            .concat(),
        )
    }

    fn from_object(object: &BerObject<'_>) -> Result<Self, OcspError> {
        let fields = object
            .as_sequence()
            .map_err(|_| malformed("CertID is not a SEQUENCE"))?;
        let [algorithm, name_hash, key_hash, serial] = fields.as_slice() else {
            return Err(malformed("CertID must have four fields"));
        };

        let oid = algorithm
            .as_sequence()
            .ok()
            .and_then(|fields| fields.first())
            .and_then(|oid| oid.as_oid().ok())
            .ok_or_else(|| malformed("invalid CertID hashAlgorithm"))?;
        let hash_algorithm = HashAlgorithm::from_oid(oid.as_bytes())
            .ok_or_else(|| malformed("unsupported CertID hash algorithm"))?;

        let serial = match serial.content {
            BerObjectContent::Integer(bytes) => bytes,
            _ => return Err(malformed("CertID serialNumber is not an INTEGER")),
        };

        Ok(Self {
            hash_algorithm,
            issuer_name_hash: octets(name_hash, "issuerNameHash")?.to_vec(),
            issuer_key_hash: octets(key_hash, "issuerKeyHash")?.to_vec(),
            serial: serial.to_vec(),
        })
    }

    fn matches(&self, other: &CertId) -> bool {
        self.hash_algorithm == other.hash_algorithm
            && self.issuer_name_hash == other.issuer_name_hash
            && self.issuer_key_hash == other.issuer_key_hash
            && trim_leading_zeros(&self.serial) == trim_leading_zeros(&other.serial)
    }
}

/// OCSP checker for certificate revocation status
pub struct OcspChecker {
    client: reqwest::Client,
}

impl OcspChecker {
    /// Create a new OCSP checker whose requests are bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self, OcspError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OcspError::ResponderUnreachable {
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }

    /// Check the revocation status of `leaf_der` issued by `issuer_der`.
    ///
    /// A leaf without responder URLs, or a pair no request can be built for,
    /// is an error. Once a request exists, every transport, parse or
    /// signature failure becomes [`RevocationVerdict::CheckFailed`].
    pub async fn check_ocsp(
        &self,
        leaf_der: &[u8],
        issuer_der: &[u8],
    ) -> Result<RevocationVerdict, OcspError> {
        let leaf = CertificateChecker::new()
            .parse_certificate(leaf_der)
            .map_err(|e| OcspError::RequestBuild {
                message: e.to_string(),
            })?;
        let responder_url = leaf
            .ocsp_responders
            .first()
            .ok_or(OcspError::NoResponder)?
            .clone();

        let request = build_request(leaf_der, issuer_der)?;

        let outcome = match self.post_request(&responder_url, request).await {
            Ok(body) => parse_response(&body, leaf_der, issuer_der, Utc::now()),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(verdict) => {
                tracing::debug!("OCSP status from {}: {}", responder_url, verdict);
                Ok(verdict)
            }
            Err(e) => {
                tracing::warn!("OCSP check against {} failed: {}", responder_url, e);
                Ok(RevocationVerdict::CheckFailed {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// POST a DER request and return the raw response body
    async fn post_request(&self, responder_url: &str, request: Vec<u8>) -> Result<Vec<u8>, OcspError> {
        let url = Url::parse(responder_url).map_err(|e| OcspError::InvalidResponderUrl {
            url: responder_url.to_string(),
            message: e.to_string(),
        })?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(OcspError::InvalidResponderUrl {
                    url: responder_url.to_string(),
                    message: "missing host".to_string(),
                })
            }
        };

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, OCSP_REQUEST_CONTENT_TYPE)
            .header(ACCEPT, OCSP_RESPONSE_CONTENT_TYPE)
            .header(HOST, host)
            .body(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OcspError::Timeout
                } else {
                    OcspError::ResponderUnreachable {
                        message: e.to_string(),
                    }
                }
            })?;

        if !response.status().is_success() {
            return Err(OcspError::ResponderError {
                message: format!("HTTP {}", response.status()),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| OcspError::ResponseParse {
                message: e.to_string(),
            })?;
        Ok(body.to_vec())
    }
}

fn parse_certificate_der<'a>(
    der: &'a [u8],
    what: &str,
) -> Result<X509Certificate<'a>, OcspError> {
    X509Certificate::from_der(der)
        .map(|(_, cert)| cert)
        .map_err(|e| OcspError::RequestBuild {
            message: format!("Failed to parse {}: {:?}", what, e),
        })
}

/// Build a DER-encoded OCSP request for `leaf_der` using SHA-256 CertID
/// hashes.
pub fn build_request(leaf_der: &[u8], issuer_der: &[u8]) -> Result<Vec<u8>, OcspError> {
    let leaf = parse_certificate_der(leaf_der, "certificate")?;
    let issuer = parse_certificate_der(issuer_der, "issuer certificate")?;

    if leaf.issuer() != issuer.subject() {
        tracing::warn!(
            "Building OCSP request with issuer {} for certificate issued by {}",
            issuer.subject(),
            leaf.issuer()
        );
    }

    let cert_id = CertId::compute(HashAlgorithm::Sha256, &leaf, &issuer);

    // Request ::= SEQUENCE { reqCert CertID }
    let request = der::sequence(&cert_id.to_der());
    // requestList ::= SEQUENCE OF Request
    let request_list = der::sequence(&request);
    // TBSRequest ::= SEQUENCE { requestList }  (version DEFAULT v1 omitted)
    let tbs_request = der::sequence(&request_list);
    // OCSPRequest ::= SEQUENCE { tbsRequest }
    Ok(der::sequence(&tbs_request))
}

/// Decode the CertID of the first request in an encoded OCSP request
pub fn parse_request(request: &[u8]) -> Result<CertId, OcspError> {
    let (outer, _, _) = read_der(request, "OCSPRequest")?;
    let tbs = outer
        .as_sequence()
        .ok()
        .and_then(|fields| fields.first())
        .and_then(|tbs| tbs.as_sequence().ok())
        .ok_or_else(|| malformed("invalid OCSP request: missing TBSRequest"))?;

    // The optional [0] version and [1] requestorName are context tagged, so
    // the first plain SEQUENCE is the requestList
    let request_list = tbs
        .iter()
        .find_map(|field| field.as_sequence().ok())
        .ok_or_else(|| malformed("invalid OCSP request: missing requestList"))?;
    let cert_id = request_list
        .first()
        .and_then(|request| request.as_sequence().ok())
        .and_then(|request| request.first())
        .ok_or_else(|| malformed("invalid OCSP request: empty requestList"))?;

    CertId::from_object(cert_id)
}

/// Parse an OCSP response for `leaf_der`/`issuer_der` and map its status.
///
/// Checks, in order: the response status, the signature over the response
/// data (by the issuer or by a delegated responder certified by the issuer),
/// that a `SingleResponse` carries this leaf's CertID, and that the answer
/// is not past its `nextUpdate` at `now`.
pub fn parse_response(
    response: &[u8],
    leaf_der: &[u8],
    issuer_der: &[u8],
    now: DateTime<Utc>,
) -> Result<RevocationVerdict, OcspError> {
    let leaf = parse_certificate_der(leaf_der, "certificate")?;
    let issuer = parse_certificate_der(issuer_der, "issuer certificate")?;

    let basic = decode_basic_response(response)?;
    verify_response_signature(&basic, &issuer, issuer_der)?;

    let responses = decode_single_responses(&basic)?;
    let single = responses
        .into_iter()
        .find(|single| {
            let expected = CertId::compute(single.cert_id.hash_algorithm, &leaf, &issuer);
            single.cert_id.matches(&expected)
        })
        .ok_or(OcspError::CertificateMismatch)?;

    if let Some(next_update) = single.next_update {
        if next_update < now {
            return Err(OcspError::Stale {
                next_update: next_update.to_rfc3339(),
            });
        }
    }

    Ok(single.verdict)
}

fn malformed(message: impl Into<String>) -> OcspError {
    OcspError::ResponseParse {
        message: message.into(),
    }
}

/// Parse one DER element, returning it with its encoding and the input
/// that follows it
fn read_der<'a>(
    input: &'a [u8],
    what: &str,
) -> Result<(BerObject<'a>, &'a [u8], &'a [u8]), OcspError> {
    let (rest, object) =
        parse_der(input).map_err(|e| malformed(format!("Failed to parse {}: {:?}", what, e)))?;
    let raw = &input[..input.len() - rest.len()];
    Ok((object, raw, rest))
}

/// Parse consecutive DER elements until `input` is exhausted
fn read_all<'a>(mut input: &'a [u8], what: &str) -> Result<Vec<(BerObject<'a>, &'a [u8])>, OcspError> {
    let mut elements = Vec::new();
    while !input.is_empty() {
        let (object, raw, rest) = read_der(input, what)?;
        elements.push((object, raw));
        input = rest;
    }
    Ok(elements)
}

/// The content octets of the SEQUENCE at the front of `input`
fn sequence_content<'a>(input: &'a [u8], what: &str) -> Result<&'a [u8], OcspError> {
    let (after_header, header) = der_read_element_header(input)
        .map_err(|e| malformed(format!("Failed to parse {}: {:?}", what, e)))?;
    match header.length() {
        Length::Definite(len) if header.tag() == Tag::Sequence && len <= after_header.len() => {
            Ok(&after_header[..len])
        }
        _ => Err(malformed(format!("{} is not a SEQUENCE", what))),
    }
}

/// Tag number of a context-specific element
fn context_tag(object: &BerObject<'_>) -> Option<u32> {
    (object.header.class() == Class::ContextSpecific).then(|| object.header.tag().0)
}

/// The element inside an `[n] EXPLICIT` wrapper, with its encoding
fn explicit<'a>(
    object: &BerObject<'a>,
    n: u32,
    what: &str,
) -> Result<(BerObject<'a>, &'a [u8]), OcspError> {
    if context_tag(object) != Some(n) {
        return Err(malformed(format!("{} is not tagged [{}]", what, n)));
    }
    let content = object
        .as_slice()
        .map_err(|_| malformed(format!("Failed to read {} wrapper", what)))?;
    let (inner, raw, _) = read_der(content, what)?;
    Ok((inner, raw))
}

fn octets<'a>(object: &BerObject<'a>, what: &str) -> Result<&'a [u8], OcspError> {
    match object.content {
        BerObjectContent::OctetString(bytes) => Ok(bytes),
        _ => Err(malformed(format!("{} is not an OCTET STRING", what))),
    }
}

fn generalized_time(object: &BerObject<'_>, what: &str) -> Result<DateTime<Utc>, OcspError> {
    let time = match object.content {
        BerObjectContent::GeneralizedTime(ref time) => time,
        _ => return Err(malformed(format!("{} is not a GeneralizedTime", what))),
    };
    Utc.with_ymd_and_hms(
        time.year as i32,
        time.month.into(),
        time.day.into(),
        time.hour.into(),
        time.minute.into(),
        time.second.into(),
    )
    .single()
    .ok_or_else(|| malformed(format!("{} is out of range", what)))
}

/// The signed portion of a successful response
struct BasicResponse<'a> {
    tbs_response_data: BerObject<'a>,
    /// Encoded ResponseData, the signed bytes
    tbs_raw: &'a [u8],
    /// AlgorithmIdentifier content (OID and parameters)
    signature_algorithm: &'a [u8],
    signature: &'a [u8],
    certs: Vec<&'a [u8]>,
}

struct SingleResponse {
    cert_id: CertId,
    verdict: RevocationVerdict,
    next_update: Option<DateTime<Utc>>,
}

fn decode_basic_response(response: &[u8]) -> Result<BasicResponse<'_>, OcspError> {
    // OCSPResponse ::= SEQUENCE {
    //   responseStatus ENUMERATED,
    //   responseBytes  [0] EXPLICIT ResponseBytes OPTIONAL }
    let (outer, _, _) = read_der(response, "OCSP response")?;
    let outer = outer
        .as_sequence()
        .map_err(|_| malformed("OCSP response is not a SEQUENCE"))?;

    let status = outer
        .first()
        .ok_or_else(|| malformed("Empty OCSP response"))?
        .as_u32()
        .map_err(|_| malformed("Invalid responseStatus"))?;
    if status != 0 {
        return Err(OcspError::ResponseStatus {
            status: response_status_name(status).to_string(),
        });
    }

    let wrapper = outer
        .get(1)
        .ok_or_else(|| malformed("No responseBytes in successful OCSP response"))?;
    let (response_bytes, _) = explicit(wrapper, 0, "responseBytes")?;
    let response_bytes = response_bytes
        .as_sequence()
        .map_err(|_| malformed("ResponseBytes is not a SEQUENCE"))?;
    let [response_type, basic] = response_bytes.as_slice() else {
        return Err(malformed("ResponseBytes must have two fields"));
    };
    if response_type.as_oid().ok().map(|oid| oid.as_bytes()) != Some(OID_OCSP_BASIC) {
        return Err(malformed("unsupported response type"));
    }
    let basic_der = octets(basic, "BasicOCSPResponse")?;

    // BasicOCSPResponse ::= SEQUENCE {
    //   tbsResponseData ResponseData,
    //   signatureAlgorithm AlgorithmIdentifier,
    //   signature BIT STRING,
    //   certs [0] EXPLICIT SEQUENCE OF Certificate OPTIONAL }
    let mut fields = read_all(sequence_content(basic_der, "BasicOCSPResponse")?, "BasicOCSPResponse")?
        .into_iter();
    let (Some((tbs_response_data, tbs_raw)), Some((_, algorithm_raw)), Some((signature, _))) =
        (fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed("BasicOCSPResponse missing fields"));
    };

    if tbs_response_data.as_sequence().is_err() {
        return Err(malformed("ResponseData is not a SEQUENCE"));
    }
    let signature_algorithm = sequence_content(algorithm_raw, "signatureAlgorithm")?;
    let signature = match signature.content {
        BerObjectContent::BitString(0, ref bits) => bits.data,
        _ => return Err(malformed("signature is not a whole-byte BIT STRING")),
    };

    let certs = match fields.next() {
        Some((wrapper, _)) => {
            let (_, certs_raw) = explicit(&wrapper, 0, "certs")?;
            read_all(sequence_content(certs_raw, "certs")?, "certs")?
                .into_iter()
                .map(|(_, raw)| raw)
                .collect()
        }
        None => Vec::new(),
    };

    Ok(BasicResponse {
        tbs_response_data,
        tbs_raw,
        signature_algorithm,
        signature,
        certs,
    })
}

fn decode_single_responses(basic: &BasicResponse<'_>) -> Result<Vec<SingleResponse>, OcspError> {
    // ResponseData ::= SEQUENCE {
    //   version [0] EXPLICIT Version DEFAULT v1,
    //   responderID ResponderID,
    //   producedAt GeneralizedTime,
    //   responses SEQUENCE OF SingleResponse,
    //   responseExtensions [1] EXPLICIT Extensions OPTIONAL }
    let fields = basic
        .tbs_response_data
        .as_sequence()
        .map_err(|_| malformed("ResponseData is not a SEQUENCE"))?;
    let mut fields = fields.iter().peekable();
    if fields.peek().and_then(|field| context_tag(field)) == Some(0) {
        fields.next();
    }
    fields
        .next()
        .ok_or_else(|| malformed("missing responderID"))?;
    generalized_time(
        fields.next().ok_or_else(|| malformed("missing producedAt"))?,
        "producedAt",
    )?;
    let responses = fields
        .next()
        .ok_or_else(|| malformed("missing responses"))?
        .as_sequence()
        .map_err(|_| malformed("responses is not a SEQUENCE"))?;

    responses.iter().map(decode_single_response).collect()
}

fn decode_single_response(object: &BerObject<'_>) -> Result<SingleResponse, OcspError> {
    // SingleResponse ::= SEQUENCE {
    //   certID CertID,
    //   certStatus CertStatus,
    //   thisUpdate GeneralizedTime,
    //   nextUpdate [0] EXPLICIT GeneralizedTime OPTIONAL,
    //   singleExtensions [1] EXPLICIT Extensions OPTIONAL }
    let fields = object
        .as_sequence()
        .map_err(|_| malformed("SingleResponse is not a SEQUENCE"))?;
    if fields.len() < 3 {
        return Err(malformed("SingleResponse missing fields"));
    }

    let cert_id = CertId::from_object(&fields[0])?;
    let verdict = decode_cert_status(&fields[1])?;
    generalized_time(&fields[2], "thisUpdate")?;

    let next_update = match fields.get(3) {
        Some(field) if context_tag(field) == Some(0) => {
            let (time, _) = explicit(field, 0, "nextUpdate")?;
            Some(generalized_time(&time, "nextUpdate")?)
        }
        _ => None,
    };

    Ok(SingleResponse {
        cert_id,
        verdict,
        next_update,
    })
}

fn decode_cert_status(object: &BerObject<'_>) -> Result<RevocationVerdict, OcspError> {
    // CertStatus ::= CHOICE {
    //   good    [0] IMPLICIT NULL,
    //   revoked [1] IMPLICIT RevokedInfo,
    //   unknown [2] IMPLICIT UnknownInfo }
    match context_tag(object) {
        Some(0) => Ok(RevocationVerdict::Good),
        Some(1) => {
            // RevokedInfo ::= SEQUENCE {
            //   revocationTime GeneralizedTime,
            //   revocationReason [0] EXPLICIT CRLReason OPTIONAL }
            let content = object
                .as_slice()
                .map_err(|_| malformed("Failed to read RevokedInfo"))?;
            let fields = read_all(content, "RevokedInfo")?;
            let (time, _) = fields
                .first()
                .ok_or_else(|| malformed("missing revocationTime"))?;
            let revoked_at = generalized_time(time, "revocationTime")?;
            let reason = match fields.get(1) {
                Some((field, _)) if context_tag(field) == Some(0) => {
                    let (reason, _) = explicit(field, 0, "revocationReason")?;
                    reason.as_u32().ok().and_then(|code| u8::try_from(code).ok())
                }
                _ => None,
            };
            Ok(RevocationVerdict::Revoked { revoked_at, reason })
        }
        Some(2) => Ok(RevocationVerdict::Unknown),
        _ => Err(malformed(format!(
            "Unexpected CertStatus tag: {}",
            object.header.tag().0
        ))),
    }
}

/// Verify the response signature and, for a delegated responder, its
/// authorisation by the issuer
fn verify_response_signature(
    basic: &BasicResponse<'_>,
    issuer: &X509Certificate<'_>,
    issuer_der: &[u8],
) -> Result<(), OcspError> {
    match basic.certs.first() {
        Some(responder_der) if *responder_der != issuer_der => {
            let (_, responder) = X509Certificate::from_der(responder_der).map_err(|e| {
                malformed(format!("invalid responder certificate: {:?}", e))
            })?;
            authorize_delegated_responder(&responder, issuer)?;
            verify_signed_data(responder.public_key(), basic)
        }
        _ => verify_signed_data(issuer.public_key(), basic),
    }
}

fn authorize_delegated_responder(
    responder: &X509Certificate<'_>,
    issuer: &X509Certificate<'_>,
) -> Result<(), OcspError> {
    if responder.issuer() != issuer.subject() {
        return Err(OcspError::SignatureInvalid {
            message: "responder certificate was not issued by the certificate issuer".to_string(),
        });
    }

    responder
        .verify_signature(Some(issuer.public_key()))
        .map_err(|e| OcspError::SignatureInvalid {
            message: format!("responder certificate not signed by issuer: {:?}", e),
        })?;

    let ocsp_signing = matches!(
        responder.extended_key_usage(),
        Ok(Some(eku)) if eku.value.ocsp_signing
    );
    if !ocsp_signing {
        return Err(OcspError::SignatureInvalid {
            message: "responder certificate lacks the OCSP signing usage".to_string(),
        });
    }

    Ok(())
}

/// DER content of an AlgorithmIdentifier, the form rustls names algorithms by
fn algorithm_id(algorithm: &AlgorithmIdentifier<'_>) -> Vec<u8> {
    let mut id = der::tlv(TAG_OID, algorithm.algorithm.as_bytes());
    if let Some(parameters) = &algorithm.parameters {
        id.extend(der::tlv(parameters.header.tag().0 as u8, parameters.data));
    }
    id
}

/// Verify the response signature with `signer`'s key, using the signature
/// algorithms of the rustls ring provider
fn verify_signed_data(
    signer: &SubjectPublicKeyInfo<'_>,
    basic: &BasicResponse<'_>,
) -> Result<(), OcspError> {
    let key_algorithm = algorithm_id(&signer.algorithm);

    let algorithms = rustls::crypto::ring::default_provider()
        .signature_verification_algorithms
        .all;
    let algorithm = algorithms
        .iter()
        .find(|alg| {
            let key_id = alg.public_key_alg_id();
            let signature_id = alg.signature_alg_id();
            let key_id: &[u8] = key_id.as_ref();
            let signature_id: &[u8] = signature_id.as_ref();
            key_id == key_algorithm.as_slice() && signature_id == basic.signature_algorithm
        })
        .ok_or_else(|| OcspError::SignatureInvalid {
            message: "unsupported signature algorithm".to_string(),
        })?;

    algorithm
        .verify_signature(
            &signer.subject_public_key.data,
            basic.tbs_raw,
            basic.signature,
        )
        .map_err(|_| OcspError::SignatureInvalid {
            message: "signature does not verify".to_string(),
        })
}

fn response_status_name(code: u32) -> &'static str {
    match code {
        1 => "malformedRequest",
        2 => "internalError",
        3 => "tryLater",
        5 => "sigRequired",
        6 => "unauthorized",
        _ => "unknown",
    }
}
