// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Parsed certificate material.
//!
//! `x509-parser` borrows from the DER it parses, so the fields the verifier
//! needs are copied out into owned structs once, at parse time. The raw DER
//! is retained for exact-match comparisons against trust anchors.

use time::OffsetDateTime;

use crate::error::VerificationFailure;

/// A single parsed X.509 certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCertificate {
    /// Raw certificate DER.
    pub der: Vec<u8>,
    pub subject_dn: String,
    pub issuer_dn: String,
    /// First subject common name, if the subject carries one.
    pub subject_cn: Option<String>,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
    /// DER SubjectPublicKeyInfo.
    pub spki_der: Vec<u8>,
    /// DER TBSCertificate, the exact bytes covered by the certificate signature.
    pub tbs_der: Vec<u8>,
    /// Dotted OID of the certificate signature algorithm.
    pub signature_oid: String,
    /// Signature over `tbs_der`, made by the issuer.
    pub signature: Vec<u8>,
}

/// The certificate material served from a certificate URL.
///
/// The platform serves its signing certificate as a PEM chain: the first
/// certificate is the signing leaf, any that follow are chain
/// intermediates. A bare DER certificate yields a bundle with no
/// intermediates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateBundle {
    pub leaf: ParsedCertificate,
    pub intermediates: Vec<ParsedCertificate>,
}

/// Parse one DER certificate into owned form.
pub fn parse_certificate_der(der: &[u8]) -> Result<ParsedCertificate, VerificationFailure> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| VerificationFailure::MalformedCertificate(format!("invalid DER: {e}")))?;

    let subject_cn = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(str::to_owned);

    Ok(ParsedCertificate {
        der: der.to_vec(),
        subject_dn: cert.tbs_certificate.subject.to_string(),
        issuer_dn: cert.tbs_certificate.issuer.to_string(),
        subject_cn,
        not_before: cert.validity().not_before.to_datetime(),
        not_after: cert.validity().not_after.to_datetime(),
        spki_der: cert.tbs_certificate.subject_pki.raw.to_vec(),
        // `x509-parser` keeps the raw DER for TBSCertificate; expose it via `AsRef`.
        tbs_der: cert.tbs_certificate.as_ref().to_vec(),
        signature_oid: cert.signature_algorithm.algorithm.to_string(),
        signature: cert.signature_value.data.to_vec(),
    })
}

/// Parse the bytes served at a certificate URL into a [`CertificateBundle`].
///
/// Accepts a PEM bundle (leaf first) or a single DER certificate.
pub fn parse_certificate_bundle(bytes: &[u8]) -> Result<CertificateBundle, VerificationFailure> {
    let trimmed = trim_ascii_start(bytes);
    if trimmed.starts_with(b"-----BEGIN") {
        parse_pem_bundle(trimmed)
    } else {
        Ok(CertificateBundle {
            leaf: parse_certificate_der(bytes)?,
            intermediates: Vec::new(),
        })
    }
}

fn parse_pem_bundle(bytes: &[u8]) -> Result<CertificateBundle, VerificationFailure> {
    let mut certs = Vec::new();
    for pem in x509_parser::pem::Pem::iter_from_buffer(bytes) {
        let pem =
            pem.map_err(|e| VerificationFailure::MalformedCertificate(format!("invalid PEM: {e}")))?;
        if pem.label != "CERTIFICATE" {
            continue;
        }
        certs.push(parse_certificate_der(&pem.contents)?);
    }

    let mut certs = certs.into_iter();
    let Some(leaf) = certs.next() else {
        return Err(VerificationFailure::MalformedCertificate(
            "PEM bundle contains no certificate".to_owned(),
        ));
    };

    Ok(CertificateBundle {
        leaf,
        intermediates: certs.collect(),
    })
}

fn trim_ascii_start(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}
