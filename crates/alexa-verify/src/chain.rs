// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Chain-of-trust validation.
//!
//! Builds a chain from the signing leaf through any bundle intermediates to
//! a trust anchor, verifying each issuer signature along the way. Anchors
//! come from the host trust store by default; tests inject their own roots.

use rsa::pkcs1v15;
use rsa::pkcs8::DecodePublicKey as _;
use rsa::RsaPublicKey;
use sha2::{Sha256, Sha384, Sha512};
use signature::Verifier as _;

use crate::certificate::{parse_certificate_der, CertificateBundle, ParsedCertificate};
use crate::error::VerificationFailure;

/// Where trust anchors come from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrustMode {
    /// Use the host trust store.
    System,
    /// Use explicitly provided roots.
    CustomRoots,
}

/// Revocation checking policy.
///
/// The platform's signing certificates are not revocation-checked by this
/// verifier. `NoCheck` is the only supported mode; the enum exists so the
/// policy is a visible, auditable choice rather than an implicit default.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RevocationMode {
    /// Do not perform revocation checks.
    NoCheck,
    /// Perform online revocation checks. Unsupported.
    Online,
    /// Perform offline revocation checks. Unsupported.
    Offline,
}

/// Trust model for [`verify_chain`].
#[derive(Debug, Clone)]
pub struct ChainVerifyOptions {
    pub trust_mode: TrustMode,
    pub revocation_mode: RevocationMode,
    /// Root certificates (DER) used when `trust_mode` is `CustomRoots`.
    pub trusted_roots_der: Vec<Vec<u8>>,
}

impl Default for ChainVerifyOptions {
    fn default() -> Self {
        Self {
            trust_mode: TrustMode::System,
            revocation_mode: RevocationMode::NoCheck,
            trusted_roots_der: Vec::new(),
        }
    }
}

const MAX_CHAIN_DEPTH: usize = 16;

/// Build a trust chain from the bundle's leaf to a trusted root.
///
/// Issuers are searched among the bundle's intermediates first, then the
/// trust anchors. A leaf that is itself a configured custom root is
/// trusted as-is.
pub fn verify_chain(
    bundle: &CertificateBundle,
    options: &ChainVerifyOptions,
) -> Result<(), VerificationFailure> {
    if options.revocation_mode != RevocationMode::NoCheck {
        return Err(VerificationFailure::UnsupportedRevocationMode);
    }

    let anchors = match options.trust_mode {
        TrustMode::System => load_system_roots()?,
        TrustMode::CustomRoots => parse_custom_roots(&options.trusted_roots_der)?,
    };

    if options.trust_mode == TrustMode::CustomRoots
        && anchors.iter().any(|anchor| anchor.der == bundle.leaf.der)
    {
        return Ok(());
    }

    let mut current = &bundle.leaf;
    for _ in 0..MAX_CHAIN_DEPTH {
        let issuer = bundle
            .intermediates
            .iter()
            .chain(anchors.iter())
            .find(|issuer| {
                issuer.subject_dn == current.issuer_dn
                    && verify_issuer_signature(issuer, current).is_ok()
            });

        let Some(issuer) = issuer else {
            return Err(VerificationFailure::UntrustedChain(format!(
                "no trusted issuer found for '{}'",
                current.subject_dn
            )));
        };

        if anchors.iter().any(|anchor| anchor.der == issuer.der) {
            return Ok(());
        }
        current = issuer;
    }

    Err(VerificationFailure::UntrustedChain(
        "chain exceeded maximum depth".to_owned(),
    ))
}

fn parse_custom_roots(roots_der: &[Vec<u8>]) -> Result<Vec<ParsedCertificate>, VerificationFailure> {
    if roots_der.is_empty() {
        return Err(VerificationFailure::UntrustedChain(
            "no trust anchors provided".to_owned(),
        ));
    }

    let mut anchors = Vec::with_capacity(roots_der.len());
    for der in roots_der {
        let anchor = parse_certificate_der(der).map_err(|_| {
            VerificationFailure::UntrustedChain("unparseable trust anchor".to_owned())
        })?;
        anchors.push(anchor);
    }
    Ok(anchors)
}

fn load_system_roots() -> Result<Vec<ParsedCertificate>, VerificationFailure> {
    let roots = rustls_native_certs::load_native_certs();

    // Parse best-effort; a trust store routinely carries certificates with
    // algorithms this verifier has no use for.
    let anchors: Vec<ParsedCertificate> = roots
        .certs
        .iter()
        .filter_map(|der| parse_certificate_der(der.as_ref()).ok())
        .collect();

    if anchors.is_empty() {
        return Err(VerificationFailure::UntrustedChain(
            "host trust store yielded no usable roots".to_owned(),
        ));
    }
    Ok(anchors)
}

/// Verify `subject`'s signature using `issuer`'s public key.
fn verify_issuer_signature(
    issuer: &ParsedCertificate,
    subject: &ParsedCertificate,
) -> Result<(), VerificationFailure> {
    let untrusted = |message: String| VerificationFailure::UntrustedChain(message);

    let key = RsaPublicKey::from_public_key_der(&issuer.spki_der)
        .map_err(|e| untrusted(format!("bad issuer RSA public key: {e}")))?;
    let sig = pkcs1v15::Signature::try_from(subject.signature.as_slice())
        .map_err(|e| untrusted(format!("bad certificate signature bytes: {e}")))?;

    // sha256/sha384/sha512WithRSAEncryption; the platform chain is RSA.
    match subject.signature_oid.as_str() {
        "1.2.840.113549.1.1.11" => pkcs1v15::VerifyingKey::<Sha256>::new(key).verify(&subject.tbs_der, &sig),
        "1.2.840.113549.1.1.12" => pkcs1v15::VerifyingKey::<Sha384>::new(key).verify(&subject.tbs_der, &sig),
        "1.2.840.113549.1.1.13" => pkcs1v15::VerifyingKey::<Sha512>::new(key).verify(&subject.tbs_der, &sig),
        oid => {
            return Err(untrusted(format!(
                "unsupported certificate signature algorithm OID: {oid}"
            )))
        }
    }
    .map_err(|_| untrusted("certificate signature verification failed".to_owned()))
}
