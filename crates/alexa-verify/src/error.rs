// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Failure causes for the verification pipeline.
//!
//! These are structured results rather than exceptions: every variant is an
//! expected outcome of untrusted request data. Panics are reserved for
//! programmer error and are never reachable from attacker-supplied input.

use thiserror::Error;

/// Why a request failed verification.
///
/// The orchestrator reports the first cause it hits; its boolean facade
/// collapses all of them to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationFailure {
    /// The certificate URL header did not parse as a URL.
    #[error("certificate URL did not parse: {0}")]
    MalformedUrl(String),

    /// The certificate URL parsed but is not an allowed certificate origin.
    #[error("certificate URL is not a trusted certificate origin: {0}")]
    UntrustedUrl(String),

    /// The certificate could not be downloaded.
    #[error("certificate fetch failed: {0}")]
    FetchFailure(String),

    /// The downloaded bytes were not a parseable X.509 certificate.
    #[error("certificate did not parse: {0}")]
    MalformedCertificate(String),

    /// The current time is not yet inside the certificate validity window.
    #[error("signing certificate is not yet valid")]
    CertificateNotYetValid,

    /// The current time is past the certificate validity window.
    #[error("signing certificate has expired")]
    CertificateExpired,

    /// The certificate subject is not the platform signing identity.
    #[error("signing certificate subject is not the expected identity")]
    WrongCertificateSubject,

    /// No chain could be built from the certificate to a trusted root.
    #[error("certificate chain is not trusted: {0}")]
    UntrustedChain(String),

    /// A revocation-checking mode other than `NoCheck` was requested.
    #[error("revocation checking is not supported by this verifier")]
    UnsupportedRevocationMode,

    /// The declared request timestamp is outside the anti-replay window.
    #[error("request timestamp is outside the allowed tolerance")]
    TimestampOutOfTolerance,

    /// The signature header was not valid base64.
    #[error("signature header is not valid base64")]
    MalformedSignatureEncoding,

    /// The signature did not verify over the raw request body.
    #[error("signature does not match the request body")]
    SignatureMismatch,
}
