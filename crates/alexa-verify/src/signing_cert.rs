// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Signing-certificate identity and validity checks.

use time::OffsetDateTime;

use crate::certificate::ParsedCertificate;
use crate::error::VerificationFailure;

/// Subject common name the platform signs requests with.
pub const EXPECTED_SIGNING_SUBJECT: &str = "echo-api.amazon.com";

/// Check that `cert` may sign requests at `now`.
///
/// `now` must be strictly inside the validity window, and the subject
/// common name must equal [`EXPECTED_SIGNING_SUBJECT`] exactly —
/// case-sensitive, no wildcard matching.
///
/// This check runs on every request, including for cached certificates.
pub fn check_signing_certificate(
    cert: &ParsedCertificate,
    now: OffsetDateTime,
) -> Result<(), VerificationFailure> {
    if now <= cert.not_before {
        return Err(VerificationFailure::CertificateNotYetValid);
    }
    if now >= cert.not_after {
        return Err(VerificationFailure::CertificateExpired);
    }
    if cert.subject_cn.as_deref() != Some(EXPECTED_SIGNING_SUBJECT) {
        return Err(VerificationFailure::WrongCertificateSubject);
    }
    Ok(())
}
