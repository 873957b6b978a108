// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Request-signature verification.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use rsa::pkcs1v15;
use rsa::pkcs8::DecodePublicKey as _;
use rsa::RsaPublicKey;
use sha1::Sha1;
use signature::Verifier as _;

use crate::certificate::ParsedCertificate;
use crate::error::VerificationFailure;

/// Verify `encoded_signature` (base64) over the exact raw `body` bytes with
/// the certificate's RSA public key.
///
/// The platform signs a SHA-1 digest with PKCS#1 v1.5 padding; neither is
/// configurable. `body` must be the bytes as received on the wire — any
/// re-encoding or re-serialization before this point invalidates the
/// signature, which is the property the check exists to provide.
pub fn verify_signature(
    cert: &ParsedCertificate,
    encoded_signature: &str,
    body: &[u8],
) -> Result<(), VerificationFailure> {
    let raw = BASE64_STANDARD
        .decode(encoded_signature.trim())
        .map_err(|_| VerificationFailure::MalformedSignatureEncoding)?;

    let key = RsaPublicKey::from_public_key_der(&cert.spki_der)
        .map_err(|_| VerificationFailure::SignatureMismatch)?;
    let signature = pkcs1v15::Signature::try_from(raw.as_slice())
        .map_err(|_| VerificationFailure::SignatureMismatch)?;

    pkcs1v15::VerifyingKey::<Sha1>::new(key)
        .verify(body, &signature)
        .map_err(|_| VerificationFailure::SignatureMismatch)
}
