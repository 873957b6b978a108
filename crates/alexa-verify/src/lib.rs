// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Verification of inbound Alexa skill webhook requests.
//!
//! Every request an Alexa skill endpoint receives claims to come from the
//! Alexa platform. This crate proves (or refutes) that claim before any
//! business logic runs:
//!
//! 1. The `SignatureCertChainUrl` header must point at the platform's
//!    certificate origin ([`cert_url`]).
//! 2. The signing certificate is fetched from that URL, with a single-slot
//!    cache so repeat requests skip the network ([`store`]).
//! 3. The certificate must be inside its validity window, carry the
//!    platform's signing identity, and chain to a trusted root
//!    ([`signing_cert`], [`chain`]).
//! 4. The timestamp declared in the request payload must be fresh
//!    ([`timestamp`]).
//! 5. The `Signature` header must be a valid RSA signature over the raw
//!    request body bytes ([`signature`]).
//!
//! [`RequestVerifier`] sequences the pipeline and short-circuits on the
//! first failure. Rejections are routine outcomes of untrusted input and
//! surface as [`VerificationFailure`] values, never as panics.

pub mod cache;
pub mod cert_url;
pub mod certificate;
pub mod chain;
pub mod error;
pub mod signature;
pub mod signing_cert;
pub mod store;
pub mod timestamp;
pub mod verifier;

pub use cert_url::is_trusted_certificate_url;
pub use chain::{ChainVerifyOptions, RevocationMode, TrustMode};
pub use error::VerificationFailure;
pub use store::{BoxFuture, CertificateFetcher, CertificateStore, HttpCertificateFetcher};
pub use verifier::{RequestVerifier, VerificationRequest};
