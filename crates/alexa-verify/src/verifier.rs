// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The verification orchestrator.

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tracing::debug;
use url::Url;

use crate::cert_url::is_trusted_certificate_url;
use crate::chain::{verify_chain, ChainVerifyOptions};
use crate::error::VerificationFailure;
use crate::signature::verify_signature;
use crate::signing_cert::check_signing_certificate;
use crate::store::{CertificateFetcher, CertificateStore};
use crate::timestamp::{is_within_tolerance, DEFAULT_TIMESTAMP_TOLERANCE};

/// One inbound request's verification inputs. All fields are untrusted
/// until [`RequestVerifier::verify_request`] says otherwise.
#[derive(Debug, Clone)]
pub struct VerificationRequest<'a> {
    /// Base64 signature from the `Signature` header.
    pub encoded_signature: &'a str,
    /// Claimed certificate location from the `SignatureCertChainUrl` header.
    pub certificate_url: &'a str,
    /// Raw body bytes as received, before any parsing.
    pub body: &'a [u8],
    /// Timestamp declared inside the request payload, extracted by the
    /// caller — this crate does not parse the payload.
    pub declared_timestamp: OffsetDateTime,
}

/// Sequences the verification pipeline, short-circuiting on the first
/// failure. One instance serves the whole process; it owns the certificate
/// cache slot.
pub struct RequestVerifier {
    store: CertificateStore,
    chain_options: ChainVerifyOptions,
    timestamp_tolerance: Duration,
}

impl RequestVerifier {
    /// A verifier that fetches certificates over HTTPS and trusts the host
    /// trust store.
    pub fn new() -> Self {
        Self {
            store: CertificateStore::default(),
            chain_options: ChainVerifyOptions::default(),
            timestamp_tolerance: DEFAULT_TIMESTAMP_TOLERANCE,
        }
    }

    /// A verifier with a custom certificate fetcher.
    pub fn with_fetcher(fetcher: Arc<dyn CertificateFetcher>) -> Self {
        Self {
            store: CertificateStore::new(fetcher),
            chain_options: ChainVerifyOptions::default(),
            timestamp_tolerance: DEFAULT_TIMESTAMP_TOLERANCE,
        }
    }

    /// Override the chain trust model.
    pub fn chain_options(mut self, options: ChainVerifyOptions) -> Self {
        self.chain_options = options;
        self
    }

    /// Override the anti-replay tolerance.
    pub fn timestamp_tolerance(mut self, tolerance: Duration) -> Self {
        self.timestamp_tolerance = tolerance;
        self
    }

    /// Run the full pipeline, reporting the first failure cause.
    ///
    /// Step order: certificate URL trust, certificate retrieval
    /// (cache-checked), certificate validity and identity, chain of trust,
    /// timestamp freshness, then the signature over the raw body.
    pub async fn verify_request(
        &self,
        request: &VerificationRequest<'_>,
    ) -> Result<(), VerificationFailure> {
        let url = Url::parse(request.certificate_url)
            .map_err(|e| VerificationFailure::MalformedUrl(e.to_string()))?;
        if !is_trusted_certificate_url(&url) {
            return Err(VerificationFailure::UntrustedUrl(
                request.certificate_url.to_owned(),
            ));
        }

        let bundle = self.store.get_certificate(request.certificate_url).await?;

        // A cache hit skips the fetch only; the certificate is re-checked
        // on every request.
        let now = OffsetDateTime::now_utc();
        check_signing_certificate(&bundle.leaf, now)?;
        verify_chain(&bundle, &self.chain_options)?;

        if !is_within_tolerance(request.declared_timestamp, now, self.timestamp_tolerance) {
            return Err(VerificationFailure::TimestampOutOfTolerance);
        }

        verify_signature(&bundle.leaf, request.encoded_signature, request.body)
    }

    /// Boolean facade over [`Self::verify_request`].
    pub async fn verify(&self, request: &VerificationRequest<'_>) -> bool {
        match self.verify_request(request).await {
            Ok(()) => true,
            Err(failure) => {
                debug!(%failure, "request failed verification");
                false
            }
        }
    }
}

impl Default for RequestVerifier {
    fn default() -> Self {
        Self::new()
    }
}
