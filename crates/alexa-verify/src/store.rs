// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Certificate retrieval.
//!
//! [`CertificateStore`] owns the cache slot and a [`CertificateFetcher`],
//! so tests can swap the network out and count fetches. A fetch failure is
//! a verification failure, never a retried or backed-off operation; the
//! fetch also carries no timeout of its own beyond what `reqwest` applies
//! (known gap).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::cache::CertificateCache;
use crate::certificate::{parse_certificate_bundle, CertificateBundle};
use crate::error::VerificationFailure;

/// Boxed future returned by dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Retrieves the raw bytes served at a certificate URL.
pub trait CertificateFetcher: Send + Sync {
    /// Fetch the bytes at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationFailure::FetchFailure`] on any transport or
    /// HTTP-status error.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, VerificationFailure>>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone, Default)]
pub struct HttpCertificateFetcher {
    http: reqwest::Client,
}

impl HttpCertificateFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CertificateFetcher for HttpCertificateFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, VerificationFailure>> {
        Box::pin(async move {
            let response = self
                .http
                .get(url)
                .send()
                .await
                .map_err(|e| VerificationFailure::FetchFailure(e.to_string()))?
                .error_for_status()
                .map_err(|e| VerificationFailure::FetchFailure(e.to_string()))?;

            let bytes = response
                .bytes()
                .await
                .map_err(|e| VerificationFailure::FetchFailure(e.to_string()))?;

            Ok(bytes.to_vec())
        })
    }
}

/// Fetches, parses, and caches the platform signing certificate.
pub struct CertificateStore {
    fetcher: Arc<dyn CertificateFetcher>,
    cache: CertificateCache,
}

impl CertificateStore {
    pub fn new(fetcher: Arc<dyn CertificateFetcher>) -> Self {
        Self {
            fetcher,
            cache: CertificateCache::new(),
        }
    }

    /// The certificate bundle served at `url`.
    ///
    /// A cache hit returns the previously parsed bundle with no network
    /// call. On a miss the bytes are fetched and parsed, and only a
    /// successful parse replaces the slot; fetch or parse failure leaves
    /// the previous entry in place.
    ///
    /// The cache saves the fetch only — callers re-validate the returned
    /// certificate on every request.
    pub async fn get_certificate(
        &self,
        url: &str,
    ) -> Result<Arc<CertificateBundle>, VerificationFailure> {
        if let Some(bundle) = self.cache.get(url) {
            debug!(%url, "certificate cache hit");
            return Ok(bundle);
        }

        debug!(%url, "certificate cache miss");
        let bytes = self.fetcher.fetch(url).await?;
        let bundle = Arc::new(parse_certificate_bundle(&bytes)?);
        self.cache.store(url, Arc::clone(&bundle));
        Ok(bundle)
    }
}

impl Default for CertificateStore {
    fn default() -> Self {
        Self::new(Arc::new(HttpCertificateFetcher::new()))
    }
}
