// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Single-slot certificate cache.
//!
//! The platform rotates among a very small, stable set of certificate URLs,
//! so a one-entry memo keyed by exact URL equality captures nearly all
//! hits. Alternating requests for two different URLs thrash the slot; that
//! is accepted behavior, characterized by test.
//!
//! The slot is shared across concurrent verifications. Reads and writes go
//! through an `RwLock` that is never held across an await, so a reader can
//! never observe a torn (URL, certificate) pair. Two requests racing on a
//! miss both fetch and both store; the work is idempotent and the slot
//! stays consistent.

use std::sync::{Arc, RwLock};

use crate::certificate::CertificateBundle;

#[derive(Debug, Clone)]
struct CacheEntry {
    url: String,
    bundle: Arc<CertificateBundle>,
}

/// One (URL, certificate) slot, overwritten whenever a different URL is
/// stored. Not a general cache.
#[derive(Debug, Default)]
pub struct CertificateCache {
    slot: RwLock<Option<CacheEntry>>,
}

impl CertificateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached bundle, if the slot currently holds `url`.
    ///
    /// URL comparison is case-insensitive.
    pub fn get(&self, url: &str) -> Option<Arc<CertificateBundle>> {
        let slot = self.slot.read().expect("certificate cache lock poisoned");
        slot.as_ref()
            .filter(|entry| entry.url.eq_ignore_ascii_case(url))
            .map(|entry| Arc::clone(&entry.bundle))
    }

    /// Replace the slot with (`url`, `bundle`).
    pub fn store(&self, url: &str, bundle: Arc<CertificateBundle>) {
        let mut slot = self.slot.write().expect("certificate cache lock poisoned");
        *slot = Some(CacheEntry {
            url: url.to_owned(),
            bundle,
        });
    }
}
