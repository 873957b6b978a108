// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared test PKI and a scripted certificate fetcher.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use alexa_verify::store::{BoxFuture, CertificateFetcher};
use alexa_verify::VerificationFailure;
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair, PKCS_RSA_SHA256,
};
use rsa::pkcs8::EncodePrivateKey as _;
use rsa::RsaPrivateKey;
use rustls_pki_types::PrivatePkcs8KeyDer;
use time::{Duration, OffsetDateTime};

pub const SIGNING_SUBJECT: &str = "echo-api.amazon.com";
pub const TRUSTED_CERT_URL: &str = "https://s3.amazonaws.com/echo.api/echo-api-cert.pem";

// 2048-bit RSA key generation is slow in debug builds; every test in the
// binary shares these three keys.
pub fn ca_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("generate CA key"))
}

pub fn leaf_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("generate leaf key"))
}

pub fn intermediate_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("generate intermediate key")
    })
}

fn rcgen_key(key: &RsaPrivateKey) -> KeyPair {
    let der = key.to_pkcs8_der().expect("export pkcs8").as_bytes().to_vec();
    KeyPair::from_pkcs8_der_and_sign_algo(&PrivatePkcs8KeyDer::from(der), &PKCS_RSA_SHA256)
        .expect("load RSA key pair")
}

fn dn(common_name: &str) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    dn
}

/// A certificate authority that can mint signing leaves and intermediates.
pub struct TestCa {
    key: KeyPair,
    cert: rcgen::Certificate,
}

impl TestCa {
    pub fn new() -> Self {
        Self::self_signed("alexa-verify test root", ca_key())
    }

    /// A CA sharing nothing with [`TestCa::new`] — different key, different
    /// subject — for untrusted-issuer scenarios.
    pub fn new_unrelated() -> Self {
        Self::self_signed("unrelated test root", intermediate_key())
    }

    fn self_signed(common_name: &str, key: &RsaPrivateKey) -> Self {
        let key = rcgen_key(key);
        let mut params = CertificateParams::default();
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.distinguished_name = dn(common_name);
        let cert = params.self_signed(&key).expect("self-sign CA");
        Self { key, cert }
    }

    pub fn der(&self) -> Vec<u8> {
        self.cert.der().as_ref().to_vec()
    }

    pub fn pem(&self) -> String {
        self.cert.pem()
    }

    /// Issue an intermediate CA under this CA.
    pub fn issue_intermediate(&self) -> TestCa {
        let key = rcgen_key(intermediate_key());
        let mut params = CertificateParams::default();
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.distinguished_name = dn("alexa-verify test intermediate");
        let cert = params
            .signed_by(&key, &self.cert, &self.key)
            .expect("issue intermediate");
        TestCa { key, cert }
    }

    /// Issue a signing leaf with `subject_cn`, valid over the given window.
    pub fn issue_leaf(
        &self,
        subject_cn: &str,
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    ) -> rcgen::Certificate {
        let key = rcgen_key(leaf_key());
        let mut params = CertificateParams::default();
        params.not_before = not_before;
        params.not_after = not_after;
        params.distinguished_name = dn(subject_cn);
        params
            .signed_by(&key, &self.cert, &self.key)
            .expect("issue leaf")
    }

    /// A leaf with the platform signing identity, currently valid.
    pub fn issue_current_leaf(&self) -> rcgen::Certificate {
        let (not_before, not_after) = current_window();
        self.issue_leaf(SIGNING_SUBJECT, not_before, not_after)
    }
}

pub fn current_window() -> (OffsetDateTime, OffsetDateTime) {
    let now = OffsetDateTime::now_utc();
    (now - Duration::hours(1), now + Duration::hours(1))
}

/// Base64 SHA-1 PKCS#1 v1.5 signature over `body` with the shared leaf key.
pub fn sign_body(body: &[u8]) -> String {
    sign_body_with(leaf_key(), body)
}

pub fn sign_body_with(key: &RsaPrivateKey, body: &[u8]) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use rsa::pkcs1v15::SigningKey;
    use sha1::Sha1;
    use signature::{SignatureEncoding as _, Signer as _};

    let signing_key = SigningKey::<Sha1>::new(key.clone());
    let signature = signing_key.sign(body);
    STANDARD.encode(signature.to_bytes())
}

/// Serves canned bytes per URL and records every fetch.
pub struct ScriptedFetcher {
    responses: HashMap<String, Vec<u8>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn serve(mut self, url: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.to_owned(), bytes.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("fetch log lock").len()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls
            .lock()
            .expect("fetch log lock")
            .iter()
            .filter(|called| *called == url)
            .count()
    }
}

impl CertificateFetcher for ScriptedFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, VerificationFailure>> {
        Box::pin(async move {
            self.calls.lock().expect("fetch log lock").push(url.to_owned());
            self.responses.get(url).cloned().ok_or_else(|| {
                VerificationFailure::FetchFailure(format!("no response scripted for {url}"))
            })
        })
    }
}
