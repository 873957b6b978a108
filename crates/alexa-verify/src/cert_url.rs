// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Certificate-origin URL validation.
//!
//! The platform only ever serves its signing certificate from one origin.
//! Anything else in `SignatureCertChainUrl` is rejected before a single
//! byte is fetched.

use url::Url;

/// Scheme certificate URLs must use.
const CERT_URL_SCHEME: &str = "https";
/// Host that serves the platform signing certificates.
const CERT_URL_HOST: &str = "s3.amazonaws.com";
/// Reserved key prefix under which signing certificates live.
const CERT_URL_PATH_PREFIX: &str = "/echo.api";

/// Whether `url` is an allowed origin for the platform signing certificate.
///
/// All of the following must hold: scheme is `https`, host is exactly
/// [`CERT_URL_HOST`], the path starts with `/echo.api` (case-sensitive),
/// and no non-default port is given. Scheme and host comparisons are
/// case-insensitive because the URL parser lowercases both; dot segments
/// are resolved during parsing, so `..` cannot escape the prefix.
///
/// A failed check is a routine rejection, not an error.
pub fn is_trusted_certificate_url(url: &Url) -> bool {
    url.scheme() == CERT_URL_SCHEME
        && url.host_str() == Some(CERT_URL_HOST)
        && url.path().starts_with(CERT_URL_PATH_PREFIX)
        && url.port().is_none()
}
