// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Axum middleware for Alexa request verification.
//!
//! Attach with [`axum::middleware::from_fn_with_state`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use alexa_verify::RequestVerifier;
//! use alexa_verify_axum::verify_alexa_request;
//! use axum::{middleware, routing::post, Router};
//!
//! async fn handle() {}
//!
//! let verifier = Arc::new(RequestVerifier::new());
//! let app: Router = Router::new()
//!     .route("/alexa", post(handle))
//!     .layer(middleware::from_fn_with_state(verifier, verify_alexa_request));
//! ```
//!
//! The middleware buffers the body so downstream handlers still receive it
//! unconsumed, pulls the signature headers and the declared timestamp out
//! of the request, and maps every rejection to `400 Bad Request`. The core
//! never parses the payload; extracting `request.timestamp` from the JSON
//! envelope happens here.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;

use alexa_verify::{RequestVerifier, VerificationRequest};

/// Header naming the certificate the request was signed with.
pub const SIGNATURE_CERT_CHAIN_URL_HEADER: &str = "SignatureCertChainUrl";
/// Header carrying the base64 request signature.
pub const SIGNATURE_HEADER: &str = "Signature";

// Alexa request envelopes are small; anything past this is not one.
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Deserialize)]
struct RequestEnvelope {
    request: InnerRequest,
}

#[derive(Deserialize)]
struct InnerRequest {
    timestamp: String,
}

/// Reject the request unless the verification pipeline accepts it.
///
/// Absent or blank headers, an empty body, and a missing or malformed
/// timestamp are all immediate rejections; the pipeline is only invoked on
/// structurally complete requests.
pub async fn verify_alexa_request(
    State(verifier): State<Arc<RequestVerifier>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let Some(certificate_url) = non_blank_header(&parts.headers, SIGNATURE_CERT_CHAIN_URL_HEADER)
    else {
        debug!("rejecting request without certificate URL header");
        return StatusCode::BAD_REQUEST.into_response();
    };
    let Some(encoded_signature) = non_blank_header(&parts.headers, SIGNATURE_HEADER) else {
        debug!("rejecting request without signature header");
        return StatusCode::BAD_REQUEST.into_response();
    };

    let Ok(body_bytes) = axum::body::to_bytes(body, MAX_BODY_BYTES).await else {
        debug!("rejecting request with unreadable body");
        return StatusCode::BAD_REQUEST.into_response();
    };
    if body_bytes.is_empty() {
        debug!("rejecting request with empty body");
        return StatusCode::BAD_REQUEST.into_response();
    }

    let Some(declared_timestamp) = declared_timestamp(&body_bytes) else {
        debug!("rejecting request without a parseable timestamp");
        return StatusCode::BAD_REQUEST.into_response();
    };

    let verdict = {
        let inputs = VerificationRequest {
            encoded_signature,
            certificate_url,
            body: &body_bytes,
            declared_timestamp,
        };
        verifier.verify_request(&inputs).await
    };
    if let Err(failure) = verdict {
        debug!(%failure, "rejecting unverified request");
        return StatusCode::BAD_REQUEST.into_response();
    }

    // Hand the buffered body back so downstream extractors see it intact.
    let request = Request::from_parts(parts, Body::from(body_bytes));
    next.run(request).await
}

fn non_blank_header<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    (!value.is_empty()).then_some(value)
}

/// `request.timestamp` (RFC 3339) from the JSON envelope.
fn declared_timestamp(body: &[u8]) -> Option<OffsetDateTime> {
    let envelope: RequestEnvelope = serde_json::from_slice(body).ok()?;
    OffsetDateTime::parse(&envelope.request.timestamp, &Rfc3339).ok()
}
