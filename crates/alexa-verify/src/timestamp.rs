// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Request-timestamp freshness.
//!
//! An old, otherwise-valid signed request can be replayed byte-for-byte;
//! the declared timestamp bounds how long such a replay stays viable.

use time::{Duration, OffsetDateTime};

/// The platform's documented anti-replay window.
pub const DEFAULT_TIMESTAMP_TOLERANCE: Duration = Duration::seconds(150);

/// Whether `declared` is within `tolerance` of `now`, in either direction.
///
/// Exactly at the tolerance edge is accepted. `now` is wall-clock time
/// sampled at validation, not request-arrival time.
pub fn is_within_tolerance(
    declared: OffsetDateTime,
    now: OffsetDateTime,
    tolerance: Duration,
) -> bool {
    (declared - now).abs() <= tolerance
}
