//! Per-IP rate limiting using a token bucket.

use axum::Router;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Bucket parameters for a group of routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Seconds between replenished tokens.
    pub per_second: u64,
    pub burst_size: u32,
}

/// Redirects, shortening, login and registration.
pub const PUBLIC: Limits = Limits {
    per_second: 2,
    burst_size: 100,
};

/// Authenticated link management.
pub const SECURE: Limits = Limits {
    per_second: 1,
    burst_size: 10,
};

fn governor<K: KeyExtractor>(
    key_extractor: K,
    limits: Limits,
) -> GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(key_extractor)
            .per_second(limits.per_second)
            .burst_size(limits.burst_size)
            .finish()
            .expect("rate limit period and burst size must be non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

/// Wraps `router` in a rate limiter keyed by client IP.
///
/// Requests over the limit receive `429 Too Many Requests`. With
/// `behind_proxy` the key comes from `X-Forwarded-For` / `X-Real-IP` /
/// `Forwarded`; otherwise from the socket peer address, which requires the
/// server to be run with connect info.
///
/// # Example
///
/// ```rust,ignore
/// let protected = rate_limit::apply(api::routes::protected_routes(), rate_limit::SECURE, false);
/// ```
pub fn apply<S>(router: Router<S>, limits: Limits, behind_proxy: bool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    if behind_proxy {
        router.layer(governor(SmartIpKeyExtractor, limits))
    } else {
        router.layer(governor(PeerIpKeyExtractor, limits))
    }
}
