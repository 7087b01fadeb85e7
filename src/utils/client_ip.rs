//! Client address extraction for access logging.

use axum::http::HeaderMap;
use std::net::SocketAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Resolves the client IP address of a request.
///
/// When `behind_proxy` is set, the first entry of `X-Forwarded-For` wins, then
/// `X-Real-IP`. Otherwise, and when neither header is usable, the peer address
/// of the TCP connection is used.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// let ip = client_ip(&headers, "10.0.0.1:5000".parse().unwrap(), true);
/// assert_eq!(ip, "203.0.113.7");
/// ```
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy && let Some(ip) = forwarded_ip(headers) {
        return ip;
    }

    peer.ip().to_string()
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let from_forwarded_for = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let from_real_ip = || {
        headers
            .get(X_REAL_IP)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    };

    from_forwarded_for.or_else(from_real_ip).map(str::to_string)
}
