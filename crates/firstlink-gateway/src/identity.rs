//! Visitor identity for the per-visitor policy.
//!
//! Every header consulted here is set by the client or an intermediate
//! proxy and can be spoofed. The identity is an approximation used to
//! spread first visits across callers, not a security boundary.

use axum::http::HeaderMap;
use firstlink_core::VisitorId;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";
pub const CF_CONNECTING_IP: &str = "cf-connecting-ip";

/// Derives a visitor identity from request headers. Never fails.
///
/// Precedence, first present wins:
/// 1. `x-forwarded-for`, the client-facing hop before the first comma, trimmed
/// 2. `x-real-ip`, verbatim
/// 3. `cf-connecting-ip`, verbatim
/// 4. the loopback sentinel `127.0.0.1`
///
/// A header that is not valid UTF-8, or an `x-forwarded-for` whose first hop
/// is blank, counts as absent. Oversized values are digested by
/// [`VisitorId::new`].
pub fn extract_identity(headers: &HeaderMap) -> VisitorId {
    if let Some(client) = header_str(headers, X_FORWARDED_FOR)
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|client| !client.is_empty())
    {
        return VisitorId::new(client);
    }

    [X_REAL_IP, CF_CONNECTING_IP]
        .into_iter()
        .find_map(|name| header_str(headers, name))
        .map(VisitorId::new)
        .unwrap_or_else(VisitorId::loopback)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
