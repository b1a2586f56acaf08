//! Client IP resolution with proxy-header fallback.
//!
//! Proxy and CDN headers are consulted in trust order, and any candidate
//! taken from a header must be a syntactically valid public address. The
//! direct connection address is the transport-layer peer and is trusted
//! as-is.

use crate::request::RequestView;
use std::net::IpAddr;

/// Headers carrying a single candidate address, in trust order after
/// `X-Forwarded-For`.
const SINGLE_IP_HEADERS: &[&str] = &["CF-Connecting-IP", "X-Real-IP", "True-Client-IP"];

/// Resolve the best-guess client IP for a request view.
///
/// Priority order, first match wins:
/// 1. `X-Forwarded-For` — first public entry in the list.
/// 2. `CF-Connecting-IP` (Cloudflare).
/// 3. `X-Real-IP` (nginx).
/// 4. `True-Client-IP` (Akamai/Cloudflare).
/// 5. Direct connection address, unfiltered.
///
/// Returns `None` when no source yields an address; missing IPs are the
/// caller's decision to handle, not an error here.
#[must_use]
pub fn resolve(view: &RequestView) -> Option<String> {
    if let Some(forwarded) = view.header("X-Forwarded-For") {
        if let Some(ip) = first_public(&forwarded) {
            tracing::debug!(source = "X-Forwarded-For", ip = %ip, "resolved client ip");
            return Some(ip);
        }
    }

    for &name in SINGLE_IP_HEADERS {
        if let Some(candidate) = view.header(name) {
            if is_valid_public_ip(&candidate) {
                tracing::debug!(source = name, ip = %candidate, "resolved client ip");
                return Some(candidate);
            }
        }
    }

    let direct = view.remote_addr().filter(|addr| !addr.is_empty());
    if let Some(ip) = &direct {
        tracing::debug!(source = "remote_addr", ip = %ip, "resolved client ip");
    }
    direct
}

/// First syntactically valid public address in an `X-Forwarded-For` list.
fn first_public(header: &str) -> Option<String> {
    header
        .split(',')
        .map(str::trim)
        .find(|token| is_valid_public_ip(token))
        .map(ToString::to_string)
}

/// Valid IPv4/IPv6 syntax, outside every private/loopback/link-local range.
fn is_valid_public_ip(ip: &str) -> bool {
    ip.parse::<IpAddr>().is_ok() && !is_private(ip)
}

/// Textual range rules: `10.0.0.0/8`, `172.16.0.0/12`, `192.168.0.0/16`,
/// `127.0.0.0/8`, `::1`, `fc00::/7`, `fe80::/10`.
///
/// Matching is over the address text, applied only to strings that already
/// passed syntactic validation.
fn is_private(ip: &str) -> bool {
    if ip.starts_with("10.") || ip.starts_with("192.168.") || ip.starts_with("127.") {
        return true;
    }
    if ip == "::1" || ip.starts_with("fc00:") || ip.starts_with("fe80:") {
        return true;
    }
    is_private_172(ip)
}

/// `172.16.0.0/12` spans second octets 16 through 31.
fn is_private_172(ip: &str) -> bool {
    let Some(rest) = ip.strip_prefix("172.") else {
        return false;
    };
    let Some((octet, _)) = rest.split_once('.') else {
        return false;
    };
    matches!(octet.parse::<u8>(), Ok(16..=31))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn view_with_headers(entries: &[(&str, &str)]) -> RequestView {
        let map: HashMap<String, String> = entries
            .iter()
            .map(|(name, value)| {
                let key = format!("HTTP_{}", name.to_uppercase().replace('-', "_"));
                (key, (*value).to_string())
            })
            .collect();
        RequestView::ServerMap(map)
    }

    fn view_with_remote_addr(addr: &str) -> RequestView {
        let mut map = HashMap::new();
        map.insert("REMOTE_ADDR".to_string(), addr.to_string());
        RequestView::ServerMap(map)
    }

    #[test]
    fn test_forwarded_for_first_public_entry_wins() {
        let view = view_with_headers(&[("X-Forwarded-For", "10.0.0.5, 203.0.113.9")]);
        assert_eq!(resolve(&view), Some("203.0.113.9".to_string()));
    }

    #[test]
    fn test_forwarded_for_skips_invalid_tokens() {
        let view = view_with_headers(&[("X-Forwarded-For", "unknown, not-an-ip, 198.51.100.7")]);
        assert_eq!(resolve(&view), Some("198.51.100.7".to_string()));
    }

    #[test]
    fn test_forwarded_for_all_private_falls_through() {
        let view = view_with_headers(&[
            ("X-Forwarded-For", "10.0.0.5, 192.168.1.1, 172.31.0.2"),
            ("CF-Connecting-IP", "198.51.100.4"),
        ]);
        assert_eq!(resolve(&view), Some("198.51.100.4".to_string()));
    }

    #[test]
    fn test_cf_connecting_ip_without_forwarded_for() {
        let view = view_with_headers(&[("CF-Connecting-IP", "198.51.100.4")]);
        assert_eq!(resolve(&view), Some("198.51.100.4".to_string()));
    }

    #[test]
    fn test_x_real_ip_after_cf() {
        let view = view_with_headers(&[
            ("CF-Connecting-IP", "192.168.0.9"),
            ("X-Real-IP", "203.0.113.20"),
        ]);
        assert_eq!(resolve(&view), Some("203.0.113.20".to_string()));
    }

    #[test]
    fn test_true_client_ip_last_header() {
        let view = view_with_headers(&[("True-Client-IP", "203.0.113.21")]);
        assert_eq!(resolve(&view), Some("203.0.113.21".to_string()));
    }

    #[test]
    fn test_direct_fallback_is_unfiltered() {
        // The peer address comes from the transport layer, not a header, so
        // private ranges are acceptable there.
        assert_eq!(
            resolve(&view_with_remote_addr("192.0.2.1")),
            Some("192.0.2.1".to_string())
        );
        assert_eq!(
            resolve(&view_with_remote_addr("192.168.1.10")),
            Some("192.168.1.10".to_string())
        );
    }

    #[test]
    fn test_no_source_resolves_to_none() {
        let view = RequestView::ServerMap(HashMap::new());
        assert_eq!(resolve(&view), None);
    }

    #[test]
    fn test_ipv6_private_ranges_rejected_in_headers() {
        for ip in ["::1", "fc00::1", "fe80::1234"] {
            let view = view_with_headers(&[("X-Real-IP", ip)]);
            assert_eq!(resolve(&view), None, "{ip} should not be selected");
        }
    }

    #[test]
    fn test_public_ipv6_accepted() {
        let view = view_with_headers(&[("X-Real-IP", "2001:db8::1")]);
        assert_eq!(resolve(&view), Some("2001:db8::1".to_string()));
    }

    #[test]
    fn test_172_range_boundaries() {
        assert!(is_private("172.16.0.1"));
        assert!(is_private("172.31.255.255"));
        assert!(!is_private("172.15.0.1"));
        assert!(!is_private("172.32.0.1"));
    }

    fn private_ip_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(a, b, c)| format!("10.{a}.{b}.{c}")),
            (16u8..=31, any::<u8>(), any::<u8>())
                .prop_map(|(b, c, d)| format!("172.{b}.{c}.{d}")),
            (any::<u8>(), any::<u8>()).prop_map(|(c, d)| format!("192.168.{c}.{d}")),
            (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(b, c, d)| format!("127.{b}.{c}.{d}")),
            Just("::1".to_string()),
            any::<u16>().prop_map(|s| format!("fc00::{s:x}")),
            any::<u16>().prop_map(|s| format!("fe80::{s:x}")),
        ]
    }

    proptest! {
        // No private/loopback/link-local address may ever be selected out of
        // a proxy header, whichever header carries it.
        #[test]
        fn prop_private_ips_never_selected_from_headers(
            ip in private_ip_strategy(),
            header_index in 0usize..4,
        ) {
            let header = ["X-Forwarded-For", "CF-Connecting-IP", "X-Real-IP", "True-Client-IP"]
                [header_index];
            let view = view_with_headers(&[(header, ip.as_str())]);
            prop_assert_eq!(resolve(&view), None);
        }

        // A public address after any run of private entries is still found.
        #[test]
        fn prop_public_entry_found_after_private(ip in private_ip_strategy()) {
            let value = format!("{ip}, 203.0.113.9");
            let view = view_with_headers(&[("X-Forwarded-For", value.as_str())]);
            prop_assert_eq!(resolve(&view), Some("203.0.113.9".to_string()));
        }
    }
}
