//! URL gate for SSRF protection.

use ipnet::IpNet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::sync::LazyLock;
use tracing::warn;
use url::{Host, Url};

use crate::error::{SecurityError, SecurityResult};

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

const LOOPBACK_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

static LOOPBACK_RANGES: LazyLock<Vec<IpNet>> =
    LazyLock::new(|| cidrs(&["127.0.0.0/8", "::1/128"]));

static LINK_LOCAL_RANGES: LazyLock<Vec<IpNet>> = LazyLock::new(|| {
    cidrs(&[
        "169.254.0.0/16", // Link-local / cloud metadata
        "fe80::/10",
    ])
});

static PRIVATE_RANGES: LazyLock<Vec<IpNet>> = LazyLock::new(|| {
    cidrs(&[
        "0.0.0.0/8",
        "10.0.0.0/8",
        "172.16.0.0/12",
        "192.168.0.0/16",
        "192.0.0.0/24",
        "198.18.0.0/15",
        "240.0.0.0/4",
        "::/128",
        "fc00::/7", // IPv6 unique local
    ])
});

static SCHEME_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9+.\-]*):").expect("scheme pattern is valid")
});

fn cidrs(ranges: &[&str]) -> Vec<IpNet> {
    ranges
        .iter()
        .map(|r| r.parse().expect("CIDR literal is valid"))
        .collect()
}

/// Why the gate refused a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    SchemeMissing,
    SchemeDisallowed,
    HostnameMissing,
    Loopback,
    PrivateNetwork,
    LinkLocal,
    MalformedUrl,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::SchemeMissing => "missing scheme (http:// or https://)",
            Self::SchemeDisallowed => "scheme not allowed, only HTTP/HTTPS permitted",
            Self::HostnameMissing => "missing hostname",
            Self::Loopback => "loopback address",
            Self::PrivateNetwork => "private network address",
            Self::LinkLocal => "link-local address",
            Self::MalformedUrl => "malformed URL",
        };
        f.write_str(text)
    }
}

/// Outcome of [`UrlGate::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityVerdict {
    Allowed,
    Rejected(RejectReason),
}

impl SecurityVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Self::Allowed => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }
}

/// A URL that passed the gate.
///
/// Scheme is always `http` or `https` and the hostname is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalUrl {
    scheme: String,
    hostname: String,
    port: Option<u16>,
    original: String,
}

impl CanonicalUrl {
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Explicit port, or the scheme's default.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// The URL exactly as supplied by the caller.
    pub fn as_str(&self) -> &str {
        &self.original
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// URL validator for SSRF protection.
///
/// Rejects, before any network access:
/// - Non-HTTP(S) schemes (file://, ftp://, javascript:)
/// - Loopback hosts (localhost, 127.0.0.1, ::1)
/// - Private IP ranges (10.x, 172.16-31.x, 192.168.x, fc00::/7)
/// - Link-local / cloud metadata ranges (169.254.x, fe80::/10)
///
/// The gate holds no state, so one instance can serve any number of
/// concurrent callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlGate;

impl UrlGate {
    pub fn new() -> Self {
        Self
    }

    /// Classify a URL without raising.
    pub fn validate(&self, url: &str) -> SecurityVerdict {
        match classify(url) {
            Ok(_) => SecurityVerdict::Allowed,
            Err(reason) => SecurityVerdict::Rejected(reason),
        }
    }

    /// Validate a URL, returning its canonical form or a security error.
    pub fn check(&self, url: &str) -> SecurityResult<CanonicalUrl> {
        classify(url).map_err(|reason| {
            warn!(url = %url, reason = %reason, "URL rejected by security gate");
            SecurityError::Rejected {
                url: url.to_string(),
                reason,
            }
        })
    }
}

fn classify(url: &str) -> Result<CanonicalUrl, RejectReason> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(error) => return Err(classify_parse_failure(url, error)),
    };

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(RejectReason::SchemeDisallowed);
    }

    let (hostname, ip) = match parsed.host() {
        None => return Err(RejectReason::HostnameMissing),
        Some(Host::Domain(domain)) => (domain.trim_end_matches('.').to_ascii_lowercase(), None),
        Some(Host::Ipv4(addr)) => (addr.to_string(), Some(IpAddr::V4(addr))),
        Some(Host::Ipv6(addr)) => (addr.to_string(), Some(IpAddr::V6(addr))),
    };

    if hostname.is_empty() {
        return Err(RejectReason::HostnameMissing);
    }

    if LOOPBACK_HOSTS.contains(&hostname.as_str()) {
        return Err(RejectReason::Loopback);
    }

    let ip = ip.or_else(|| hostname.parse::<IpAddr>().ok());
    if let Some(reason) = ip.and_then(classify_ip) {
        return Err(reason);
    }

    if let Some(reason) = classify_hostname_prefix(&hostname) {
        return Err(reason);
    }

    Ok(CanonicalUrl {
        scheme: parsed.scheme().to_string(),
        hostname,
        port: parsed.port_or_known_default(),
        original: url.to_string(),
    })
}

/// Map a parse failure onto a reason, keeping the scheme check ahead of the
/// hostname check even when the parser bails out first.
fn classify_parse_failure(url: &str, error: url::ParseError) -> RejectReason {
    if let Some(caps) = SCHEME_PREFIX.captures(url) {
        let scheme = caps[1].to_ascii_lowercase();
        if !ALLOWED_SCHEMES.contains(&scheme.as_str()) {
            return RejectReason::SchemeDisallowed;
        }
    }

    match error {
        url::ParseError::RelativeUrlWithoutBase => RejectReason::SchemeMissing,
        url::ParseError::EmptyHost => RejectReason::HostnameMissing,
        _ => RejectReason::MalformedUrl,
    }
}

fn classify_ip(ip: IpAddr) -> Option<RejectReason> {
    if let IpAddr::V6(v6) = ip {
        if let Some(v4) = v6.to_ipv4_mapped() {
            return classify_ip(IpAddr::V4(v4));
        }
    }

    if LOOPBACK_RANGES.iter().any(|net| net.contains(&ip)) {
        Some(RejectReason::Loopback)
    } else if LINK_LOCAL_RANGES.iter().any(|net| net.contains(&ip)) {
        Some(RejectReason::LinkLocal)
    } else if PRIVATE_RANGES.iter().any(|net| net.contains(&ip)) {
        Some(RejectReason::PrivateNetwork)
    } else {
        None
    }
}

/// Textual checks for hosts that look like IP literals but did not parse as one.
fn classify_hostname_prefix(hostname: &str) -> Option<RejectReason> {
    if hostname.starts_with("169.254.") {
        return Some(RejectReason::LinkLocal);
    }
    if hostname.starts_with("10.") || hostname.starts_with("192.168.") {
        return Some(RejectReason::PrivateNetwork);
    }
    if let Some(rest) = hostname.strip_prefix("172.") {
        let second = rest.split('.').next().and_then(|s| s.parse::<i64>().ok());
        if matches!(second, Some(16..=31)) {
            return Some(RejectReason::PrivateNetwork);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reason(url: &str) -> Option<RejectReason> {
        UrlGate::new().validate(url).reason()
    }

    #[test]
    fn test_allows_public_urls() {
        let gate = UrlGate::new();
        assert_eq!(gate.validate("https://example.com"), SecurityVerdict::Allowed);
        assert!(gate.validate("http://google.com/").is_allowed());
        assert!(gate.validate("https://eventtechlive.com/agenda?day=1").is_allowed());
        assert!(gate.validate("http://8.8.8.8/").is_allowed());
    }

    #[test]
    fn test_blocks_localhost() {
        assert_eq!(reason("http://localhost:8080"), Some(RejectReason::Loopback));
        assert_eq!(reason("http://127.0.0.1/"), Some(RejectReason::Loopback));
        assert_eq!(reason("http://[::1]/"), Some(RejectReason::Loopback));
        assert_eq!(reason("http://127.1.2.3/"), Some(RejectReason::Loopback));
        assert_eq!(reason("http://LOCALHOST./"), Some(RejectReason::Loopback));
    }

    #[test]
    fn test_blocks_private_ips() {
        assert_eq!(reason("http://192.168.1.1"), Some(RejectReason::PrivateNetwork));
        assert_eq!(reason("http://10.0.0.1/"), Some(RejectReason::PrivateNetwork));
        assert_eq!(reason("http://172.16.0.1/"), Some(RejectReason::PrivateNetwork));
        assert_eq!(reason("http://172.31.255.255/"), Some(RejectReason::PrivateNetwork));
        assert_eq!(reason("http://0.0.0.0/"), Some(RejectReason::PrivateNetwork));
        assert_eq!(reason("http://[fd00::1]/"), Some(RejectReason::PrivateNetwork));
    }

    #[test]
    fn test_allows_public_172_neighbours() {
        assert!(UrlGate::new().validate("http://172.15.0.1/").is_allowed());
        assert!(UrlGate::new().validate("http://172.32.0.1/").is_allowed());
    }

    #[test]
    fn test_blocks_metadata_services() {
        assert_eq!(reason("http://169.254.169.254/"), Some(RejectReason::LinkLocal));
        assert_eq!(reason("http://[fe80::1]/"), Some(RejectReason::LinkLocal));
    }

    #[test]
    fn test_ipv4_mapped_addresses_use_embedded_address() {
        assert_eq!(reason("http://[::ffff:127.0.0.1]/"), Some(RejectReason::Loopback));
        assert_eq!(
            reason("http://[::ffff:10.0.0.5]/"),
            Some(RejectReason::PrivateNetwork)
        );
    }

    #[test]
    fn test_textual_prefixes_catch_non_ip_hosts() {
        assert_eq!(reason("http://10.internal.example/"), Some(RejectReason::PrivateNetwork));
        assert_eq!(reason("http://192.168.lan/"), Some(RejectReason::PrivateNetwork));
        assert_eq!(reason("http://172.20.corp/"), Some(RejectReason::PrivateNetwork));
        assert_eq!(reason("http://169.254.meta/"), Some(RejectReason::LinkLocal));
        assert!(UrlGate::new().validate("http://172.example.com/").is_allowed());
    }

    #[test]
    fn test_blocks_non_http() {
        assert_eq!(reason("file:///etc/passwd"), Some(RejectReason::SchemeDisallowed));
        assert_eq!(reason("ftp://example.com/"), Some(RejectReason::SchemeDisallowed));
        assert_eq!(reason("ftp://"), Some(RejectReason::SchemeDisallowed));
        assert_eq!(reason("javascript:alert(1)"), Some(RejectReason::SchemeDisallowed));
        assert_eq!(reason("data:text/html,hi"), Some(RejectReason::SchemeDisallowed));
    }

    #[test]
    fn test_rejects_missing_scheme_and_host() {
        assert_eq!(reason("example.com"), Some(RejectReason::SchemeMissing));
        assert_eq!(reason("//example.com/path"), Some(RejectReason::SchemeMissing));
        assert_eq!(reason("http://"), Some(RejectReason::HostnameMissing));
        assert_eq!(reason("not a url"), Some(RejectReason::SchemeMissing));
    }

    #[test]
    fn test_rejects_malformed_urls() {
        assert_eq!(reason("http://exa mple.com/"), Some(RejectReason::MalformedUrl));
        assert_eq!(reason("https://example.com:99999/"), Some(RejectReason::MalformedUrl));
    }

    #[test]
    fn test_check_returns_canonical_url() {
        let canonical = UrlGate::new().check("https://Example.COM:8443/x").unwrap();
        assert_eq!(canonical.scheme(), "https");
        assert_eq!(canonical.hostname(), "example.com");
        assert_eq!(canonical.port(), Some(8443));
        assert_eq!(canonical.as_str(), "https://Example.COM:8443/x");

        let defaulted = UrlGate::new().check("http://example.com").unwrap();
        assert_eq!(defaulted.port(), Some(80));
    }

    #[test]
    fn test_check_reports_reason() {
        let err = UrlGate::new().check("http://localhost:8080").unwrap_err();
        assert_eq!(
            err,
            SecurityError::Rejected {
                url: "http://localhost:8080".to_string(),
                reason: RejectReason::Loopback,
            }
        );
    }

    proptest! {
        #[test]
        fn prop_private_ipv4_rejected(b in 0u8..=255, c in 0u8..=255, d in 0u8..=255) {
            prop_assert_eq!(reason(&format!("http://10.{b}.{c}.{d}/")), Some(RejectReason::PrivateNetwork));
            prop_assert_eq!(reason(&format!("https://192.168.{c}.{d}/")), Some(RejectReason::PrivateNetwork));
            prop_assert_eq!(reason(&format!("http://169.254.{c}.{d}:8080/")), Some(RejectReason::LinkLocal));
            prop_assert_eq!(reason(&format!("http://127.{b}.{c}.{d}/")), Some(RejectReason::Loopback));
        }

        #[test]
        fn prop_172_private_block(second in 16u8..=31, c in 0u8..=255, d in 0u8..=255) {
            prop_assert_eq!(reason(&format!("http://172.{second}.{c}.{d}/")), Some(RejectReason::PrivateNetwork));
        }

        #[test]
        fn prop_validate_is_deterministic(url in "\\PC{0,40}") {
            let gate = UrlGate::new();
            prop_assert_eq!(gate.validate(&url), gate.validate(&url));
        }
    }
}
