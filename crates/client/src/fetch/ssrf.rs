//! SSRF (Server-Side Request Forgery) protection.
//!
//! The preview endpoint fetches whatever URL a caller hands it, so targets
//! are resolved up front and refused when any address is private, internal,
//! or reserved.
use std::net::{IpAddr, Ipv4Addr};

use ipnet::Ipv4Net;
use url::{Host, Url};

/// Error type for SSRF validation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SsrfError {
    #[error("blocked IP: {0} (private/reserved)")]
    BlockedIp(IpAddr),

    #[error("DNS resolution failed: {0}")]
    DnsError(String),

    #[error("no host in URL")]
    MissingHost,
}

/// Shared address space (RFC 6598) and benchmarking (RFC 2544) ranges,
/// which std does not classify.
fn in_extra_reserved_v4(v4: Ipv4Addr) -> bool {
    [(Ipv4Addr::new(100, 64, 0, 0), 10), (Ipv4Addr::new(198, 18, 0, 0), 15)]
        .into_iter()
        .filter_map(|(addr, prefix)| Ipv4Net::new(addr, prefix).ok())
        .any(|net| net.contains(&v4))
}

/// Check if an IP address is private, reserved, or otherwise blocked.
///
/// This covers:
/// - Loopback addresses (127.0.0.0/8, ::1)
/// - RFC 1918 private ranges (10/8, 172.16/12, 192.168/16)
/// - Shared address space (100.64/10) and benchmarking (198.18/15)
/// - Link-local addresses (169.254/16, fe80::/10)
/// - Multicast addresses (224/4, ff00::/8)
/// - Unspecified addresses (0.0.0.0/8, ::)
/// - IPv6 unique local (fc00::/7)
/// - IPv4-mapped IPv6 addresses whose IPv4 part is any of the above
pub fn is_private_or_reserved(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_multicast()
                || v4.is_broadcast()
                || v4.is_unspecified()
                || v4.octets()[0] == 0
                || in_extra_reserved_v4(v4)
        }
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_private_or_reserved(IpAddr::V4(mapped));
            }
            v6.is_loopback()
                || v6.is_multicast()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

/// Validate that an IP address is not private or reserved.
///
/// Returns an error if the IP is blocked.
pub fn validate_ip(ip: IpAddr) -> Result<(), SsrfError> {
    if is_private_or_reserved(ip) { Err(SsrfError::BlockedIp(ip)) } else { Ok(()) }
}

/// Validate an IP-literal host without touching DNS.
///
/// Domain hosts return `Ok(())`; they are checked by [`check_host`].
pub fn validate_literal_host(url: &Url) -> Result<(), SsrfError> {
    match url.host() {
        Some(Host::Ipv4(v4)) => validate_ip(IpAddr::V4(v4)),
        Some(Host::Ipv6(v6)) => validate_ip(IpAddr::V6(v6)),
        Some(Host::Domain(_)) => Ok(()),
        None => Err(SsrfError::MissingHost),
    }
}

/// Resolve the URL's host and validate every A/AAAA answer.
pub async fn check_host(url: &Url) -> Result<(), SsrfError> {
    let domain = match url.host() {
        Some(Host::Domain(domain)) => domain,
        Some(_) => return validate_literal_host(url),
        None => return Err(SsrfError::MissingHost),
    };
    let port = url.port_or_known_default().unwrap_or(443);

    let addrs = tokio::net::lookup_host((domain, port))
        .await
        .map_err(|e| SsrfError::DnsError(format!("{domain}: {e}")))?;

    let mut resolved = 0usize;
    for addr in addrs {
        validate_ip(addr.ip())?;
        resolved += 1;
    }

    if resolved == 0 {
        return Err(SsrfError::DnsError(format!("{domain}: no addresses")));
    }

    Ok(())
}
