/// Request Origin Extraction
///
/// The origin recorded with each refresh record is the first hop listed in
/// `X-Forwarded-For` when a proxy supplied one, otherwise the peer address
/// of the connection without its port.

use actix_web::HttpRequest;
use std::net::{IpAddr, SocketAddr};

pub const FORWARDED_FOR_HEADER: &str = "X-Forwarded-For";

/// Used when neither a forwarded header nor a peer address is available
pub const UNKNOWN_ORIGIN: &str = "unknown";

/// Origin of an actix request
pub fn client_origin(req: &HttpRequest) -> String {
    let forwarded_for = req
        .headers()
        .get(FORWARDED_FOR_HEADER)
        .and_then(|h| h.to_str().ok());
    let peer = req.peer_addr().map(|addr| addr.to_string());

    resolve_origin(forwarded_for, peer.as_deref())
}

/// Resolve an origin from raw request metadata
///
/// `peer` may be `host:port`, `[v6]:port` or a bare address.
pub fn resolve_origin(forwarded_for: Option<&str>, peer: Option<&str>) -> String {
    if let Some(first_hop) = forwarded_for
        .and_then(|xff| xff.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
    {
        return first_hop.to_string();
    }

    match peer.map(str::trim).filter(|p| !p.is_empty()) {
        Some(peer) => strip_port(peer),
        None => UNKNOWN_ORIGIN.to_string(),
    }
}

fn strip_port(peer: &str) -> String {
    if let Ok(addr) = peer.parse::<SocketAddr>() {
        return addr.ip().to_string();
    }
    if let Ok(ip) = peer.parse::<IpAddr>() {
        return ip.to_string();
    }
    // hostname:port
    match peer.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host.to_string(),
        _ => peer.to_string(),
    }
}
