use std::net::IpAddr;

pub const UNKNOWN_LOCATION: &str = "Unknown";
pub const LOCAL_LOCATION: &str = "Local";

/// Resolves a client address to a coarse location label.
///
/// The label lands in both the visitor record's `location` and the daily
/// `countries` table, so implementations should return short, stable values
/// (an ISO country code, `Local`, `Unknown`).
pub trait GeoLocator: Send + Sync + 'static {
    fn locate(&self, ip: &str) -> String;
}

/// Locator with no database: `Local` for loopback and private ranges,
/// `Unknown` for everything else.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticGeoLocator;

impl GeoLocator for StaticGeoLocator {
    fn locate(&self, ip: &str) -> String {
        if is_local_address(ip) {
            LOCAL_LOCATION.to_string()
        } else {
            UNKNOWN_LOCATION.to_string()
        }
    }
}

/// True for loopback, private, link-local and unique-local addresses.
pub fn is_local_address(ip: &str) -> bool {
    let Ok(addr) = ip.trim().parse::<IpAddr>() else {
        return false;
    };
    match addr {
        IpAddr::V4(v4) => v4.is_loopback() || v4.is_private() || v4.is_link_local(),
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return mapped.is_loopback() || mapped.is_private() || mapped.is_link_local();
            }
            let first = v6.segments()[0];
            v6.is_loopback() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
    }
}
