use sha2::{Digest, Sha256};

/// Derive a visitor ID from IP and User-Agent.
///
/// Formula: sha256(ip + user_agent)[0..8] encoded as 16 hex chars.
///
/// There is no salt, so the same client maps to the same record across days
/// and restarts. Truncation means unrelated clients can collide; the ID is a
/// coarse dedup key, not an identity.
pub fn derive_visitor_id(ip: &str, user_agent: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(user_agent.as_bytes());
    let hash = hasher.finalize();
    // First 8 bytes → 16 hex characters.
    hex::encode(&hash[..8])
}

/// Extract the host from a full referrer URL.
///
/// Returns `None` if referrer is empty or cannot be parsed to a non-empty host.
pub fn extract_referrer_domain(referrer: &str) -> Option<String> {
    let referrer = referrer.trim();
    if referrer.is_empty() {
        return None;
    }
    let stripped = referrer
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let host = stripped.split(['/', '?', '#']).next()?;
    // Drop any userinfo and port.
    let host = host.rsplit('@').next()?;
    let host = host.split(':').next()?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}
