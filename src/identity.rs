//! Client identity derivation and token encoding
//!
//! An [`Identity`] is an opaque 64-bit value derived deterministically from
//! a request's user-agent and source address. The derivation uses a fixed
//! algorithm (SHA-256 folded to 64 bits) so the same client metadata yields
//! the same identity across process restarts and instances. Identities are
//! equality-comparable and not reversible; collisions are possible but
//! negligible for counting purposes.

use base64::prelude::*;
use sha2::{Digest, Sha256};

/// Hashed in place of a missing `User-Agent` header (common-log-format
/// convention for an absent field).
const MISSING_USER_AGENT: &str = "-";

/// Opaque, fixed-width client identity used for hit deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity(u64);

impl Identity {
    /// Serialize to the token form carried in the client's cookie.
    pub fn to_token(self) -> String {
        BASE64_URL_SAFE_NO_PAD.encode(self.0.to_be_bytes())
    }

    /// Decode a previously issued token back into an identity.
    ///
    /// Returns `None` for anything that is not the URL-safe base64 form of
    /// exactly eight bytes; callers treat such values as no token at all.
    pub fn from_token(token: &str) -> Option<Self> {
        let bytes = BASE64_URL_SAFE_NO_PAD.decode(token).ok()?;
        let raw: [u8; 8] = bytes.try_into().ok()?;
        Some(Self(u64::from_be_bytes(raw)))
    }
}

/// Derive the identity for a request from its metadata.
///
/// The source is the raw `X-Forwarded-For` value when present, falling back
/// to the socket's remote address. A missing user-agent degrades to a fixed
/// sentinel rather than an error. Same inputs always yield the same
/// identity.
pub fn resolve(
    user_agent: Option<&str>,
    forwarded_for: Option<&str>,
    remote_addr: &str,
) -> Identity {
    let agent_hash = stable_hash(user_agent.unwrap_or(MISSING_USER_AGENT).as_bytes());
    let source = forwarded_for.unwrap_or(remote_addr);
    let source_hash = stable_hash(source.as_bytes());

    Identity(stable_hash(
        &agent_hash.wrapping_add(source_hash).to_be_bytes(),
    ))
}

/// First eight bytes of SHA-256 as a big-endian integer. Stable across
/// processes and platforms, unlike the seeded std `Hasher` implementations.
fn stable_hash(input: &[u8]) -> u64 {
    let digest = Sha256::digest(input);
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_resolve_is_deterministic() {
        let first = resolve(Some("Mozilla/5.0"), None, "198.51.100.7");
        for _ in 0..50 {
            assert_eq!(resolve(Some("Mozilla/5.0"), None, "198.51.100.7"), first);
        }
    }

    #[test]
    fn test_resolve_distinguishes_clients() {
        let a = resolve(Some("UA1"), None, "1.2.3.4");
        let b = resolve(Some("UA2"), None, "5.6.7.8");
        assert_ne!(a, b);

        // Same address, different agent still differs
        let c = resolve(Some("UA2"), None, "1.2.3.4");
        assert_ne!(a, c);
    }

    #[test]
    fn test_forwarded_for_takes_precedence_over_remote_addr() {
        let behind_proxy_a = resolve(Some("UA1"), Some("203.0.113.9"), "10.0.0.1");
        let behind_proxy_b = resolve(Some("UA1"), Some("203.0.113.9"), "10.0.0.2");
        assert_eq!(
            behind_proxy_a, behind_proxy_b,
            "remote address must be ignored when a forwarded address is present"
        );

        let direct = resolve(Some("UA1"), None, "10.0.0.1");
        assert_ne!(behind_proxy_a, direct);
    }

    #[test]
    fn test_missing_user_agent_uses_sentinel() {
        let missing = resolve(None, None, "1.2.3.4");
        let sentinel = resolve(Some(MISSING_USER_AGENT), None, "1.2.3.4");
        assert_eq!(missing, sentinel);
    }

    #[test]
    fn test_token_round_trip() {
        let id = resolve(Some("UA1"), None, "1.2.3.4");
        let token = id.to_token();
        assert_eq!(Identity::from_token(&token), Some(id));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        assert_eq!(Identity::from_token(""), None);
        assert_eq!(Identity::from_token("not base64!!"), None);
        // Valid base64 but the wrong number of bytes
        assert_eq!(Identity::from_token("AAAA"), None);
        assert_eq!(Identity::from_token(&"A".repeat(24)), None);
    }

    #[test]
    fn test_no_collisions_across_distinct_client_sample() {
        // Sanity check over well past 100 pairs, not a uniqueness proof
        let mut seen = HashSet::new();
        let mut pairs = 0;

        for agent in 0..12 {
            for host in 0..10 {
                let user_agent = format!("agent/{agent}.0");
                let addr = format!("192.0.2.{host}");
                seen.insert(resolve(Some(&user_agent), None, &addr));
                pairs += 1;
            }
        }

        assert!(pairs >= 100);
        assert_eq!(seen.len(), pairs, "sampled identities should be pairwise distinct");
    }
}
