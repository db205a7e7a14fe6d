//! VersionStamp (C2): opaque version tokens for secret revisions.
//!
//! A stamp is a 64-bit value — upper 48 bits millisecond wallclock since
//! epoch, lower 16 bits a per-process counter — serialized as 16 lowercase
//! hex chars. Lexicographic order matches creation order within a process;
//! cross-process collisions are possible and are resolved by the store's
//! unique `(seriesId, version)` index rejecting the duplicate.

use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU16 = AtomicU16::new(0);

/// Generates a new version stamp.
pub struct VersionStamp;

impl VersionStamp {
    /// Generate a new stamp as 16 lowercase hex chars.
    pub fn generate() -> String {
        Self::generate_at(now_millis())
    }

    fn generate_at(millis: u64) -> String {
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
        let stamp = ((millis & 0xFFFF_FFFF_FFFF) << 16) | counter as u64;
        format!("{:016x}", stamp)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_lowercase_hex_chars() {
        let s = VersionStamp::generate();
        assert_eq!(s.len(), 16);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn monotone_within_process() {
        let mut prev = VersionStamp::generate();
        for _ in 0..1000 {
            let next = VersionStamp::generate();
            assert!(next > prev, "{} should sort after {}", next, prev);
            prev = next;
        }
    }

    #[test]
    fn counter_wraps_without_panicking() {
        for _ in 0..(u16::MAX as u32 + 10) {
            let _ = VersionStamp::generate();
        }
    }
}
