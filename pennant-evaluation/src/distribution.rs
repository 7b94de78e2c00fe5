//! Percentage rollout bucketing.
//!
//! A target's bucket is derived from a SHA-256 digest of
//! `"{flag}:{attribute}:{value}"`, so the same target always lands in the
//! same bucket of a given flag in every process, while separate flags with
//! the same weights pick independent populations.

use crate::flag::Distribution;
use crate::target::Target;
use sha2::{Digest, Sha256};

/// Number of buckets; distribution weights are percentages.
pub const BUCKET_COUNT: u32 = 100;

/// Stable bucket in `[0, BUCKET_COUNT)` for an attribute value of a flag.
pub fn bucket_of(flag: &str, attribute: &str, value: &str) -> u32 {
    let mut hasher = Sha256::new();
    hasher.update(flag.as_bytes());
    hasher.update(b":");
    hasher.update(attribute.as_bytes());
    hasher.update(b":");
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();

    let prefix = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    prefix % BUCKET_COUNT
}

/// Pick the variation of `flag` a target falls into.
///
/// Uses the distribution's `bucket_by` attribute, or `fallback_attribute`
/// when the target does not carry it. Walks the weighted list until the
/// running total exceeds the bucket; if weights sum to less than the
/// bucket, the last variation is served. Returns `None` only for an empty
/// distribution or a target with neither attribute.
pub fn bucket<'d>(
    flag: &str,
    distribution: &'d Distribution,
    target: &Target,
    fallback_attribute: &str,
) -> Option<&'d str> {
    let (attribute, value) = match target.attribute_text(&distribution.bucket_by) {
        Some(value) => (distribution.bucket_by.as_str(), value),
        None => (fallback_attribute, target.attribute_text(fallback_attribute)?),
    };

    let bucket = bucket_of(flag, attribute, &value);

    let mut total = 0u32;
    for weighted in &distribution.variations {
        total = total.saturating_add(weighted.weight);
        if bucket < total {
            return Some(weighted.variation.as_str());
        }
    }

    distribution
        .variations
        .last()
        .map(|weighted| weighted.variation.as_str())
}
