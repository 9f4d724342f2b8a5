//! Version string to ordinal version code.

/// Returned when a version string yields no usable numeric components.
/// Previously published metadata used the same sentinel, so it must stay
/// `1` for update ordering to remain consistent.
const SENTINEL: u64 = 1;

/// Derives a monotonic version code from a free-form version string:
/// `major * 10000 + minor * 100 + patch` over the first three dotted
/// numeric components. Total: any unparseable input maps to the sentinel.
pub fn derive_code(version: &str) -> u64 {
    let cleaned: String = version
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return SENTINEL;
    }

    let mut parts = cleaned.split('.');
    let mut next = || parts.next().and_then(|p| p.parse::<u64>().ok()).unwrap_or(0);
    let (major, minor, patch) = (next(), next(), next());

    major
        .saturating_mul(10_000)
        .saturating_add(minor.saturating_mul(100))
        .saturating_add(patch)
}
