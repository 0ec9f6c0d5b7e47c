// ─── Version Comparison ───
// Numeric, component-wise ordering for loader and game versions.

use std::cmp::Ordering;

/// Numeric components of the dotted core of a version string.
///
/// Build metadata (`+build.7`) and pre-release text (`-rc.1`) are dropped
/// before splitting; a component that does not start with a digit counts as 0.
fn parse_numeric_version_parts(raw: &str) -> Vec<u64> {
    let core = raw.split('+').next().unwrap_or_default();
    let core = core.split('-').next().unwrap_or_default();

    core.split('.')
        .map(|segment| {
            let digits: String = segment.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<u64>().unwrap_or(0)
        })
        .collect()
}

/// Compare two versions numerically (`0.12.10 > 0.12.5`).
///
/// Missing trailing components are treated as zero, so `1.8` equals `1.8.0`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_parts = parse_numeric_version_parts(a.trim());
    let b_parts = parse_numeric_version_parts(b.trim());

    let max_len = a_parts.len().max(b_parts.len());
    for idx in 0..max_len {
        let a_val = a_parts.get(idx).copied().unwrap_or(0);
        let b_val = b_parts.get(idx).copied().unwrap_or(0);
        match a_val.cmp(&b_val) {
            Ordering::Equal => continue,
            non_eq => return non_eq,
        }
    }

    Ordering::Equal
}

/// Release versions are plain dotted numbers, optionally with `+build` metadata;
/// anything else (`23w13a`, `1.20-pre1`, `1.14 Pre-Release 2`) is a snapshot.
pub fn is_snapshot(version: &str) -> bool {
    let version = version.trim();
    let version = version.split('+').next().unwrap_or_default();
    version.is_empty() || !version.chars().all(|c| c.is_ascii_digit() || c == '.')
}
