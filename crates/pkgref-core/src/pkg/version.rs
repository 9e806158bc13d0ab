//! Declared-range checks against installed versions.
//!
//! npm range syntax is a superset of what the `semver` crate accepts, so
//! ranges are normalized first (hyphen ranges, x-ranges, space-separated
//! comparators, `||` alternatives).

use semver::{Version, VersionReq};

/// Check an installed version against a declared range.
///
/// Returns `None` when the question cannot be decided: the installed
/// version is not semver, or the declared spec is not a range at all
/// (`file:`, `git+https:`, `npm:` aliases, dist-tags such as `latest`).
#[must_use]
pub fn version_satisfies(installed: &str, declared: &str) -> Option<bool> {
    let version = Version::parse(installed.trim().trim_start_matches('v')).ok()?;
    let declared = declared.trim();

    if declared.is_empty() || declared == "*" {
        return Some(true);
    }
    if is_non_range_spec(declared) {
        return None;
    }

    let mut any_parsed = false;
    for alt in declared.split("||").map(str::trim) {
        if alt.is_empty() {
            // "" alternative means any version
            return Some(true);
        }
        if let Some(req) = parse_range(alt) {
            any_parsed = true;
            if req.matches(&version) {
                return Some(true);
            }
        }
    }

    any_parsed.then_some(false)
}

/// Specs that name a source rather than a version range.
fn is_non_range_spec(spec: &str) -> bool {
    const PREFIXES: &[&str] = &[
        "file:",
        "link:",
        "workspace:",
        "npm:",
        "git+",
        "git:",
        "github:",
        "http:",
        "https:",
        "portal:",
        "patch:",
    ];
    PREFIXES.iter().any(|p| spec.starts_with(p)) || spec.contains('/')
}

/// Parse a single range alternative, handling npm-specific syntax.
///
/// Handles:
/// - Standard semver ranges: ^1.0.0, ~1.0.0, >=1.0.0, etc.
/// - Hyphen ranges: 1.0.0 - 2.0.0
/// - X-ranges: 1.x, 1.0.x, *
/// - Space-separated comparators: >= 2.1.2 < 3.0.0
fn parse_range(range: &str) -> Option<VersionReq> {
    let range = range.trim();

    if let Some((start, end)) = parse_hyphen_range(range) {
        return VersionReq::parse(&format!(">={start}, <={end}")).ok();
    }

    if range == "*" || range.split('.').any(|p| matches!(p, "x" | "X" | "*")) {
        return VersionReq::parse(&convert_x_range(range)).ok();
    }

    let converted = convert_space_separated_comparators(range);
    VersionReq::parse(&converted).ok()
}

/// Parse a hyphen range like "1.0.0 - 2.0.0".
fn parse_hyphen_range(range: &str) -> Option<(&str, &str)> {
    let (start, end) = range.split_once(" - ")?;
    let (start, end) = (start.trim(), end.trim());
    (!start.is_empty() && !end.is_empty() && !end.contains(" - ")).then_some((start, end))
}

/// Convert x-range to a comparator pair.
fn convert_x_range(range: &str) -> String {
    let range = range.trim_start_matches(['=', 'v']);
    let parts: Vec<&str> = range.split('.').collect();

    match parts.as_slice() {
        ["*" | "x" | "X", ..] => ">=0.0.0".to_string(),
        [major, "*" | "x" | "X", ..] => match major.parse::<u64>() {
            Ok(m) => format!(">={m}.0.0, <{}.0.0", m + 1),
            Err(_) => range.to_string(),
        },
        [major, minor, "*" | "x" | "X"] => match (major.parse::<u64>(), minor.parse::<u64>()) {
            (Ok(m), Ok(n)) => format!(">={m}.{n}.0, <{m}.{}.0", n + 1),
            _ => range.to_string(),
        },
        _ => range.replace(['x', 'X'], "0"),
    }
}

/// Convert space-separated comparators to comma-separated.
///
/// npm reads ">= 2.1.2 < 3.0.0" as ">=2.1.2 AND <3.0.0"; `semver` wants
/// ">=2.1.2, <3.0.0". Operators separated from their version by a space
/// are glued back on.
fn convert_space_separated_comparators(range: &str) -> String {
    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op = String::new();

    for token in range.split_whitespace() {
        if token.chars().any(|c| c.is_ascii_digit()) {
            let comparator = format!("{pending_op}{token}");
            pending_op.clear();
            comparators.push(if comparator.starts_with(|c: char| c.is_ascii_digit() || c == 'v') {
                bare_version(&comparator)
            } else {
                comparator
            });
        } else {
            pending_op.push_str(token);
        }
    }
    if !pending_op.is_empty() {
        comparators.push(pending_op);
    }

    comparators.join(", ")
}

/// A bare version means an exact match when complete, an x-range otherwise.
///
/// `semver` reads a bare `1.2.3` as `^1.2.3`; npm reads it as `=1.2.3`.
fn bare_version(token: &str) -> String {
    let token = token.trim_start_matches('v');
    if token.split('.').count() >= 3 {
        format!("={token}")
    } else {
        convert_x_range(&format!("{token}.x"))
    }
}
