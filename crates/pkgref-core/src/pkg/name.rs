//! npm package name validation.
//!
//! Implements the rules npm applies to names of already-published
//! packages ("valid for old packages"): these are the names that can
//! appear in a manifest or lockfile, so style-only rules such as
//! "no uppercase" or the 214-character limit are not enforced.

use std::fmt;

/// Name validation error codes.
pub mod codes {
    pub const NAME_EMPTY: &str = "NAME_EMPTY";
    pub const NAME_LEADING_DOT: &str = "NAME_LEADING_DOT";
    pub const NAME_LEADING_UNDERSCORE: &str = "NAME_LEADING_UNDERSCORE";
    pub const NAME_SURROUNDING_SPACE: &str = "NAME_SURROUNDING_SPACE";
    pub const NAME_BLOCKED: &str = "NAME_BLOCKED";
    pub const NAME_NOT_URL_SAFE: &str = "NAME_NOT_URL_SAFE";
}

/// Names that can never be package names.
const BLOCKED_NAMES: &[&str] = &["node_modules", "favicon.ico"];

/// Package name validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameError {
    code: &'static str,
    message: String,
}

impl NameError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Get the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for NameError {}

/// Validate a package name.
///
/// # Errors
/// Returns an error describing the first rule the name breaks.
pub fn validate_package_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::new(codes::NAME_EMPTY, "Empty package name"));
    }

    if name.starts_with('.') {
        return Err(NameError::new(
            codes::NAME_LEADING_DOT,
            format!("Package name cannot start with a period: '{name}'"),
        ));
    }

    if name.starts_with('_') {
        return Err(NameError::new(
            codes::NAME_LEADING_UNDERSCORE,
            format!("Package name cannot start with an underscore: '{name}'"),
        ));
    }

    if name.trim() != name {
        return Err(NameError::new(
            codes::NAME_SURROUNDING_SPACE,
            format!("Package name cannot contain leading or trailing spaces: '{name}'"),
        ));
    }

    if BLOCKED_NAMES.iter().any(|b| b.eq_ignore_ascii_case(name)) {
        return Err(NameError::new(
            codes::NAME_BLOCKED,
            format!("'{name}' is not a valid package name"),
        ));
    }

    if is_url_safe(name) {
        return Ok(());
    }

    // Scoped: @scope/name, both halves URL-safe
    if let Some((scope, pkg)) = split_scoped(name) {
        if is_url_safe(scope) && is_url_safe(pkg) {
            return Ok(());
        }
    }

    Err(NameError::new(
        codes::NAME_NOT_URL_SAFE,
        format!("Package name can only contain URL-friendly characters: '{name}'"),
    ))
}

/// Check a package name without building an error.
#[must_use]
pub fn is_valid_package_name(name: &str) -> bool {
    validate_package_name(name).is_ok()
}

/// Split `@scope/name` into `("scope", "name")`.
///
/// Returns `None` for unscoped names or malformed scopes.
#[must_use]
pub fn split_scoped(name: &str) -> Option<(&str, &str)> {
    let rest = name.strip_prefix('@')?;
    let (scope, pkg) = rest.split_once('/')?;
    if scope.is_empty() || pkg.is_empty() || pkg.contains('/') {
        return None;
    }
    Some((scope, pkg))
}

/// Path segments of a package name inside `node_modules`.
///
/// `lodash` → `["lodash"]`, `@types/node` → `["@types", "node"]`.
#[must_use]
pub fn name_segments(name: &str) -> Vec<&str> {
    if name.starts_with('@') {
        name.split('/').collect()
    } else {
        vec![name]
    }
}

/// Characters left untouched by `encodeURIComponent`.
fn is_url_safe(s: &str) -> bool {
    s.bytes().all(|b| {
        b.is_ascii_alphanumeric()
            || matches!(b, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in [
            "lodash",
            "react-dom",
            "@types/node",
            "@babel/core",
            "lodash.merge",
            "CamelCase",
            "1.0.0",
            "under_score",
            "crazy!(name)*",
        ] {
            assert!(is_valid_package_name(name), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_names() {
        let cases = [
            ("", codes::NAME_EMPTY),
            (".bin", codes::NAME_LEADING_DOT),
            (".package-lock.json", codes::NAME_LEADING_DOT),
            ("_private", codes::NAME_LEADING_UNDERSCORE),
            (" lodash", codes::NAME_SURROUNDING_SPACE),
            ("node_modules", codes::NAME_BLOCKED),
            ("FAVICON.ICO", codes::NAME_BLOCKED),
            ("^4.17.21", codes::NAME_NOT_URL_SAFE),
            ("foo/bar", codes::NAME_NOT_URL_SAFE),
            ("@scope/", codes::NAME_NOT_URL_SAFE),
            ("@/name", codes::NAME_NOT_URL_SAFE),
            ("@a/b/c", codes::NAME_NOT_URL_SAFE),
            ("**/foo", codes::NAME_NOT_URL_SAFE),
            ("node_modules/a", codes::NAME_NOT_URL_SAFE),
            ("foo@1.0.0", codes::NAME_NOT_URL_SAFE),
        ];
        for (name, code) in cases {
            let err = validate_package_name(name).unwrap_err();
            assert_eq!(err.code(), code, "name: {name:?}");
        }
    }

    #[test]
    fn test_error_display_has_code() {
        let err = validate_package_name("").unwrap_err();
        assert!(err.to_string().starts_with(codes::NAME_EMPTY));
    }

    #[test]
    fn test_split_scoped() {
        assert_eq!(split_scoped("@types/node"), Some(("types", "node")));
        assert_eq!(split_scoped("lodash"), None);
        assert_eq!(split_scoped("@types"), None);
        assert_eq!(split_scoped("@a/b/c"), None);
    }

    #[test]
    fn test_name_segments() {
        assert_eq!(name_segments("lodash"), vec!["lodash"]);
        assert_eq!(name_segments("@types/node"), vec!["@types", "node"]);
    }

    #[test]
    fn test_error_codes_uppercase() {
        let all_codes = [
            codes::NAME_EMPTY,
            codes::NAME_LEADING_DOT,
            codes::NAME_LEADING_UNDERSCORE,
            codes::NAME_SURROUNDING_SPACE,
            codes::NAME_BLOCKED,
            codes::NAME_NOT_URL_SAFE,
        ];

        for code in all_codes {
            assert!(
                code.chars().all(|c| c.is_uppercase() || c == '_'),
                "Error code '{code}' should be SCREAMING_SNAKE_CASE"
            );
        }
    }
}
