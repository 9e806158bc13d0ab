//! Detect which package manager a project uses.

use crate::manifest::{NPM_SHRINKWRAP_JSON, PACKAGE_JSON, PACKAGE_LOCK_JSON};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    /// Candidates in match order.
    pub const ALL: [PackageManager; 3] = [Self::Npm, Self::Yarn, Self::Pnpm];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker files checked when the manifest names no package manager.
const MARKERS: &[(&str, PackageManager)] = &[
    ("node_modules/.package-lock.json", PackageManager::Npm),
    (PACKAGE_LOCK_JSON, PackageManager::Npm),
    ("yarn.lock", PackageManager::Yarn),
    ("pnpm-lock.yaml", PackageManager::Pnpm),
    (NPM_SHRINKWRAP_JSON, PackageManager::Npm),
    (".yarnrc.yml", PackageManager::Yarn),
];

/// Detect the package manager of the project at `root`.
///
/// Order of evidence:
/// 1. the `packageManager` field (`"pnpm@8.6.0"`)
/// 2. an `engines` entry naming a package manager
/// 3. lockfiles and config files in the project root
///
/// Returns `None` without a readable `package.json` or any evidence.
#[must_use]
pub fn detect_package_manager(root: &Path) -> Option<PackageManager> {
    let content = fs::read_to_string(root.join(PACKAGE_JSON)).ok()?;
    let manifest: Value = serde_json::from_str(&content).ok()?;

    if let Some(field) = manifest.get("packageManager").and_then(Value::as_str) {
        debug!(field, "packageManager field");
        // "<name>@<version>[+<hash>]"
        let name = field.split('@').next().unwrap_or_default().trim();
        return PackageManager::ALL
            .into_iter()
            .find(|pm| pm.as_str() == name);
    }

    if let Some(engines) = manifest.get("engines").and_then(Value::as_object) {
        return PackageManager::ALL
            .into_iter()
            .find(|pm| engines.get(pm.as_str()).is_some_and(is_truthy));
    }

    MARKERS.iter().find_map(|&(marker, pm)| {
        let found = marker
            .split('/')
            .fold(root.to_path_buf(), |path, segment| path.join(segment))
            .is_file();
        found.then_some(pm)
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn project(manifest: &str, files: &[&str]) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PACKAGE_JSON), manifest).unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        dir
    }

    #[test]
    fn test_package_manager_field() {
        let dir = project(r#"{"packageManager":"pnpm@8.6.0"}"#, &["yarn.lock"]);
        assert_eq!(detect_package_manager(dir.path()), Some(PackageManager::Pnpm));
    }

    #[test]
    fn test_package_manager_field_names_match_exactly() {
        let cases = [
            ("npm@10.2.4", Some(PackageManager::Npm)),
            ("yarn@4.0.2", Some(PackageManager::Yarn)),
            ("pnpm@9.1.0+sha256.abc", Some(PackageManager::Pnpm)),
            ("bun@1.1.0", None),
        ];
        for (field, expected) in cases {
            let dir = project(&format!(r#"{{"packageManager":"{field}"}}"#), &[]);
            assert_eq!(detect_package_manager(dir.path()), expected, "{field}");
        }
    }

    #[test]
    fn test_engines_field() {
        let dir = project(r#"{"engines":{"node":">=18","yarn":"^1.22.0"}}"#, &[]);
        assert_eq!(detect_package_manager(dir.path()), Some(PackageManager::Yarn));
    }

    #[test]
    fn test_marker_files() {
        let cases = [
            ("yarn.lock", PackageManager::Yarn),
            ("pnpm-lock.yaml", PackageManager::Pnpm),
            ("package-lock.json", PackageManager::Npm),
            ("node_modules/.package-lock.json", PackageManager::Npm),
            (".yarnrc.yml", PackageManager::Yarn),
        ];
        for (file, expected) in cases {
            let dir = project("{}", &[file]);
            assert_eq!(detect_package_manager(dir.path()), Some(expected), "{file}");
        }
    }

    #[test]
    fn test_no_evidence() {
        let dir = project("{}", &[]);
        assert_eq!(detect_package_manager(dir.path()), None);

        let empty = tempdir().unwrap();
        assert_eq!(detect_package_manager(empty.path()), None);
    }
}
