//! Manifest dialects and the field classifiers.
//!
//! Dispatch is by exact file basename:
//! - `package.json` → dependency fields of the manifest
//! - `package-lock.json`, `npm-shrinkwrap.json` → flat `packages` map or nested tree
//! - `node_modules/.package-lock.json` → flat map, paths relative to the project

pub mod lockfile;
pub mod package_json;

use crate::json::{CodeRange, JsonDocument, NodeMatch};
use pkgref_util::fs::ends_with_segment;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::trace;

pub use lockfile::split_install_path;
pub use package_json::DEPENDENCY_FIELDS;

pub const PACKAGE_JSON: &str = "package.json";
pub const PACKAGE_LOCK_JSON: &str = "package-lock.json";
pub const NPM_SHRINKWRAP_JSON: &str = "npm-shrinkwrap.json";
pub const DOT_PACKAGE_LOCK_JSON: &str = ".package-lock.json";
pub const NODE_MODULES: &str = "node_modules";

/// Recognized manifest files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestFile {
    PackageJson,
    /// `package-lock.json` or `npm-shrinkwrap.json`.
    Lockfile,
    /// npm's hidden lockfile inside `node_modules`.
    DotLockfile,
}

impl ManifestFile {
    /// Pick the manifest kind from a path's basename.
    ///
    /// `.package-lock.json` only counts when it sits directly in a
    /// `node_modules` directory.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.file_name()?.to_str()? {
            PACKAGE_JSON => Some(Self::PackageJson),
            PACKAGE_LOCK_JSON | NPM_SHRINKWRAP_JSON => Some(Self::Lockfile),
            DOT_PACKAGE_LOCK_JSON => path
                .parent()
                .is_some_and(|dir| ends_with_segment(dir, NODE_MODULES))
                .then_some(Self::DotLockfile),
            _ => None,
        }
    }
}

/// The schema variant that produced a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestDialect {
    PackageJson,
    LockfileTree,
    LockfileFlatMap,
    DotLockfile,
}

impl ManifestDialect {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PackageJson => "package-json",
            Self::LockfileTree => "lockfile-tree",
            Self::LockfileFlatMap => "lockfile-flat-map",
            Self::DotLockfile => "dot-lockfile",
        }
    }
}

impl fmt::Display for ManifestDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cursor position identified as naming a package, not yet resolved on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageReference {
    pub package_name: String,
    /// Declared range, or the locked version for lockfile install entries.
    pub declared_version_range: Option<String>,
    /// Directory the upward `node_modules` walk starts from.
    pub resolution_start_dir: PathBuf,
    pub dialect: ManifestDialect,
    /// Range of the matched token (quotes excluded).
    pub range: CodeRange,
    /// Enclosing packages in a nested lockfile tree, outermost first.
    pub ancestors: Vec<String>,
}

/// Classify a located node as a package reference.
///
/// `name` is the candidate package name (already validated) and `range`
/// the token range `hit` was located from.
#[must_use]
pub fn classify(
    file: ManifestFile,
    file_path: &Path,
    doc: &JsonDocument,
    hit: NodeMatch,
    name: &str,
    range: CodeRange,
) -> Option<PackageReference> {
    let manifest_dir = file_path.parent().unwrap_or_else(|| Path::new(""));

    let found = match file {
        ManifestFile::PackageJson => {
            package_json::match_dependency_field(doc, doc.root(), hit, name, range).map(|m| {
                lockfile::LockMatch {
                    dialect: ManifestDialect::PackageJson,
                    start_dir: manifest_dir.to_path_buf(),
                    version: m.version,
                    ancestors: Vec::new(),
                }
            })
        }
        ManifestFile::Lockfile => lockfile::classify(doc, hit, name, range, manifest_dir),
        ManifestFile::DotLockfile => {
            // paths in the hidden lockfile are relative to the project, one level up
            let project_dir = manifest_dir.parent().unwrap_or_else(|| Path::new(""));
            lockfile::classify(doc, hit, name, range, project_dir).map(|m| lockfile::LockMatch {
                dialect: ManifestDialect::DotLockfile,
                ..m
            })
        }
    };

    let Some(found) = found else {
        trace!(path = %file_path.display(), package = name, "position is not a package reference");
        return None;
    };

    Some(PackageReference {
        package_name: name.to_string(),
        declared_version_range: found.version,
        resolution_start_dir: found.start_dir,
        dialect: found.dialect,
        range,
        ancestors: found.ancestors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::{locate, JsonParser, RangedJsonParser};

    fn classify_text(path: &str, text: &str, needle: &str) -> Option<PackageReference> {
        let start = text.find(&format!("\"{needle}\"")).unwrap() + 1;
        let range = CodeRange::new(start, start + needle.len());
        let doc = RangedJsonParser.parse(text).unwrap();
        let hit = locate(&doc, range)?;
        let file = ManifestFile::from_path(Path::new(path))?;
        classify(file, Path::new(path), &doc, hit, needle, range)
    }

    #[test]
    fn test_from_path_dispatch() {
        assert_eq!(
            ManifestFile::from_path(Path::new("/p/package.json")),
            Some(ManifestFile::PackageJson)
        );
        assert_eq!(
            ManifestFile::from_path(Path::new("/p/package-lock.json")),
            Some(ManifestFile::Lockfile)
        );
        assert_eq!(
            ManifestFile::from_path(Path::new("/p/npm-shrinkwrap.json")),
            Some(ManifestFile::Lockfile)
        );
        assert_eq!(
            ManifestFile::from_path(Path::new("/p/node_modules/.package-lock.json")),
            Some(ManifestFile::DotLockfile)
        );
        assert_eq!(ManifestFile::from_path(Path::new("/p/.package-lock.json")), None);
        assert_eq!(ManifestFile::from_path(Path::new("/p/Package.json")), None);
        assert_eq!(ManifestFile::from_path(Path::new("/p/tsconfig.json")), None);
    }

    #[test]
    fn test_package_json_reference() {
        let text = r#"{"dependencies":{"lodash":"^4.17.21"}}"#;
        let found = classify_text("/proj/app/package.json", text, "lodash").unwrap();
        assert_eq!(found.package_name, "lodash");
        assert_eq!(found.declared_version_range.as_deref(), Some("^4.17.21"));
        assert_eq!(found.resolution_start_dir, PathBuf::from("/proj/app"));
        assert_eq!(found.dialect, ManifestDialect::PackageJson);
        assert!(found.ancestors.is_empty());
    }

    #[test]
    fn test_lockfile_dialects() {
        let flat = r#"{"packages":{"node_modules/a":{"dependencies":{"b":"1"}}}}"#;
        let found = classify_text("/proj/package-lock.json", flat, "b").unwrap();
        assert_eq!(found.dialect, ManifestDialect::LockfileFlatMap);
        assert_eq!(found.resolution_start_dir, PathBuf::from("/proj/node_modules/a"));

        let tree = r#"{"dependencies":{"a":{"version":"1.0.0"}}}"#;
        let found = classify_text("/proj/npm-shrinkwrap.json", tree, "a").unwrap();
        assert_eq!(found.dialect, ManifestDialect::LockfileTree);
        assert_eq!(found.resolution_start_dir, PathBuf::from("/proj/node_modules"));
    }

    #[test]
    fn test_dot_lockfile_paths_relative_to_project() {
        let text = r#"{"packages":{"node_modules/a/node_modules/b":{"version":"2.0.0"}}}"#;
        let found = classify_text(
            "/proj/node_modules/.package-lock.json",
            text,
            "node_modules/a/node_modules/b",
        );
        // the candidate name is the install path's last package, not the raw key
        assert!(found.is_none());

        let start = text.find("node_modules/a/").unwrap();
        let range = CodeRange::new(start, start + "node_modules/a/node_modules/b".len());
        let doc = RangedJsonParser.parse(text).unwrap();
        let hit = locate(&doc, range).unwrap();
        let path = Path::new("/proj/node_modules/.package-lock.json");
        let found = classify(ManifestFile::DotLockfile, path, &doc, hit, "b", range).unwrap();
        assert_eq!(found.dialect, ManifestDialect::DotLockfile);
        assert_eq!(found.resolution_start_dir, PathBuf::from("/proj/node_modules/a"));
        assert_eq!(found.declared_version_range.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_dot_lockfile_embedded_dependency() {
        let text = r#"{"packages":{"node_modules/a":{"version":"1.0.0","dependencies":{"b":"^2.0.0"}}}}"#;
        let found = classify_text("/proj/node_modules/.package-lock.json", text, "b").unwrap();
        assert_eq!(found.dialect, ManifestDialect::DotLockfile);
        assert_eq!(found.package_name, "b");
        assert_eq!(found.resolution_start_dir, PathBuf::from("/proj/node_modules/a"));
        assert_eq!(found.declared_version_range.as_deref(), Some("^2.0.0"));
    }

    #[test]
    fn test_dialect_display() {
        assert_eq!(ManifestDialect::LockfileFlatMap.to_string(), "lockfile-flat-map");
        assert_eq!(
            serde_json::to_string(&ManifestDialect::DotLockfile).unwrap(),
            "\"dot-lockfile\""
        );
    }
}
