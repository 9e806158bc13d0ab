//! `package-lock.json` / `npm-shrinkwrap.json` layouts.
//!
//! A lockfile carries either a flat `packages` map keyed by install path
//! (lockfile v2/v3, and the hidden `node_modules/.package-lock.json`) or a
//! nested `dependencies` tree keyed by package name (lockfile v1). The
//! top-level property containing the match decides which rules apply.

use super::package_json::match_dependency_field;
use super::{ManifestDialect, NODE_MODULES};
use crate::json::{CodeRange, JsonDocument, NodeId, NodeMatch};
use crate::pkg::name::{is_valid_package_name, name_segments};
use std::path::{Path, PathBuf};

/// Top-level key of the flat install-path map.
pub const PACKAGES: &str = "packages";
/// Top-level key of the nested tree, and of each nested package's children.
pub const DEPENDENCIES: &str = "dependencies";
/// Per-package `name → range` map in the nested tree.
pub const REQUIRES: &str = "requires";

const VERSION: &str = "version";
const NODE_MODULES_PREFIX: &str = "node_modules/";

/// A package name found in a lockfile, before filesystem resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LockMatch {
    pub dialect: ManifestDialect,
    pub start_dir: PathBuf,
    pub version: Option<String>,
    pub ancestors: Vec<String>,
}

/// Split a flat-map install path into the containing path and the package name.
///
/// `node_modules/a/node_modules/@s/b` → `("node_modules/a", "@s/b")`,
/// `packages/app/node_modules/x` → `("packages/app", "x")`,
/// `node_modules/a` → `("", "a")`. Paths without a `node_modules/`
/// segment (workspace entries, the root `""`) yield `None`.
#[must_use]
pub fn split_install_path(key: &str) -> Option<(&str, &str)> {
    let index = key
        .rmatch_indices(NODE_MODULES_PREFIX)
        .map(|(i, _)| i)
        .find(|&i| i == 0 || key.as_bytes()[i - 1] == b'/')?;
    let container = key[..index].trim_end_matches('/');
    let name = &key[index + NODE_MODULES_PREFIX.len()..];
    (!name.is_empty()).then_some((container, name))
}

/// Classify a match inside a lockfile whose paths are relative to `lock_dir`.
pub(crate) fn classify(
    doc: &JsonDocument,
    hit: NodeMatch,
    name: &str,
    target: CodeRange,
    lock_dir: &Path,
) -> Option<LockMatch> {
    let top = doc.child_of_scope(doc.root(), hit.node)?;
    if top == hit.node {
        return None;
    }

    match doc.key(top)? {
        PACKAGES => classify_flat_map(doc, top, hit, name, target, lock_dir),
        DEPENDENCIES => classify_tree(doc, hit, name, lock_dir),
        _ => None,
    }
}

fn classify_flat_map(
    doc: &JsonDocument,
    packages: NodeId,
    hit: NodeMatch,
    name: &str,
    target: CodeRange,
    lock_dir: &Path,
) -> Option<LockMatch> {
    let node = doc.node(hit.node);

    // "packages" > "node_modules/a/node_modules/b"
    if node.parent == Some(packages) {
        if !hit.is_key() || !node.is_object() {
            return None;
        }
        let (container, package) = split_install_path(node.key.as_deref()?)?;
        if package != name {
            return None;
        }
        return Some(LockMatch {
            dialect: ManifestDialect::LockfileFlatMap,
            start_dir: join_relative(lock_dir, container),
            version: version_of(doc, hit.node),
            ancestors: Vec::new(),
        });
    }

    // "packages" > "<entry>" > "dependencies" > "c"
    let entry = doc.child_of_scope(packages, hit.node)?;
    let found = match_dependency_field(doc, entry, hit, name, target)?;
    let entry_key = doc.key(entry)?;
    Some(LockMatch {
        dialect: ManifestDialect::LockfileFlatMap,
        start_dir: join_relative(lock_dir, entry_key),
        version: found.version,
        ancestors: Vec::new(),
    })
}

fn classify_tree(
    doc: &JsonDocument,
    hit: NodeMatch,
    name: &str,
    lock_dir: &Path,
) -> Option<LockMatch> {
    let node = doc.node(hit.node);
    if !hit.is_key() || !node.has_key(name) {
        return None;
    }
    let container = node.parent?;
    let container_key = doc.key(container)?;

    let version = if container_key == DEPENDENCIES && node.is_object() {
        version_of(doc, hit.node)
    } else if container_key == REQUIRES && node.is_scalar() {
        node.as_str().map(String::from)
    } else {
        return None;
    };

    let ancestors = tree_ancestors(doc, container)?;
    Some(LockMatch {
        dialect: ManifestDialect::LockfileTree,
        start_dir: nested_start_dir(lock_dir, &ancestors),
        version,
        ancestors,
    })
}

/// Names of the packages enclosing a `dependencies`/`requires` object, outermost first.
///
/// Each level of the tree is `package object → dependencies object →
/// package object`, so the owner of a container is its parent and the
/// next container is the owner's parent. Returns `None` when the shape
/// breaks or an ancestor is not a valid package name.
fn tree_ancestors(doc: &JsonDocument, container: NodeId) -> Option<Vec<String>> {
    let mut names = Vec::new();
    let mut container = container;

    loop {
        let owner = doc.parent(container)?;
        if owner == doc.root() {
            break;
        }
        let owner_name = doc.key(owner)?;
        if !is_valid_package_name(owner_name) {
            return None;
        }
        names.push(owner_name.to_string());

        container = doc.parent(owner)?;
        if !doc.node(container).has_key(DEPENDENCIES) {
            return None;
        }
    }

    names.reverse();
    Some(names)
}

/// `<lock_dir>/node_modules/<a1>/node_modules/<a2>/.../node_modules`
fn nested_start_dir(lock_dir: &Path, ancestors: &[String]) -> PathBuf {
    let mut dir = lock_dir.join(NODE_MODULES);
    for ancestor in ancestors {
        dir.extend(name_segments(ancestor));
        dir.push(NODE_MODULES);
    }
    dir
}

fn join_relative(base: &Path, relative: &str) -> PathBuf {
    if relative.is_empty() {
        base.to_path_buf()
    } else {
        base.join(relative)
    }
}

fn version_of(doc: &JsonDocument, package: NodeId) -> Option<String> {
    let version = doc.property(package, VERSION)?;
    doc.node(version).as_str().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::{locate, JsonParser, RangedJsonParser};

    fn quoted(text: &str, needle: &str, nth: usize) -> CodeRange {
        let quoted = format!("\"{needle}\"");
        let start = text.match_indices(&quoted).nth(nth).unwrap().0 + 1;
        CodeRange::new(start, start + needle.len())
    }

    fn classify_at(text: &str, needle: &str, name: &str, nth: usize) -> Option<LockMatch> {
        let doc = RangedJsonParser.parse(text).unwrap();
        let target = quoted(text, needle, nth);
        let hit = locate(&doc, target)?;
        classify(&doc, hit, name, target, Path::new("/proj"))
    }

    const FLAT: &str = r#"{
  "name": "app",
  "lockfileVersion": 3,
  "packages": {
    "": { "name": "app", "dependencies": { "a": "^1.0.0" } },
    "node_modules/a": { "version": "1.2.0", "dependencies": { "b": "^2.0.0" } },
    "node_modules/a/node_modules/b": {
      "version": "2.1.0",
      "dependencies": { "c": "^1.0.0" },
      "peerDependencies": { "d": "*" }
    },
    "node_modules/@scope/pkg": { "version": "0.1.0" },
    "packages/app/node_modules/x": { "version": "3.0.0" },
    "packages/app": { "name": "ws", "version": "0.0.0" }
  }
}"#;

    #[test]
    fn test_split_install_path() {
        assert_eq!(split_install_path("node_modules/a"), Some(("", "a")));
        assert_eq!(
            split_install_path("node_modules/a/node_modules/@s/b"),
            Some(("node_modules/a", "@s/b"))
        );
        assert_eq!(
            split_install_path("packages/app/node_modules/x"),
            Some(("packages/app", "x"))
        );
        assert_eq!(split_install_path("packages/app"), None);
        assert_eq!(split_install_path("my_node_modules/x"), None);
        assert_eq!(split_install_path("node_modules/"), None);
        assert_eq!(split_install_path(""), None);
    }

    #[test]
    fn test_flat_key_nested_install() {
        let found = classify_at(FLAT, "node_modules/a/node_modules/b", "b", 0).unwrap();
        assert_eq!(found.dialect, ManifestDialect::LockfileFlatMap);
        assert_eq!(found.start_dir, PathBuf::from("/proj/node_modules/a"));
        assert_eq!(found.version.as_deref(), Some("2.1.0"));
    }

    #[test]
    fn test_flat_key_top_level_and_scoped() {
        let found = classify_at(FLAT, "node_modules/a", "a", 0).unwrap();
        assert_eq!(found.start_dir, PathBuf::from("/proj"));
        assert_eq!(found.version.as_deref(), Some("1.2.0"));

        let found = classify_at(FLAT, "node_modules/@scope/pkg", "@scope/pkg", 0).unwrap();
        assert_eq!(found.start_dir, PathBuf::from("/proj"));
    }

    #[test]
    fn test_flat_key_workspace_install() {
        let found = classify_at(FLAT, "packages/app/node_modules/x", "x", 0).unwrap();
        assert_eq!(found.start_dir, PathBuf::from("/proj/packages/app"));
    }

    #[test]
    fn test_flat_key_without_node_modules() {
        assert!(classify_at(FLAT, "packages/app", "packages/app", 0).is_none());
    }

    #[test]
    fn test_flat_embedded_dependency() {
        let found = classify_at(FLAT, "c", "c", 0).unwrap();
        assert_eq!(
            found.start_dir,
            PathBuf::from("/proj/node_modules/a/node_modules/b")
        );
        assert_eq!(found.version.as_deref(), Some("^1.0.0"));

        let found = classify_at(FLAT, "d", "d", 0).unwrap();
        assert!(found.start_dir.ends_with("node_modules/a/node_modules/b"));
    }

    #[test]
    fn test_flat_root_entry_dependency() {
        // first "a" is the root entry's dependency key
        let found = classify_at(FLAT, "a", "a", 0).unwrap();
        assert_eq!(found.start_dir, PathBuf::from("/proj"));
        assert_eq!(found.version.as_deref(), Some("^1.0.0"));
    }

    #[test]
    fn test_flat_non_references() {
        assert!(classify_at(FLAT, "packages", "packages", 0).is_none());
        assert!(classify_at(FLAT, "version", "version", 0).is_none());
        assert!(classify_at(FLAT, "2.1.0", "2.1.0", 0).is_none());
        // root "name" property
        assert!(classify_at(FLAT, "app", "app", 0).is_none());
    }

    const TREE: &str = r#"{
  "name": "app",
  "lockfileVersion": 1,
  "requires": true,
  "dependencies": {
    "a": {
      "version": "1.0.0",
      "requires": { "b": "^2.0.0" },
      "dependencies": {
        "b": {
          "version": "2.0.0",
          "dependencies": { "@s/c": { "version": "3.0.0" } }
        }
      }
    },
    "dependencies": { "version": "0.1.0" }
  }
}"#;

    #[test]
    fn test_tree_lockfile_example() {
        let text = r#"{"dependencies":{"a":{"dependencies":{"b":{}}}}}"#;
        let found = classify_at(text, "b", "b", 0).unwrap();
        assert_eq!(found.dialect, ManifestDialect::LockfileTree);
        assert_eq!(found.ancestors, vec!["a".to_string()]);
        assert!(found.start_dir.ends_with("node_modules/a/node_modules"));
        assert_eq!(found.version, None);
    }

    #[test]
    fn test_tree_top_level_package() {
        let found = classify_at(TREE, "a", "a", 0).unwrap();
        assert!(found.ancestors.is_empty());
        assert_eq!(found.start_dir, PathBuf::from("/proj/node_modules"));
        assert_eq!(found.version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_tree_deep_scoped_ancestors() {
        let found = classify_at(TREE, "@s/c", "@s/c", 0).unwrap();
        assert_eq!(found.ancestors, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            found.start_dir,
            PathBuf::from("/proj/node_modules/a/node_modules/b/node_modules")
        );
        assert_eq!(found.version.as_deref(), Some("3.0.0"));
    }

    #[test]
    fn test_tree_requires_uses_enclosing_package() {
        // first "b" is the requires key
        let found = classify_at(TREE, "b", "b", 0).unwrap();
        assert_eq!(found.ancestors, vec!["a".to_string()]);
        assert_eq!(found.start_dir, PathBuf::from("/proj/node_modules/a/node_modules"));
        assert_eq!(found.version.as_deref(), Some("^2.0.0"));

        // second "b" is the nested install
        let nested = classify_at(TREE, "b", "b", 1).unwrap();
        assert_eq!(nested.start_dir, found.start_dir);
        assert_eq!(nested.version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_tree_package_named_dependencies() {
        // the fourth "dependencies" is a package of that name in the top-level tree
        let found = classify_at(TREE, "dependencies", "dependencies", 3).unwrap();
        assert!(classify_at(TREE, "dependencies", "dependencies", 1).is_none());
        assert!(found.ancestors.is_empty());
        assert_eq!(found.version.as_deref(), Some("0.1.0"));
    }

    #[test]
    fn test_tree_non_references() {
        // the "requires": true flag at the root
        assert!(classify_at(TREE, "requires", "requires", 0).is_none());
        assert!(classify_at(TREE, "version", "version", 0).is_none());
        assert!(classify_at(TREE, "^2.0.0", "^2.0.0", 0).is_none());
    }
}
