//! `package.json` dependency fields.
//!
//! The same rules apply to the root manifest and to each entry of a
//! lockfile's `packages` map, so matching takes the scope object
//! explicitly.

use crate::json::{CodeRange, JsonDocument, NodeId, NodeMatch};

/// Plain `name → range` maps.
pub const VERSIONED_FIELDS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
    "resolutions",
];

/// `name → options` maps; keys are package names, values are not ranges.
pub const META_FIELDS: &[&str] = &["dependenciesMeta", "peerDependenciesMeta"];

/// Arrays of package names.
pub const BUNDLED_FIELDS: &[&str] = &["bundledDependencies", "bundleDependencies"];

/// npm overrides; values may nest further overrides keyed by package name.
pub const OVERRIDES_FIELD: &str = "overrides";

/// Every dependency-bearing field name.
pub const DEPENDENCY_FIELDS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
    "resolutions",
    "bundledDependencies",
    "bundleDependencies",
    "dependenciesMeta",
    "peerDependenciesMeta",
    "overrides",
];

/// A package name found in a dependency field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldMatch {
    /// The dependency field containing the match.
    pub field: NodeId,
    /// Declared range, for plain maps only.
    pub version: Option<String>,
}

/// Classify `hit` against the dependency fields that are direct properties of `scope`.
pub(crate) fn match_dependency_field(
    doc: &JsonDocument,
    scope: NodeId,
    hit: NodeMatch,
    name: &str,
    target: CodeRange,
) -> Option<FieldMatch> {
    let field = doc.child_of_scope(scope, hit.node)?;
    if field == hit.node {
        // the field itself, not something inside it
        return None;
    }

    let field_node = doc.node(field);
    let field_name = field_node.key.as_deref()?;
    let node = doc.node(hit.node);
    let direct = node.parent == Some(field);

    if VERSIONED_FIELDS.contains(&field_name) {
        return (hit.is_key() && direct && node.is_scalar() && node.has_key(name)).then(|| {
            FieldMatch {
                field,
                version: node.as_str().map(String::from),
            }
        });
    }

    if META_FIELDS.contains(&field_name) {
        return (hit.is_key() && direct && node.has_key(name)).then_some(FieldMatch {
            field,
            version: None,
        });
    }

    if BUNDLED_FIELDS.contains(&field_name) {
        let is_item = !hit.is_key() && direct && field_node.is_array();
        return (is_item && node.as_str() == Some(name)).then_some(FieldMatch {
            field,
            version: None,
        });
    }

    if field_name == OVERRIDES_FIELD && hit.is_key() {
        return find_override(doc, field, name, target)
            .filter(|&found| found == hit.node)
            .map(|_| FieldMatch {
                field,
                version: None,
            });
    }

    None
}

/// Top-down search of an `overrides` object for the property named `name`
/// whose key range covers `target`.
///
/// Sibling ranges never overlap, so at most one property per level can
/// contain the target and the search follows a single path down. The walk
/// is a loop rather than recursion, so nesting depth is not bounded by the
/// call stack.
fn find_override(
    doc: &JsonDocument,
    overrides: NodeId,
    name: &str,
    target: CodeRange,
) -> Option<NodeId> {
    let mut current = overrides;

    'levels: loop {
        for &child in doc.node(current).children() {
            let node = doc.node(child);
            if node.has_key(name) && node.key_range.is_some_and(|r| r.contains_range(target)) {
                return Some(child);
            }
            if node.is_object() && node.value_range.contains_range(target) {
                current = child;
                continue 'levels;
            }
        }
        return None;
    }
}
