//! Position indexer: find the node whose key or value range equals a target.

use super::ast::{CodeRange, JsonDocument, NodeId};
use serde::Serialize;

/// Which range of the node matched the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Key,
    Value,
}

/// Result of [`locate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeMatch {
    pub node: NodeId,
    pub kind: MatchKind,
}

impl NodeMatch {
    #[must_use]
    pub fn is_key(&self) -> bool {
        self.kind == MatchKind::Key
    }
}

/// Locate the deepest node whose key range or value range equals `target`.
///
/// Descends from the root through the single child whose value range
/// contains `target`; sibling ranges never overlap, so at most one child
/// qualifies. A target that only overlaps a token (a partial selection, or
/// one straddling two siblings) yields `None`.
#[must_use]
pub fn locate(doc: &JsonDocument, target: CodeRange) -> Option<NodeMatch> {
    let mut current = doc.root();
    let root = doc.get(current)?;
    if root.value_range == target {
        return Some(NodeMatch {
            node: current,
            kind: MatchKind::Value,
        });
    }

    loop {
        let node = doc.node(current);
        if !node.is_composite() || !node.value_range.contains_range(target) {
            return None;
        }

        let mut next = None;
        for &child in node.children() {
            let child_node = doc.node(child);
            if child_node.key_range == Some(target) {
                return Some(NodeMatch {
                    node: child,
                    kind: MatchKind::Key,
                });
            }
            if child_node.value_range == target {
                return Some(NodeMatch {
                    node: child,
                    kind: MatchKind::Value,
                });
            }
            if child_node.value_range.contains_range(target) {
                next = Some(child);
                break;
            }
            // Children are in source order: once a child starts past the
            // target, no later sibling can contain it.
            if child_node.key_range.map_or(child_node.value_range.start, |r| r.start)
                >= target.end
            {
                break;
            }
        }

        current = next?;
    }
}
