// crates/fieldtree/src/node.rs
//! Immutable snapshot of a listed tree node.

use crate::engine::TreeNode;
use crate::types::{Depth, PATH_SEPARATOR, TypeCode};

/// One listed node of the configuration tree.
///
/// Created by the walker, never mutated, and dropped wholesale whenever the
/// tree is walked again. The handle is a reference into the engine and must
/// not outlive the configuration it came from.
#[derive(Debug, Clone)]
pub struct DeviceNode<N> {
    pub handle: N,
    pub name: String,
    pub type_code: TypeCode,
    pub depth: Depth,
    /// Names of the ancestors below the walked root joined with `^`; empty
    /// at depth 0.
    pub parent_path: String,
}

impl<N: TreeNode> DeviceNode<N> {
    /// Checklist label: `"{name} ({typeCode})"`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.type_code)
    }

    /// Path of this node relative to the walked root.
    pub fn path(&self) -> String {
        join_path(&self.parent_path, &self.name)
    }
}

pub(crate) fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_owned()
    } else {
        format!("{parent}{PATH_SEPARATOR}{name}")
    }
}
