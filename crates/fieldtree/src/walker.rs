// crates/fieldtree/src/walker.rs
//! Bounded, pre-order traversal of a configuration subtree.
//!
//! Every direct child of the root is listed. Below that, only boxes and
//! terminals are listed, and the traversal stops two levels under the
//! devices. Nodes that are skipped by the type filter are still descended
//! into, so a terminal below an unlisted sub-item still shows up.

use crate::engine::{ConfigEngine, TreeNode};
use crate::error::{EngineError, SessionError};
use crate::log::{LogContext, my_debug, my_trace, my_warn};
use crate::node::{DeviceNode, join_path};
use crate::types::{Depth, TypeCode};
use core::fmt;

const CTX: LogContext = LogContext::new("walker", "walk");

/// A node that could not be read during a walk. The walk skips it (and its
/// subtree) and carries on with the next sibling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeUnreadable {
    /// Best-known path of the node, relative to the walked root.
    pub path: String,
    pub reason: String,
}

impl NodeUnreadable {
    fn new(path: String, err: EngineError) -> Self {
        Self {
            path,
            reason: err.message,
        }
    }
}

impl fmt::Display for NodeUnreadable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node '{}' unreadable: {}", self.path, self.reason)
    }
}

impl From<NodeUnreadable> for SessionError {
    fn from(err: NodeUnreadable) -> Self {
        SessionError::NodeUnreadable {
            path: err.path,
            reason: err.reason,
        }
    }
}

/// One level of the traversal: the remaining children of a node.
struct Frame<N: TreeNode> {
    depth: Depth,
    parent_path: String,
    children: N::Children,
}

/// Lazy walker over a subtree.
///
/// Yields `Ok(DeviceNode)` for every listed node in pre-order and
/// `Err(NodeUnreadable)` for every node that failed to read. The iterator is
/// finite and cannot be restarted; walk again to see a changed tree.
pub struct TreeWalker<N: TreeNode> {
    stack: Vec<Frame<N>>,
    pending: Option<NodeUnreadable>,
}

impl<N: TreeNode> TreeWalker<N> {
    /// Starts a walk below `root`. The root itself is never listed.
    pub fn new(root: &N) -> Self {
        let mut walker = Self {
            stack: Vec::new(),
            pending: None,
        };
        match root.children() {
            Ok(children) => walker.stack.push(Frame {
                depth: Depth::Device,
                parent_path: String::new(),
                children,
            }),
            Err(e) => {
                let path = root.name().unwrap_or_default();
                walker.pending = Some(NodeUnreadable::new(path, e));
            }
        }
        walker
    }

    fn read_meta(node: &N) -> Result<(String, TypeCode), EngineError> {
        Ok((node.name()?, node.type_code()?))
    }
}

impl<N: TreeNode> Iterator for TreeWalker<N> {
    type Item = Result<DeviceNode<N>, NodeUnreadable>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending.take() {
            return Some(Err(err));
        }

        loop {
            let frame = self.stack.last_mut()?;
            let depth = frame.depth;
            let next = frame.children.next();
            let Some(next) = next else {
                self.stack.pop();
                continue;
            };
            let parent_path = frame.parent_path.clone();

            // 1. Resolve the child handle and its metadata.
            let child = match next {
                Ok(child) => child,
                Err(e) => {
                    my_warn!(CTX, "Skipping unreadable child of '{}': {}", parent_path, e);
                    return Some(Err(NodeUnreadable::new(parent_path, e)));
                }
            };
            let (name, type_code) = match Self::read_meta(&child) {
                Ok(meta) => meta,
                Err(e) => {
                    let path = child.path_name().unwrap_or_else(|_| parent_path.clone());
                    my_warn!(CTX, "Skipping unreadable node '{}': {}", path, e);
                    return Some(Err(NodeUnreadable::new(path, e)));
                }
            };
            let path = join_path(&parent_path, &name);

            // 2. Queue the next level before emitting, so the walk stays pre-order.
            if let Some(next_depth) = depth.next() {
                match child.children() {
                    Ok(children) => self.stack.push(Frame {
                        depth: next_depth,
                        parent_path: path.clone(),
                        children,
                    }),
                    Err(e) => {
                        my_warn!(CTX, "Cannot enumerate children of '{}': {}", path, e);
                        self.pending = Some(NodeUnreadable::new(path.clone(), e));
                    }
                }
            }

            // 3. Apply the type filter for this depth.
            if depth.admits(type_code) {
                my_trace!(CTX, "{:?} {} (Type: {})", depth, path, type_code);
                return Some(Ok(DeviceNode {
                    handle: child,
                    name,
                    type_code,
                    depth,
                    parent_path,
                }));
            }
            my_debug!(CTX, "Not listing '{}' (Type: {}) at {:?}", path, type_code, depth);

            if let Some(err) = self.pending.take() {
                return Some(Err(err));
            }
        }
    }
}

/// Resolves a well-known root and starts a walk below it.
///
/// A key that does not resolve is reported as [`SessionError::RootNotFound`],
/// distinct from per-node read failures.
pub fn walk_root<E: ConfigEngine>(
    engine: &E,
    key: &str,
) -> Result<TreeWalker<E::Node>, SessionError> {
    match engine.lookup(key) {
        Ok(Some(root)) => Ok(TreeWalker::new(&root)),
        Ok(None) => Err(SessionError::RootNotFound { key: key.to_owned() }),
        Err(e) => {
            my_warn!(CTX, "Lookup of '{}' failed: {}", key, e);
            Err(SessionError::RootNotFound { key: key.to_owned() })
        }
    }
}
