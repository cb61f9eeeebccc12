// crates/fieldtree/src/checklist.rs
//! The presented list of togglable devices and its mapping to tree nodes.
//!
//! The checklist is rebuilt from scratch after every load, import or scan.
//! Entry ids carry the generation they were issued in, so an id handed out
//! before a rebuild can never address a node from the new tree.

use crate::engine::TreeNode;
use crate::fragment;
use crate::log::{LogContext, my_info, my_warn};
use crate::node::DeviceNode;
use crate::session::Transcript;
use crate::types::{Depth, TypeCode};
use crate::walker::TreeWalker;
use core::fmt;
use serde::Serialize;

const CTX: LogContext = LogContext::new("checklist", "rebuild");

/// Identifies one checklist entry within one checklist generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EntryId {
    pub generation: u32,
    pub index: u32,
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.generation, self.index)
    }
}

/// A presented, user-togglable mirror of one device node.
#[derive(Debug)]
pub struct ChecklistEntry<N> {
    pub id: EntryId,
    pub label: String,
    /// `true` means enabled.
    pub checked: bool,
    pub node: DeviceNode<N>,
}

impl<N: TreeNode> ChecklistEntry<N> {
    pub fn view(&self) -> EntryView {
        EntryView {
            id: self.id,
            label: self.label.clone(),
            name: self.node.name.clone(),
            type_code: self.node.type_code.0,
            depth: u8::from(self.node.depth),
            parent_path: self.node.parent_path.clone(),
            checked: self.checked,
        }
    }
}

/// Snapshot of an entry that can leave the owner thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryView {
    pub id: EntryId,
    pub label: String,
    pub name: String,
    pub type_code: i32,
    pub depth: u8,
    pub parent_path: String,
    pub checked: bool,
}

impl EntryView {
    pub fn type_code(&self) -> TypeCode {
        TypeCode(self.type_code)
    }

    pub fn is_device(&self) -> bool {
        self.depth == Depth::Device as u8
    }
}

/// Ordered entries of the current generation.
#[derive(Debug)]
pub struct Checklist<N> {
    generation: u32,
    entries: Vec<ChecklistEntry<N>>,
}

impl<N> Default for Checklist<N> {
    fn default() -> Self {
        Self {
            generation: 0,
            entries: Vec::new(),
        }
    }
}

impl<N: TreeNode> Checklist<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every entry and starts a new generation. Safe to call on an
    /// empty list.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Replaces the list with the nodes produced by `walker`, in walk order.
    ///
    /// The disabled state of each node is read from its fragment. A node whose
    /// fragment cannot be fetched is listed as enabled; a node the walker could
    /// not read is reported to `transcript` and left out.
    pub fn rebuild(
        &mut self,
        walker: TreeWalker<N>,
        transcript: &mut Transcript,
    ) -> &[ChecklistEntry<N>] {
        self.clear();

        for item in walker {
            let node = match item {
                Ok(node) => node,
                Err(unreadable) => {
                    transcript.line(format!("Error enumerating devices: {unreadable}"));
                    continue;
                }
            };

            let indent = "  ".repeat(usize::from(u8::from(node.depth)) + 1);
            transcript.line(format!("{indent}- {} (Type: {})", node.name, node.type_code));
            let checked = !Self::read_disabled(&node);
            self.push(node, checked);
        }

        my_info!(
            CTX,
            "Checklist generation {} has {} entries",
            self.generation,
            self.entries.len()
        );
        &self.entries
    }

    fn read_disabled(node: &DeviceNode<N>) -> bool {
        match node.handle.produce_fragment(false) {
            Ok(xml) => fragment::read(&xml),
            Err(e) => {
                my_warn!(CTX, "Cannot read state of '{}', assuming enabled: {}", node.path(), e);
                false
            }
        }
    }

    fn push(&mut self, node: DeviceNode<N>, checked: bool) {
        let id = EntryId {
            generation: self.generation,
            index: self.entries.len() as u32,
        };
        self.entries.push(ChecklistEntry {
            id,
            label: node.label(),
            checked,
            node,
        });
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn entries(&self) -> &[ChecklistEntry<N>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry of the current generation.
    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut ChecklistEntry<N>> {
        if id.generation != self.generation {
            return None;
        }
        self.entries.get_mut(id.index as usize)
    }

    pub fn views(&self) -> Vec<EntryView> {
        self.entries.iter().map(ChecklistEntry::view).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// (name, type, children, fragment or fragment error)
    type Item = (String, i32, Vec<usize>, Result<String, String>);

    #[derive(Debug, Clone)]
    struct Node {
        items: Rc<RefCell<Vec<Item>>>,
        id: usize,
    }

    impl TreeNode for Node {
        type Children = std::vec::IntoIter<Result<Node, EngineError>>;
        fn name(&self) -> Result<String, EngineError> {
            Ok(self.items.borrow()[self.id].0.clone())
        }
        fn type_code(&self) -> Result<TypeCode, EngineError> {
            Ok(TypeCode(self.items.borrow()[self.id].1))
        }
        fn path_name(&self) -> Result<String, EngineError> {
            self.name()
        }
        fn children(&self) -> Result<Self::Children, EngineError> {
            let ids = self.items.borrow()[self.id].2.clone();
            Ok(ids
                .into_iter()
                .map(|id| {
                    Ok(Node {
                        items: self.items.clone(),
                        id,
                    })
                })
                .collect::<Vec<_>>()
                .into_iter())
        }
        fn create_child(
            &self,
            _kind: &str,
            _index: i32,
            _name: &str,
            _template: Option<&str>,
        ) -> Result<Self, EngineError> {
            Err(EngineError::new("unsupported"))
        }
        fn produce_fragment(&self, _resolve: bool) -> Result<String, EngineError> {
            self.items.borrow()[self.id].3.clone().map_err(EngineError::new)
        }
        fn consume_fragment(&self, _fragment: &str) -> Result<(), EngineError> {
            Ok(())
        }
    }

    fn sample() -> Node {
        let items = vec![
            ("I/O Devices".into(), 0, vec![1, 3], Ok(String::new())),
            (
                "Device 1".into(),
                2,
                vec![2],
                Ok("<TreeItem><Disabled>false</Disabled></TreeItem>".into()),
            ),
            (
                "Box 1".into(),
                5,
                vec![],
                Ok(r#"<TreeItem Disabled="true"></TreeItem>"#.into()),
            ),
            ("Device 2".into(), 2, vec![], Err("E_FAIL".into())),
        ];
        Node {
            items: Rc::new(RefCell::new(items)),
            id: 0,
        }
    }

    #[test]
    fn test_rebuild_reads_flags_and_reports_progress() {
        let root = sample();
        let mut checklist: Checklist<Node> = Checklist::new();
        let mut transcript = Transcript::new(CTX);
        assert!(checklist.is_empty());

        checklist.rebuild(TreeWalker::new(&root), &mut transcript);
        assert_eq!(checklist.len(), 3);
        let checked: Vec<_> = checklist.entries().iter().map(|e| e.checked).collect();
        // Device 2's fragment cannot be read, so it is listed as enabled.
        assert_eq!(checked, vec![true, false, true]);
        assert_eq!(checklist.entries()[1].label, "Box 1 (5)");
        assert_eq!(
            transcript.lines(),
            ["  - Device 1 (Type: 2)", "    - Box 1 (Type: 5)", "  - Device 2 (Type: 2)"]
        );
    }

    #[test]
    fn test_clear_starts_new_generation() {
        let root = sample();
        let mut checklist: Checklist<Node> = Checklist::new();
        let mut transcript = Transcript::new(CTX);
        checklist.rebuild(TreeWalker::new(&root), &mut transcript);
        let generation = checklist.generation();
        let old = checklist.entries()[0].id;
        assert_eq!(old.generation, generation);

        checklist.clear();
        assert!(checklist.is_empty());
        assert_eq!(checklist.generation(), generation + 1);
        // Clearing an empty list is fine.
        checklist.clear();

        checklist.rebuild(TreeWalker::new(&root), &mut transcript);
        assert!(checklist.get_mut(old).is_none());
        let new = checklist.entries()[0].id;
        assert_eq!(new.index, old.index);
        assert!(checklist.get_mut(new).is_some());
        assert_eq!(checklist.views()[0].id, new);
    }
}
