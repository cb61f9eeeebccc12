// crates/fieldtree-xti/src/engine.rs

//! File-backed `ConfigEngine`.

use crate::builder::{fragment_to_string, save_project_to_string};
use crate::error::XtiError;
use crate::model::{Fragment, TreeItem};
use crate::parser::{
    load_network_from_str, load_project_from_str, load_xti_from_str, parse_bool, parse_fragment,
};
use crate::tree::{Flag, Tree};
use fieldtree::fragment::MarkerForm;
use fieldtree::types::{KEY_IMPORTED_DEVICE_ROOT, TypeCode};
use fieldtree::{ConfigEngine, EngineError, TreeNode};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// A configuration engine over a project document on disk.
///
/// Handles share the open project through `Rc<RefCell<..>>`, so the engine is
/// neither `Send` nor `Sync` and has to live on the session's owner thread.
#[derive(Debug)]
pub struct XtiEngine {
    tree: Option<Rc<RefCell<Tree>>>,
    network: Option<Rc<Vec<TreeItem>>>,
    imported_root: String,
}

impl Default for XtiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl XtiEngine {
    pub fn new() -> Self {
        Self {
            tree: None,
            network: None,
            imported_root: KEY_IMPORTED_DEVICE_ROOT.to_owned(),
        }
    }

    /// Sets the root that `import_fragment_set` attaches below.
    pub fn with_imported_root(mut self, key: impl Into<String>) -> Self {
        self.imported_root = key.into();
        self
    }

    /// Attaches the inventory a scan discovers, read from a `<Network>` document.
    pub fn with_network_str(mut self, xml: &str) -> Result<Self, XtiError> {
        let items = load_network_from_str(xml)?;
        info!("Network inventory has {} top-level item(s)", items.len());
        self.network = Some(Rc::new(items));
        if let Some(tree) = &self.tree {
            tree.borrow_mut().network = self.network.clone();
        }
        Ok(self)
    }

    pub fn with_network_file(self, path: &Path) -> Result<Self, XtiError> {
        let xml = fs::read_to_string(path)?;
        self.with_network_str(&xml)
    }

    /// Opens a project from text instead of a file. `path` is where an
    /// in-place save writes to.
    pub fn open_project_str(&mut self, path: &Path, xml: &str) -> Result<(), XtiError> {
        let project = load_project_from_str(xml)?;
        let mut tree = Tree::from_project(path.to_path_buf(), project);
        tree.network = self.network.clone();
        // Handles into the previous project keep that project alive, unchanged.
        self.tree = Some(Rc::new(RefCell::new(tree)));
        Ok(())
    }

    /// Imports an XTI document given as text.
    pub fn import_str(&mut self, xml: &str) -> Result<(), XtiError> {
        let tree = self.tree.as_ref().ok_or(XtiError::NotLoaded)?;
        let item = load_xti_from_str(xml)?;
        let mut tree = tree.borrow_mut();
        let root = tree
            .root(&self.imported_root)
            .ok_or_else(|| XtiError::UnknownRoot {
                key: self.imported_root.clone(),
            })?;
        if tree.child_named(root, &item.name).is_some() {
            return Err(XtiError::DuplicateName(item.name));
        }
        tree.attach(root, &item);
        debug!("Imported '{}' below '{}'", item.name, self.imported_root);
        Ok(())
    }

    /// The project serialized as it would be saved.
    pub fn project_xml(&self) -> Result<String, XtiError> {
        let tree = self.tree.as_ref().ok_or(XtiError::NotLoaded)?;
        save_project_to_string(&tree.borrow().to_project())
    }
}

impl ConfigEngine for XtiEngine {
    type Node = XtiNode;

    fn open_project(&mut self, path: &Path) -> Result<(), EngineError> {
        let xml = fs::read_to_string(path).map_err(XtiError::from)?;
        self.open_project_str(path, &xml)?;
        info!("Opened project {}", path.display());
        Ok(())
    }

    fn import_fragment_set(&mut self, path: &Path) -> Result<(), EngineError> {
        let xml = fs::read_to_string(path).map_err(XtiError::from)?;
        Ok(self.import_str(&xml)?)
    }

    fn lookup(&self, key: &str) -> Result<Option<XtiNode>, EngineError> {
        let tree = self.tree.as_ref().ok_or(XtiError::NotLoaded)?;
        let id = tree.borrow().lookup(key)?;
        Ok(id.map(|id| XtiNode {
            tree: tree.clone(),
            id,
        }))
    }

    fn save_project(&mut self, path: Option<&Path>) -> Result<(), EngineError> {
        let xml = self.project_xml()?;
        let tree = self.tree.as_ref().ok_or(XtiError::NotLoaded)?;
        let target = match path {
            Some(path) => path.to_path_buf(),
            None => tree.borrow().path.clone(),
        };
        fs::write(&target, xml).map_err(XtiError::from)?;
        info!("Saved project to {}", target.display());
        Ok(())
    }

    fn release(&mut self) -> Result<(), EngineError> {
        if self.tree.take().is_some() {
            debug!("Closed project");
        }
        Ok(())
    }
}

/// Handle to one item of an open project.
#[derive(Debug, Clone)]
pub struct XtiNode {
    tree: Rc<RefCell<Tree>>,
    id: usize,
}

/// Maps a `create_child` kind to the item type it creates and the prefix of
/// generated names.
fn kind_type(kind: &str) -> Result<(TypeCode, &'static str), XtiError> {
    match kind {
        "Device" => Ok((TypeCode::DEVICE, "Device")),
        "Box" => Ok((TypeCode::BOX, "Box")),
        "Terminal" => Ok((TypeCode::TERMINAL, "Term")),
        other => Err(XtiError::UnknownKind(other.to_owned())),
    }
}

impl XtiNode {
    fn consume(&self, fragment: &Fragment) -> Result<(), XtiError> {
        let mut tree = self.tree.borrow_mut();

        // 1. Validate everything before touching the item.
        let flag = match (&fragment.disabled, &fragment.disabled_attr) {
            (Some(v), _) => Some(Flag {
                form: MarkerForm::Element,
                disabled: parse_bool("Disabled", v)?,
            }),
            (None, Some(v)) => Some(Flag {
                form: MarkerForm::Attribute,
                disabled: parse_bool("Disabled", v)?,
            }),
            (None, None) => None,
        };
        let scan = match fragment.device_grp.as_ref().and_then(|g| g.scan_boxes.as_deref()) {
            Some(v) => v.trim() == "1",
            None => false,
        };
        let item = tree.item(self.id);
        let network = if scan {
            if item.type_code != TypeCode::DEVICE {
                return Err(XtiError::Unsupported {
                    item: item.name.clone(),
                    operation: "box scanning",
                });
            }
            Some(tree.network.clone().ok_or(XtiError::NoNetwork)?)
        } else {
            None
        };
        if let Some(name) = &fragment.item_name {
            let parent = item.parent;
            let taken = parent
                .and_then(|p| tree.child_named(p, name))
                .is_some_and(|other| other != self.id);
            if taken {
                return Err(XtiError::DuplicateName(name.clone()));
            }
        }

        // 2. Apply.
        let item = tree.item_mut(self.id);
        if let Some(flag) = flag {
            item.flag = Some(flag);
        }
        if let Some(name) = &fragment.item_name {
            item.name = name.clone();
        }
        if let Some(network) = network {
            for found in network.iter() {
                tree.attach(self.id, found);
            }
            info!("Scan attached {} item(s) below {}", network.len(), tree.path_name(self.id));
        }
        Ok(())
    }

    fn create(
        &self,
        kind: &str,
        index: i32,
        name: &str,
        template: Option<&str>,
    ) -> Result<XtiNode, XtiError> {
        let (type_code, prefix) = kind_type(kind)?;
        let template = template.map(load_xti_from_str).transpose()?;
        let mut tree = self.tree.borrow_mut();
        let name = if name.is_empty() {
            tree.free_name(self.id, prefix)
        } else if tree.child_named(self.id, name).is_some() {
            return Err(XtiError::DuplicateName(name.to_owned()));
        } else {
            name.to_owned()
        };
        let id = tree.add(self.id, name, type_code, index);
        if let Some(template) = template {
            for child in &template.children {
                tree.attach(id, child);
            }
        }
        debug!("Created {}", tree.path_name(id));
        Ok(XtiNode {
            tree: self.tree.clone(),
            id,
        })
    }
}

impl TreeNode for XtiNode {
    type Children = std::vec::IntoIter<Result<XtiNode, EngineError>>;

    fn name(&self) -> Result<String, EngineError> {
        Ok(self.tree.borrow().item(self.id).name.clone())
    }

    fn type_code(&self) -> Result<TypeCode, EngineError> {
        Ok(self.tree.borrow().item(self.id).type_code)
    }

    fn path_name(&self) -> Result<String, EngineError> {
        Ok(self.tree.borrow().path_name(self.id))
    }

    fn children(&self) -> Result<Self::Children, EngineError> {
        let ids = self.tree.borrow().item(self.id).children.clone();
        Ok(ids
            .into_iter()
            .map(|id| {
                Ok(XtiNode {
                    tree: self.tree.clone(),
                    id,
                })
            })
            .collect::<Vec<_>>()
            .into_iter())
    }

    /// `kind` is `Device`, `Box` or `Terminal`; `index` is stored as the
    /// item's sub-type. A `template` is an XTI document whose children are
    /// copied below the new item.
    fn create_child(
        &self,
        kind: &str,
        index: i32,
        name: &str,
        template: Option<&str>,
    ) -> Result<Self, EngineError> {
        Ok(self.create(kind, index, name, template)?)
    }

    fn produce_fragment(&self, resolve_references: bool) -> Result<String, EngineError> {
        let tree = self.tree.borrow();
        let item = tree.item(self.id);
        let mut fragment = Fragment {
            item_name: Some(item.name.clone()),
            item_type: Some(item.type_code.0.to_string()),
            path_name: resolve_references.then(|| tree.path_name(self.id)),
            ..Default::default()
        };
        match item.flag {
            Some(Flag {
                form: MarkerForm::Element,
                disabled,
            }) => fragment.disabled = Some(disabled.to_string()),
            Some(Flag {
                form: MarkerForm::Attribute,
                disabled,
            }) => fragment.disabled_attr = Some(disabled.to_string()),
            None => {}
        }
        Ok(fragment_to_string(&fragment)?)
    }

    fn consume_fragment(&self, fragment: &str) -> Result<(), EngineError> {
        let parsed = parse_fragment(fragment)
            .inspect_err(|e| warn!("Unreadable fragment for item {}: {}", self.id, e))?;
        Ok(self.consume(&parsed)?)
    }
}
