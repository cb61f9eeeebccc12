// crates/fieldtree-xti/src/tree.rs

//! In-memory item arena of an open project.

use crate::error::XtiError;
use crate::model::{Project, Root, TreeItem};
use fieldtree::fragment::MarkerForm;
use fieldtree::types::{PATH_SEPARATOR, TypeCode};
use std::path::PathBuf;
use std::rc::Rc;

/// The disabled flag of an item and the form it is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flag {
    pub form: MarkerForm,
    pub disabled: bool,
}

#[derive(Debug, Clone)]
pub struct Item {
    pub name: String,
    pub type_code: TypeCode,
    pub sub_type: i32,
    pub flag: Option<Flag>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

#[derive(Debug)]
struct RootEntry {
    key: String,
    item: usize,
}

/// Items of one project, addressed by index. Items are never removed, so an
/// index stays valid for the lifetime of the arena.
#[derive(Debug)]
pub struct Tree {
    pub path: PathBuf,
    pub project_name: Option<String>,
    roots: Vec<RootEntry>,
    items: Vec<Item>,
    /// Items a scan attaches below the scanning device.
    pub network: Option<Rc<Vec<TreeItem>>>,
}

impl Tree {
    pub fn from_project(path: PathBuf, project: Project) -> Self {
        let mut tree = Self {
            path,
            project_name: project.name,
            roots: Vec::new(),
            items: Vec::new(),
            network: None,
        };
        for root in project.roots {
            let id = tree.push(None, root.name, TypeCode(0), 0, None);
            tree.roots.push(RootEntry { key: root.key, item: id });
            for item in &root.items {
                tree.attach(id, item);
            }
        }
        tree
    }

    pub fn to_project(&self) -> Project {
        Project {
            name: self.project_name.clone(),
            roots: self
                .roots
                .iter()
                .map(|root| Root {
                    key: root.key.clone(),
                    name: self.items[root.item].name.clone(),
                    items: self.items[root.item]
                        .children
                        .iter()
                        .map(|&c| self.to_tree_item(c))
                        .collect(),
                })
                .collect(),
        }
    }

    fn to_tree_item(&self, id: usize) -> TreeItem {
        let item = &self.items[id];
        let (disabled_attr, disabled) = match item.flag {
            Some(Flag {
                form: MarkerForm::Attribute,
                disabled,
            }) => (Some(disabled), None),
            Some(Flag {
                form: MarkerForm::Element,
                disabled,
            }) => (None, Some(disabled)),
            None => (None, None),
        };
        TreeItem {
            name: item.name.clone(),
            type_code: item.type_code.0,
            sub_type: item.sub_type,
            disabled_attr,
            disabled,
            children: item.children.iter().map(|&c| self.to_tree_item(c)).collect(),
        }
    }

    fn push(
        &mut self,
        parent: Option<usize>,
        name: String,
        type_code: TypeCode,
        sub_type: i32,
        flag: Option<Flag>,
    ) -> usize {
        let id = self.items.len();
        self.items.push(Item {
            name,
            type_code,
            sub_type,
            flag,
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            self.items[p].children.push(id);
        }
        id
    }

    /// Copies `item` and its subtree below `parent`. Returns the new id.
    pub fn attach(&mut self, parent: usize, item: &TreeItem) -> usize {
        // The element form wins when both are present.
        let flag = match (item.disabled, item.disabled_attr) {
            (Some(disabled), _) => Some(Flag {
                form: MarkerForm::Element,
                disabled,
            }),
            (None, Some(disabled)) => Some(Flag {
                form: MarkerForm::Attribute,
                disabled,
            }),
            (None, None) => None,
        };
        let id = self.push(
            Some(parent),
            item.name.clone(),
            TypeCode(item.type_code),
            item.sub_type,
            flag,
        );
        for child in &item.children {
            self.attach(id, child);
        }
        id
    }

    /// Adds an empty item below `parent`.
    pub fn add(
        &mut self,
        parent: usize,
        name: String,
        type_code: TypeCode,
        sub_type: i32,
    ) -> usize {
        self.push(Some(parent), name, type_code, sub_type, None)
    }

    pub fn item(&self, id: usize) -> &Item {
        &self.items[id]
    }

    pub fn item_mut(&mut self, id: usize) -> &mut Item {
        &mut self.items[id]
    }

    pub fn child_named(&self, parent: usize, name: &str) -> Option<usize> {
        self.items[parent]
            .children
            .iter()
            .copied()
            .find(|&c| self.items[c].name == name)
    }

    pub fn root(&self, key: &str) -> Option<usize> {
        self.roots.iter().find(|r| r.key == key).map(|r| r.item)
    }

    /// Resolves `KEY^name^name...`. An unknown root key is an error; an
    /// unknown item below it is `None`.
    pub fn lookup(&self, path: &str) -> Result<Option<usize>, XtiError> {
        let mut segments = path.split(PATH_SEPARATOR);
        let key = segments.next().unwrap_or_default();
        let mut id = self.root(key).ok_or_else(|| XtiError::UnknownRoot {
            key: path.to_owned(),
        })?;
        for name in segments {
            match self.child_named(id, name) {
                Some(child) => id = child,
                None => return Ok(None),
            }
        }
        Ok(Some(id))
    }

    /// Full path of an item: its root key followed by the item names.
    pub fn path_name(&self, id: usize) -> String {
        let mut names = Vec::new();
        let mut current = id;
        while let Some(parent) = self.items[current].parent {
            names.push(self.items[current].name.as_str());
            current = parent;
        }
        let key = self
            .roots
            .iter()
            .find(|r| r.item == current)
            .map(|r| r.key.as_str())
            .unwrap_or_default();
        names.push(key);
        names.reverse();
        let separator = PATH_SEPARATOR.to_string();
        names.join(separator.as_str())
    }

    /// First free `"{prefix} {n}"` name below `parent`, counting from 1.
    pub fn free_name(&self, parent: usize, prefix: &str) -> String {
        (1..)
            .map(|n| format!("{prefix} {n}"))
            .find(|name| self.child_named(parent, name).is_none())
            .unwrap_or_else(|| prefix.to_owned())
    }
}
