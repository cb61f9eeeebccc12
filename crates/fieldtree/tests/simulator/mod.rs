// crates/fieldtree/tests/simulator/mod.rs
//! In-memory configuration engine for integration tests.
//!
//! A `VirtualProject` holds the item tree behind an `Arc<Mutex<..>>` so the
//! test thread can prepare and inspect it while the session's owner thread
//! drives a `SimulatedEngine` over the same data.
#![allow(dead_code)]

use fieldtree::{ConfigEngine, EngineError, TreeNode, TypeCode};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

pub const ROOT_DEVICES: &str = "TIID";
pub const ROOT_IMPORTED: &str = "TIIC";
pub const ROOT_SYSTEM: &str = "TIRS";

/// One item of the virtual tree.
#[derive(Debug, Clone)]
pub struct Item {
    pub name: String,
    pub type_code: i32,
    pub children: Vec<usize>,
    pub fragment: String,
    /// Name and type reads fail with this message.
    pub unreadable: Option<String>,
    /// `consume_fragment` fails with this message.
    pub reject: Option<String>,
    /// `produce_fragment` fails with this message.
    pub fragment_error: Option<String>,
}

#[derive(Debug, Default)]
pub struct State {
    pub items: Vec<Item>,
    pub roots: HashMap<String, usize>,
    pub opened: bool,
    /// Devices attached under the imported root by the next import.
    pub import_inventory: Vec<(String, i32)>,
    /// Boxes found by a scan.
    pub scan_inventory: Vec<(String, i32)>,
    /// Scan requests fail with this message.
    pub scan_error: Option<String>,
    pub saved_to: Vec<Option<String>>,
    /// Every `consume_fragment` call, successful or not.
    pub writes: Vec<(usize, String)>,
    /// Threads that touched the engine.
    pub threads: Vec<ThreadId>,
}

/// Shared handle the test uses to shape and observe the virtual project.
#[derive(Debug, Clone, Default)]
pub struct VirtualProject {
    state: Arc<Mutex<State>>,
    releases: Arc<AtomicUsize>,
}

pub fn fragment_for(name: &str, disabled: Option<bool>) -> String {
    match disabled {
        Some(d) => format!("<TreeItem><ItemName>{name}</ItemName><Disabled>{d}</Disabled></TreeItem>"),
        None => format!("<TreeItem><ItemName>{name}</ItemName></TreeItem>"),
    }
}

impl VirtualProject {
    /// A project with the three well-known roots and nothing below them.
    pub fn new() -> Self {
        let project = Self::default();
        let devices = project.add(None, "I/O Devices", 0, None);
        let imported = project.add(None, "Imported", 0, None);
        let system = project.add(None, "SYSTEM", 0, None);
        {
            let mut s = project.state();
            s.roots.insert(ROOT_DEVICES.into(), devices);
            s.roots.insert(ROOT_IMPORTED.into(), imported);
            s.roots.insert(ROOT_SYSTEM.into(), system);
        }
        project
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn root(&self, key: &str) -> usize {
        self.state().roots[key]
    }

    pub fn remove_root(&self, key: &str) {
        self.state().roots.remove(key);
    }

    pub fn add(&self, parent: Option<usize>, name: &str, type_code: i32, disabled: Option<bool>) -> usize {
        let mut s = self.state();
        let id = s.items.len();
        s.items.push(Item {
            name: name.into(),
            type_code,
            children: Vec::new(),
            fragment: fragment_for(name, disabled),
            unreadable: None,
            reject: None,
            fragment_error: None,
        });
        if let Some(p) = parent {
            s.items[p].children.push(id);
        }
        id
    }

    pub fn set_unreadable(&self, id: usize, msg: &str) {
        self.state().items[id].unreadable = Some(msg.into());
    }

    pub fn reject_writes(&self, id: usize, msg: &str) {
        self.state().items[id].reject = Some(msg.into());
    }

    pub fn accept_writes(&self, id: usize) {
        self.state().items[id].reject = None;
    }

    pub fn fail_fragment(&self, id: usize, msg: &str) {
        self.state().items[id].fragment_error = Some(msg.into());
    }

    pub fn fragment(&self, id: usize) -> String {
        self.state().items[id].fragment.clone()
    }

    pub fn set_fragment(&self, id: usize, fragment: &str) {
        self.state().items[id].fragment = fragment.into();
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Factory for `Session::start`.
    pub fn factory(&self) -> impl FnOnce() -> Result<SimulatedEngine, EngineError> + Send + 'static {
        let project = self.clone();
        move || Ok(SimulatedEngine { project })
    }
}

/// Engine over a `VirtualProject`.
///
/// `open_project` fails for paths containing `missing`; `import_fragment_set`
/// fails for paths not ending in `.xti`.
pub struct SimulatedEngine {
    project: VirtualProject,
}

impl SimulatedEngine {
    fn touch(&self) -> MutexGuard<'_, State> {
        let mut s = self.project.state();
        let id = thread::current().id();
        if !s.threads.contains(&id) {
            s.threads.push(id);
        }
        s
    }
}

impl ConfigEngine for SimulatedEngine {
    type Node = SimNode;

    fn open_project(&mut self, path: &Path) -> Result<(), EngineError> {
        let mut s = self.touch();
        if path.to_string_lossy().contains("missing") {
            return Err(EngineError::new(format!("Cannot open file '{}'", path.display())));
        }
        s.opened = true;
        Ok(())
    }

    fn import_fragment_set(&mut self, path: &Path) -> Result<(), EngineError> {
        let mut s = self.touch();
        if path.extension().is_none_or(|ext| ext != "xti") {
            return Err(EngineError::new("Invalid XTI file"));
        }
        let inventory = std::mem::take(&mut s.import_inventory);
        drop(s);
        let root = self.project.root(ROOT_IMPORTED);
        for (name, ty) in inventory {
            self.project.add(Some(root), &name, ty, Some(false));
        }
        Ok(())
    }

    fn lookup(&self, key: &str) -> Result<Option<SimNode>, EngineError> {
        let s = self.touch();
        if !s.opened {
            return Err(EngineError::new("No configuration loaded"));
        }
        Ok(s.roots.get(key).map(|&id| SimNode {
            project: self.project.clone(),
            id,
        }))
    }

    fn save_project(&mut self, path: Option<&Path>) -> Result<(), EngineError> {
        let mut s = self.touch();
        s.saved_to.push(path.map(|p| p.display().to_string()));
        Ok(())
    }

    fn release(&mut self) -> Result<(), EngineError> {
        self.touch();
        self.project.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SimNode {
    project: VirtualProject,
    pub id: usize,
}

impl SimNode {
    fn item(&self) -> Result<Item, EngineError> {
        let item = self.project.state().items[self.id].clone();
        match &item.unreadable {
            Some(msg) => Err(EngineError::new(msg.clone())),
            None => Ok(item),
        }
    }
}

impl TreeNode for SimNode {
    type Children = std::vec::IntoIter<Result<SimNode, EngineError>>;

    fn name(&self) -> Result<String, EngineError> {
        Ok(self.item()?.name)
    }

    fn type_code(&self) -> Result<TypeCode, EngineError> {
        Ok(TypeCode(self.item()?.type_code))
    }

    fn path_name(&self) -> Result<String, EngineError> {
        Ok(format!("TI^{}", self.item()?.name))
    }

    fn children(&self) -> Result<Self::Children, EngineError> {
        let ids = self.project.state().items[self.id].children.clone();
        Ok(ids
            .into_iter()
            .map(|id| {
                Ok(SimNode {
                    project: self.project.clone(),
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
        name: &str,
        _template: Option<&str>,
    ) -> Result<Self, EngineError> {
        let count = self.project.state().items[self.id].children.len();
        let name = if name.is_empty() {
            format!("Device {} (EtherCAT)", count + 1)
        } else {
            name.to_owned()
        };
        let id = self.project.add(Some(self.id), &name, TypeCode::DEVICE.0, None);
        Ok(SimNode {
            project: self.project.clone(),
            id,
        })
    }

    fn produce_fragment(&self, _resolve_references: bool) -> Result<String, EngineError> {
        let item = self.project.state().items[self.id].clone();
        match item.fragment_error {
            Some(msg) => Err(EngineError::new(msg)),
            None => Ok(item.fragment),
        }
    }

    fn consume_fragment(&self, fragment: &str) -> Result<(), EngineError> {
        let mut s = self.project.state();
        s.writes.push((self.id, fragment.to_owned()));
        if let Some(msg) = s.items[self.id].reject.clone() {
            return Err(EngineError::new(msg));
        }
        if fragment.contains("<ScanBoxes>1</ScanBoxes>") {
            if let Some(msg) = s.scan_error.clone() {
                return Err(EngineError::new(msg));
            }
            let inventory = s.scan_inventory.clone();
            drop(s);
            for (name, ty) in inventory {
                self.project.add(Some(self.id), &name, ty, Some(false));
            }
            return Ok(());
        }
        s.items[self.id].fragment = fragment.to_owned();
        Ok(())
    }
}
