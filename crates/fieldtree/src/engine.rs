// crates/fieldtree/src/engine.rs
use crate::error::EngineError;
use crate::types::TypeCode;
use std::path::Path;

/// Abstraction of the configuration engine that owns the project.
///
/// This trait keeps the synchronization logic independent of the vendor
/// automation interface. Implementations do not have to be `Send`: the
/// session constructs the engine on its owner thread and never moves it.
pub trait ConfigEngine {
    /// Handle type of the engine's tree items.
    type Node: TreeNode;

    /// Opens a project file, replacing any previously opened configuration.
    fn open_project(&mut self, path: &Path) -> Result<(), EngineError>;

    /// Imports an XTI-style fragment set into the open configuration.
    fn import_fragment_set(&mut self, path: &Path) -> Result<(), EngineError>;

    /// Resolves a well-known root key (e.g. `TIID`).
    ///
    /// Returns `Ok(None)` if the key is valid but nothing is attached to it.
    fn lookup(&self, key: &str) -> Result<Option<Self::Node>, EngineError>;

    /// Saves the project. `None` saves in place.
    fn save_project(&mut self, path: Option<&Path>) -> Result<(), EngineError>;

    /// Releases the engine. Called exactly once, on the owner thread, after
    /// every queued operation has finished.
    fn release(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

/// A handle to an engine-owned tree item.
///
/// Handles have reference semantics: cloning yields another handle to the
/// same engine object, and two handles are never compared structurally.
pub trait TreeNode: Clone {
    /// Iterator over the direct children of a node.
    ///
    /// Each call to [`TreeNode::children`] starts a fresh enumeration; a single
    /// child that cannot be read is reported as an `Err` item.
    type Children: Iterator<Item = Result<Self, EngineError>>;

    fn name(&self) -> Result<String, EngineError>;

    fn type_code(&self) -> Result<TypeCode, EngineError>;

    /// Full engine path of the item (names joined with `^`).
    fn path_name(&self) -> Result<String, EngineError>;

    fn children(&self) -> Result<Self::Children, EngineError>;

    /// Creates a child item. An empty `name` lets the engine choose one.
    fn create_child(
        &self,
        kind: &str,
        index: i32,
        name: &str,
        template: Option<&str>,
    ) -> Result<Self, EngineError>;

    /// Serializes the item's configuration into an XML fragment.
    fn produce_fragment(&self, resolve_references: bool) -> Result<String, EngineError>;

    /// Applies an XML fragment to the item.
    fn consume_fragment(&self, fragment: &str) -> Result<(), EngineError>;
}
