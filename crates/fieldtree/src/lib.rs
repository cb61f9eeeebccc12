// crates/fieldtree/src/lib.rs
//! Device-tree synchronization and enable/disable mutation for field-bus
//! configuration projects.
//!
//! The crate walks the I/O tree of a configuration engine, presents every
//! device, box and terminal as a checklist entry, and flips the `Disabled`
//! flag inside a node's configuration fragment when an entry is toggled.
//! All engine access happens on one owner thread (see [`owner`]).

// --- Foundation Modules ---
pub mod config;
pub mod engine;
pub mod error;
pub mod log;
pub mod types;

// --- Tree Model ---
pub mod fragment;
pub mod node;
pub mod walker;

// --- Synchronization and Mutation ---
pub mod checklist;
pub mod mutation;
pub mod owner;
pub mod session;

// --- Top-level Exports ---
pub use checklist::{Checklist, ChecklistEntry, EntryId, EntryView};
pub use config::SessionConfig;
pub use engine::{ConfigEngine, TreeNode};
pub use error::{EngineError, OwnerError, SessionError};
pub use mutation::{ToggleOutcome, ToggleState};
pub use node::DeviceNode;
pub use owner::Owner;
pub use session::{Report, Session, Transcript};
pub use types::{Depth, RootKey, TypeCode};
pub use walker::{NodeUnreadable, TreeWalker};
