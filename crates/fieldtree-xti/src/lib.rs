// crates/fieldtree-xti/src/lib.rs

#![doc = "File-backed configuration engine for `fieldtree`."]
#![doc = ""]
#![doc = "Projects are XML documents with one `<Root Key=\"..\">` section per"]
#![doc = "well-known root, each holding a nested `<TreeItem>` tree. Items exchange"]
#![doc = "`<TreeItem>` configuration fragments, so the `Disabled` flag can be read"]
#![doc = "and rewritten exactly the way the session does it against a vendor engine."]
#![doc = ""]
#![doc = "It supports:"]
#![doc = "- `XtiEngine::open_project`: loading a project file."]
#![doc = "- `XtiEngine::import_fragment_set`: attaching an XTI subtree below the imported root."]
#![doc = "- Network scans against an inventory loaded with `XtiEngine::with_network_file`."]
#![doc = "- `XtiEngine::save_project`: writing the project back, in place or as a copy."]

// --- Crate Modules ---

mod builder;
mod engine;
mod error;
mod model;
mod parser;
mod tree;

// --- Public API Re-exports ---

pub use builder::save_project_to_string;
pub use engine::{XtiEngine, XtiNode};
pub use error::XtiError;
pub use model::{Network, Project, Root, TreeItem};
pub use parser::{load_network_from_str, load_project_from_str, load_xti_from_str};
