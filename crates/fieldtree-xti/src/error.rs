// crates/fieldtree-xti/src/error.rs

use core::fmt;
use fieldtree::EngineError;
use quick_xml::errors::serialize::{DeError, SeError};

/// Errors that can occur while reading, changing or writing project documents.
#[derive(Debug)]
pub enum XtiError {
    /// An error from the underlying `quick-xml` deserializer.
    XmlParsing(DeError),

    /// An error from the underlying `quick-xml` serializer.
    XmlSerializing(SeError),

    /// Reading or writing a document on disk failed.
    Io(std::io::Error),

    /// An error occurred during string formatting.
    FmtError(fmt::Error),

    /// No project is open.
    NotLoaded,

    /// A lookup path did not start with a root key of the project.
    UnknownRoot { key: String },

    /// An element had a value outside its domain (e.g. `Disabled`).
    InvalidValue { element: &'static str, value: String },

    /// `create_child` was asked for an item kind the engine does not know.
    UnknownKind(String),

    /// A sibling with the requested name already exists.
    DuplicateName(String),

    /// The item type cannot perform the requested operation.
    Unsupported { item: String, operation: &'static str },

    /// A scan was requested but no network inventory is attached.
    NoNetwork,
}

impl fmt::Display for XtiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XmlParsing(e) => write!(f, "XML parsing error: {}", e),
            Self::XmlSerializing(e) => write!(f, "XML serializing error: {}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::FmtError(e) => write!(f, "Formatting error: {}", e),
            Self::NotLoaded => write!(f, "No configuration loaded"),
            Self::UnknownRoot { key } => write!(f, "Invalid tree item path '{}'", key),
            Self::InvalidValue { element, value } => {
                write!(f, "Invalid value '{}' for element '{}'", value, element)
            }
            Self::UnknownKind(kind) => write!(f, "Unknown item kind '{}'", kind),
            Self::DuplicateName(name) => write!(f, "Item '{}' already exists", name),
            Self::Unsupported { item, operation } => {
                write!(f, "Item '{}' does not support {}", item, operation)
            }
            Self::NoNetwork => write!(f, "No network adapter available for scanning"),
        }
    }
}

impl std::error::Error for XtiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::XmlParsing(e) => Some(e),
            Self::XmlSerializing(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DeError> for XtiError {
    fn from(e: DeError) -> Self {
        XtiError::XmlParsing(e)
    }
}

impl From<SeError> for XtiError {
    fn from(e: SeError) -> Self {
        XtiError::XmlSerializing(e)
    }
}

impl From<std::io::Error> for XtiError {
    fn from(e: std::io::Error) -> Self {
        XtiError::Io(e)
    }
}

impl From<fmt::Error> for XtiError {
    fn from(e: fmt::Error) -> Self {
        XtiError::FmtError(e)
    }
}

/// The session only sees the message text.
impl From<XtiError> for EngineError {
    fn from(e: XtiError) -> Self {
        EngineError::new(e.to_string())
    }
}
