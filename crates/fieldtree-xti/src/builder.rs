// crates/fieldtree-xti/src/builder.rs

use crate::error::XtiError;
use crate::model::{Fragment, Project};
use core::fmt::Write;
use quick_xml::se::QuoteLevel;
use serde::Serialize;

/// Serializes a project into an XML `String`, with declaration and
/// two-space indentation.
///
/// # Errors
/// Returns an `XtiError` if serialization fails.
pub fn save_project_to_string(project: &Project) -> Result<String, XtiError> {
    let mut buffer = String::new();
    // The serializer does not emit the declaration.
    write!(&mut buffer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n")?;

    let mut serializer = quick_xml::se::Serializer::new(&mut buffer);
    serializer.indent(' ', 2);
    project.serialize(serializer)?;

    Ok(buffer)
}

/// Serializes a single-item fragment on one line.
///
/// Quotes are escaped in text too, so an item name can never read as a
/// `Disabled="..."` attribute.
pub(crate) fn fragment_to_string(fragment: &Fragment) -> Result<String, XtiError> {
    let mut buffer = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut buffer);
    serializer.set_quote_level(QuoteLevel::Full);
    fragment.serialize(serializer)?;
    Ok(buffer)
}
