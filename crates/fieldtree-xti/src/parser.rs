// crates/fieldtree-xti/src/parser.rs

use crate::error::XtiError;
use crate::model::{Fragment, Network, Project, TreeItem};

/// Parses a project document (`<Project>` with `<Root>` sections).
///
/// # Errors
/// Returns an `XtiError` if the XML is malformed or a required attribute
/// is missing.
pub fn load_project_from_str(xml_content: &str) -> Result<Project, XtiError> {
    let project: Project = quick_xml::de::from_str(xml_content)?;
    Ok(project)
}

/// Parses an XTI document: a single `<TreeItem>` with its subtree.
pub fn load_xti_from_str(xml_content: &str) -> Result<TreeItem, XtiError> {
    let item: TreeItem = quick_xml::de::from_str(xml_content)?;
    Ok(item)
}

/// Parses a `<Network>` inventory into the items a scan will find.
pub fn load_network_from_str(xml_content: &str) -> Result<Vec<TreeItem>, XtiError> {
    let network: Network = quick_xml::de::from_str(xml_content)?;
    Ok(network.items)
}

/// Parses a configuration fragment handed to `consume_fragment`.
pub(crate) fn parse_fragment(xml_content: &str) -> Result<Fragment, XtiError> {
    let fragment: Fragment = quick_xml::de::from_str(xml_content)?;
    Ok(fragment)
}

/// Parses the text of a boolean element. Only `true` and `false` are
/// accepted, surrounding whitespace aside.
pub(crate) fn parse_bool(element: &'static str, value: &str) -> Result<bool, XtiError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(XtiError::InvalidValue {
            element,
            value: other.to_owned(),
        }),
    }
}
