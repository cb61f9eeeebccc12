// crates/fieldtree-xti/src/model.rs

//! `serde` shapes of the project, XTI, network and fragment documents.

use serde::{Deserialize, Serialize};

// --- Helper Functions for serde(default) ---

fn is_zero(v: &i32) -> bool {
    *v == 0
}

// --- Stored documents ---

/// Represents the root `<Project>` element of a project file.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename = "Project")]
pub struct Project {
    #[serde(rename = "@Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Root", default)]
    pub roots: Vec<Root>,
}

/// Represents `<Root Key="TIID" Name="I/O Devices">...</Root>`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Root {
    #[serde(rename = "@Key")]
    pub key: String,
    #[serde(rename = "@Name")]
    pub name: String,
    #[serde(rename = "TreeItem", default)]
    pub items: Vec<TreeItem>,
}

/// Represents a stored `<TreeItem Name=".." Type="..">` with its subtree.
///
/// This is also the root element of an XTI file. The disabled flag can be
/// stored as an attribute or as a child element; both are kept so the
/// document is written back in the form it was read.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename = "TreeItem")]
pub struct TreeItem {
    #[serde(rename = "@Name")]
    pub name: String,
    #[serde(rename = "@Type")]
    pub type_code: i32,
    #[serde(rename = "@SubType", default, skip_serializing_if = "is_zero")]
    pub sub_type: i32,
    #[serde(rename = "@Disabled", default, skip_serializing_if = "Option::is_none")]
    pub disabled_attr: Option<bool>,
    #[serde(rename = "Disabled", default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(rename = "TreeItem", default)]
    pub children: Vec<TreeItem>,
}

/// Represents the `<Network>` inventory a scan discovers.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename = "Network")]
pub struct Network {
    #[serde(rename = "TreeItem", default)]
    pub items: Vec<TreeItem>,
}

// --- Exchanged fragments ---

/// Represents the `<TreeItem>` configuration fragment of a single item.
///
/// Values are kept as text so invalid input can be reported with the
/// offending value.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename = "TreeItem")]
pub struct Fragment {
    #[serde(rename = "@Disabled", default, skip_serializing_if = "Option::is_none")]
    pub disabled_attr: Option<String>,
    #[serde(rename = "ItemName", default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(rename = "PathName", default, skip_serializing_if = "Option::is_none")]
    pub path_name: Option<String>,
    #[serde(rename = "ItemType", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(rename = "Disabled", default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<String>,
    #[serde(rename = "DeviceGrp", default, skip_serializing_if = "Option::is_none")]
    pub device_grp: Option<DeviceGrp>,
}

/// Represents `<DeviceGrp><ScanBoxes>1</ScanBoxes></DeviceGrp>`
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct DeviceGrp {
    #[serde(rename = "ScanBoxes", default, skip_serializing_if = "Option::is_none")]
    pub scan_boxes: Option<String>,
}
