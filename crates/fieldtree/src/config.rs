// crates/fieldtree/src/config.rs
//! Session configuration: which roots are walked and how a scan is requested.

use crate::log::{LogContext, my_info, my_warn};
use crate::types::{KEY_DEVICE_ROOT, KEY_IMPORTED_DEVICE_ROOT, KEY_SYSTEM_INFO_ROOT, RootKey};
use std::env;

const CTX: LogContext = LogContext::new("config", "from_env");

/// Fragment that asks a freshly created device to scan for boxes.
pub const DEFAULT_SCAN_FRAGMENT: &str =
    "<TreeItem><DeviceGrp><ScanBoxes>1</ScanBoxes></DeviceGrp></TreeItem>";

/// Item kind passed to `create_child` when starting a scan.
pub const DEFAULT_SCAN_DEVICE_KIND: &str = "Device";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Lookup key of the I/O devices root.
    pub device_root: String,
    /// Lookup key of the root that receives imported devices.
    pub imported_device_root: String,
    /// Lookup key of the system information root.
    pub system_info_root: String,
    pub scan_device_kind: String,
    pub scan_fragment: String,
    /// Name of the engine-owning thread.
    pub owner_thread_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device_root: KEY_DEVICE_ROOT.to_owned(),
            imported_device_root: KEY_IMPORTED_DEVICE_ROOT.to_owned(),
            system_info_root: KEY_SYSTEM_INFO_ROOT.to_owned(),
            scan_device_kind: DEFAULT_SCAN_DEVICE_KIND.to_owned(),
            scan_fragment: DEFAULT_SCAN_FRAGMENT.to_owned(),
            owner_thread_name: "fieldtree-owner".to_owned(),
        }
    }
}

impl SessionConfig {
    /// Builds a configuration from the defaults, overridden by the
    /// `FIELDTREE_DEVICE_ROOT`, `FIELDTREE_IMPORTED_ROOT`,
    /// `FIELDTREE_SYSTEM_ROOT` and `FIELDTREE_SCAN_FRAGMENT` environment
    /// variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`SessionConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let apply = |var: &str, slot: &mut String| {
            if let Some(value) = lookup(var) {
                if value.trim().is_empty() {
                    my_warn!(CTX, "Ignoring empty {}", var);
                } else {
                    my_info!(CTX, "{} = {}", var, value);
                    *slot = value;
                }
            }
        };
        apply("FIELDTREE_DEVICE_ROOT", &mut config.device_root);
        apply("FIELDTREE_IMPORTED_ROOT", &mut config.imported_device_root);
        apply("FIELDTREE_SYSTEM_ROOT", &mut config.system_info_root);
        apply("FIELDTREE_SCAN_FRAGMENT", &mut config.scan_fragment);
        config
    }

    /// The engine lookup key configured for `root`.
    pub fn key(&self, root: RootKey) -> &str {
        match root {
            RootKey::DeviceRoot => &self.device_root,
            RootKey::ImportedDeviceRoot => &self.imported_device_root,
            RootKey::SystemInfoRoot => &self.system_info_root,
        }
    }
}
