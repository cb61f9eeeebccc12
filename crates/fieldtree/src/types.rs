use core::fmt;

/// Classifies a configuration tree node, wrapping the engine's `i32` item type.
///
/// The engine reports many item types; only boxes and terminals are listed
/// below the first tree level. This newtype keeps the raw code intact so
/// unknown types still round-trip into labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeCode(pub i32);

impl TypeCode {
    /// A fieldbus master / I/O device (e.g. an EtherCAT master).
    pub const DEVICE: TypeCode = TypeCode(2);
    /// A box (coupler or slave head station).
    pub const BOX: TypeCode = TypeCode(5);
    /// A terminal (slice within a box).
    pub const TERMINAL: TypeCode = TypeCode(6);

    /// Returns `true` for the types that may be listed at depth 1 and 2.
    pub fn is_nested_eligible(self) -> bool {
        self == Self::BOX || self == Self::TERMINAL
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for TypeCode {
    fn from(value: i32) -> Self {
        TypeCode(value)
    }
}

impl From<TypeCode> for i32 {
    fn from(code: TypeCode) -> Self {
        code.0
    }
}

/// Position of a listed node below the walked root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Depth {
    /// Direct child of the root: a device.
    Device = 0,
    /// Child of a device.
    Child = 1,
    /// Child of a child. The walker never goes further.
    Grandchild = 2,
}

impl Depth {
    /// The level below this one, or `None` at the walk limit.
    pub fn next(self) -> Option<Depth> {
        match self {
            Depth::Device => Some(Depth::Child),
            Depth::Child => Some(Depth::Grandchild),
            Depth::Grandchild => None,
        }
    }

    /// Whether a node of `code` is listed at this depth.
    pub fn admits(self, code: TypeCode) -> bool {
        match self {
            Depth::Device => true,
            Depth::Child | Depth::Grandchild => code.is_nested_eligible(),
        }
    }
}

impl From<Depth> for u8 {
    fn from(depth: Depth) -> Self {
        depth as u8
    }
}

// --- Well-known Tree Roots ---

/// Lookup key of the I/O devices root.
pub const KEY_DEVICE_ROOT: &str = "TIID";
/// Lookup key of the root that receives imported (XTI) devices.
pub const KEY_IMPORTED_DEVICE_ROOT: &str = "TIIC";
/// Lookup key of the real-time system / system information root.
pub const KEY_SYSTEM_INFO_ROOT: &str = "TIRS";

/// Separator used by the engine between names in a tree path.
pub const PATH_SEPARATOR: char = '^';

/// Names which of the configured roots an operation walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKey {
    DeviceRoot,
    ImportedDeviceRoot,
    SystemInfoRoot,
}

impl fmt::Display for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootKey::DeviceRoot => write!(f, "device root"),
            RootKey::ImportedDeviceRoot => write!(f, "imported device root"),
            RootKey::SystemInfoRoot => write!(f, "system info root"),
        }
    }
}
