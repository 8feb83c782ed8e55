//! Registry model shared by the regmcp server.
//!
//! This crate knows nothing about any particular operating system API. It provides:
//!
//! - Resolution of textual paths such as `HKLM\Software\Vendor` into a root hive
//!   plus a relative subkey path
//! - A tagged union over registry value kinds with one renderer per kind
//! - The error taxonomy shared by every registry operation
//! - `RegistryAccess` / `RegistryKey`, the seam a live backend plugs into
//! - `SnapshotRegistry`, an in-memory tree implementing that seam
//!
//! # Example
//!
//! ```rust
//! use regkit::{Hive, RegistryPath};
//!
//! let path = RegistryPath::parse(r"hklm\Software\Vendor").unwrap();
//! assert_eq!(path.hive, Hive::LocalMachine);
//! assert_eq!(path.sub_key, r"Software\Vendor");
//! ```

pub mod access;
pub mod error;
pub mod path;
pub mod snapshot;
pub mod value;

// Re-export key types at crate root.
pub use access::{RegistryAccess, RegistryKey};
pub use error::{ErrorKind, RegError, RegResult};
pub use path::{contains_ignore_case, join_sub_key, Hive, RegistryPath, SEPARATOR};
pub use snapshot::{SnapshotKey, SnapshotRegistry};
pub use value::{hex_display, RegValue, ValueKind};
