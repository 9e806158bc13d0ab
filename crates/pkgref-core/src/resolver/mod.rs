//! Filesystem resolver: package name + start directory → install directory.

mod fs;
mod node_modules;

pub use fs::{FileSystem, OsFileSystem};
pub use node_modules::{resolve_install_dir, ResolveReasonCode, ResolveResult, ResolveStatus};
