//! Filesystem primitives used by the resolver.

use std::fmt;
use std::path::{Path, PathBuf};

/// The filesystem operations the `node_modules` walk needs.
pub trait FileSystem: Send + Sync + fmt::Debug {
    /// Whether anything exists at `path` (following symlinks).
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Canonical form of `path` with symlinks resolved, if it exists.
    fn realpath(&self, path: &Path) -> Option<PathBuf>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn realpath(&self, path: &Path) -> Option<PathBuf> {
        // dunce avoids \\?\ verbatim prefixes on Windows
        dunce::canonicalize(path).ok()
    }
}
