//! Per-workspace lookup session.
//!
//! A session owns one [`ParseCache`] and the resolver options for a single
//! project boundary. Hosts create one per workspace and share it by
//! reference; there is no process-wide cache.

use crate::cache::ParseCache;
use crate::config::{Config, ResolveOptions};
use crate::json::CodeRange;
use crate::manifest::PackageReference;
use crate::query::{self, Lookup, NoReferenceReason};
use crate::resolver::{self, FileSystem, OsFileSystem, ResolveResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

#[derive(Debug)]
pub struct Session {
    boundary: PathBuf,
    options: ResolveOptions,
    cache: ParseCache,
    fs: Box<dyn FileSystem>,
}

impl Session {
    /// Create a session for the project rooted at `boundary`.
    #[must_use]
    pub fn new(boundary: PathBuf) -> Self {
        Self {
            boundary,
            options: ResolveOptions::default(),
            cache: ParseCache::default(),
            fs: Box::new(OsFileSystem),
        }
    }

    /// Create a session using the resolver and cache options of `config`.
    #[must_use]
    pub fn from_config(config: &Config, boundary: PathBuf) -> Self {
        Self {
            boundary,
            options: config.resolve,
            cache: ParseCache::from_options(config.cache),
            fs: Box::new(OsFileSystem),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a different filesystem for resolution.
    #[must_use]
    pub fn with_fs(mut self, fs: Box<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    #[must_use]
    pub fn boundary(&self) -> &Path {
        &self.boundary
    }

    #[must_use]
    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    #[must_use]
    pub fn cache(&self) -> &ParseCache {
        &self.cache
    }

    /// Find the package reference under `offset` in `raw_text`.
    ///
    /// # Errors
    /// Returns the reason the position is not a package reference.
    pub fn find_reference(
        &self,
        file_path: &Path,
        raw_text: &str,
        offset: usize,
    ) -> Result<PackageReference, NoReferenceReason> {
        query::find_package_reference(&self.cache, file_path, raw_text, offset)
    }

    /// Find the package reference whose token range is exactly `range`.
    ///
    /// # Errors
    /// Returns the reason the range is not a package reference.
    pub fn find_reference_in_range(
        &self,
        file_path: &Path,
        raw_text: &str,
        range: CodeRange,
    ) -> Result<PackageReference, NoReferenceReason> {
        query::find_package_reference_in_range(&self.cache, file_path, raw_text, range)
    }

    /// Resolve `reference` against the filesystem, keeping the list of tried paths.
    #[must_use]
    pub fn resolve(&self, reference: &PackageReference) -> ResolveResult {
        resolver::resolve_install_dir(
            self.fs.as_ref(),
            &reference.package_name,
            &reference.resolution_start_dir,
            &self.boundary,
            self.options,
        )
    }

    /// Full lookup: offset → reference → install directory.
    #[must_use]
    pub fn lookup(&self, file_path: &Path, raw_text: &str, offset: usize) -> Lookup {
        let reference = match self.find_reference(file_path, raw_text, offset) {
            Ok(reference) => reference,
            Err(reason) => return Lookup::NoReference(reason),
        };
        self.finish(reference)
    }

    /// Full lookup for an explicit selection.
    #[must_use]
    pub fn lookup_range(&self, file_path: &Path, raw_text: &str, range: CodeRange) -> Lookup {
        let reference = match self.find_reference_in_range(file_path, raw_text, range) {
            Ok(reference) => reference,
            Err(reason) => return Lookup::NoReference(reason),
        };
        self.finish(reference)
    }

    /// Like [`Session::lookup`], but gives up before touching the
    /// filesystem once `cancelled` is set.
    #[must_use]
    pub fn lookup_cancellable(
        &self,
        file_path: &Path,
        raw_text: &str,
        offset: usize,
        cancelled: &AtomicBool,
    ) -> Lookup {
        if cancelled.load(Ordering::Acquire) {
            return Lookup::Cancelled;
        }
        let reference = match self.find_reference(file_path, raw_text, offset) {
            Ok(reference) => reference,
            Err(reason) => return Lookup::NoReference(reason),
        };
        if cancelled.load(Ordering::Acquire) {
            debug!(package = %reference.package_name, "lookup cancelled before resolution");
            return Lookup::Cancelled;
        }
        self.finish(reference)
    }

    fn finish(&self, reference: PackageReference) -> Lookup {
        let result = self.resolve(&reference);
        match result.install_dir {
            Some(install_dir) => Lookup::Installed {
                reference,
                install_dir,
            },
            None => {
                debug!(
                    package = %reference.package_name,
                    start = %reference.resolution_start_dir.display(),
                    tried = result.tried.len(),
                    "package not installed"
                );
                Lookup::NotInstalled(reference)
            }
        }
    }
}
