//! Upward `node_modules` search bounded by a project root.

use super::fs::FileSystem;
use crate::config::ResolveOptions;
use crate::pkg::name::{is_valid_package_name, name_segments};
use pkgref_util::fs::{absolutize, ends_with_segment, strip_trailing_separators};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Maximum number of tried paths to record.
const MAX_TRIED_PATHS: usize = 20;

const NODE_MODULES: &str = "node_modules";

/// Resolution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStatus {
    Resolved,
    Unresolved,
}

/// Reason codes for unresolved lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveReasonCode {
    /// The name cannot be a package name.
    NameInvalid,
    /// No `node_modules/<name>` between the start and the boundary.
    NotInstalled,
}

impl std::fmt::Display for ResolveReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NameInvalid => "NAME_INVALID",
            Self::NotInstalled => "NOT_INSTALLED",
        };
        write!(f, "{s}")
    }
}

/// Result of an install directory lookup.
#[derive(Debug, Clone)]
pub struct ResolveResult {
    /// The package directory, when found.
    pub install_dir: Option<PathBuf>,
    /// Status.
    pub status: ResolveStatus,
    /// Reason code if unresolved.
    pub reason: Option<ResolveReasonCode>,
    /// Candidate paths checked, in order (capped).
    pub tried: Vec<PathBuf>,
}

impl ResolveResult {
    fn resolved(path: PathBuf, tried: Vec<PathBuf>) -> Self {
        Self {
            install_dir: Some(path),
            status: ResolveStatus::Resolved,
            reason: None,
            tried,
        }
    }

    fn unresolved(reason: ResolveReasonCode, tried: Vec<PathBuf>) -> Self {
        Self {
            install_dir: None,
            status: ResolveStatus::Unresolved,
            reason: Some(reason),
            tried,
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.status == ResolveStatus::Resolved
    }
}

/// Find the directory Node would load `name` from, starting at `start_dir`.
///
/// `start_dir` may be a file (its directory is used) or a directory ending
/// in `node_modules` (its parent is used). Each step checks
/// `<dir>/node_modules/<name>`, with scoped names joined as two segments.
/// The walk stops after probing `boundary` or the filesystem root,
/// whichever comes first. Relative `start_dir` and `boundary` are taken
/// relative to the process working directory.
#[must_use]
pub fn resolve_install_dir(
    fs: &dyn FileSystem,
    name: &str,
    start_dir: &Path,
    boundary: &Path,
    options: ResolveOptions,
) -> ResolveResult {
    let mut tried = Vec::new();

    if !is_valid_package_name(name) {
        return ResolveResult::unresolved(ResolveReasonCode::NameInvalid, tried);
    }
    let segments = name_segments(name);

    let mut current = start_dir.to_path_buf();
    if fs.is_file(&current) {
        current.pop();
    }
    if ends_with_segment(&current, NODE_MODULES) {
        current.pop();
    }
    // relative inputs are anchored at the working directory so they compare
    // equal to the canonical paths the walk produces
    let mut current = strip_trailing_separators(&absolutize(&current));
    let boundary = strip_trailing_separators(&absolutize(boundary));
    let canonical_boundary = if options.preserve_symlinks {
        None
    } else {
        fs.realpath(&boundary)
    };

    loop {
        if !options.preserve_symlinks {
            if let Some(real) = fs.realpath(&current) {
                current = real;
            }
        }

        let mut candidate = current.join(NODE_MODULES);
        candidate.extend(&segments);
        trace!(path = %candidate.display(), "candidate");
        add_tried(&mut tried, &candidate);

        if fs.exists(&candidate) {
            debug!(package = name, install_dir = %candidate.display(), "package found");
            return ResolveResult::resolved(candidate, tried);
        }

        let at_boundary =
            current == boundary || canonical_boundary.as_deref() == Some(current.as_path());
        if at_boundary || current.as_os_str().is_empty() {
            break;
        }
        if !current.pop() {
            break;
        }
    }

    debug!(package = name, start = %start_dir.display(), "package not installed");
    ResolveResult::unresolved(ResolveReasonCode::NotInstalled, tried)
}

fn add_tried(tried: &mut Vec<PathBuf>, path: &Path) {
    if tried.len() < MAX_TRIED_PATHS {
        tried.push(path.to_path_buf());
    }
}
