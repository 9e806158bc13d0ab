//! Query entry points: (file, text, offset) → package reference → install directory.

use crate::cache::DocumentCache;
use crate::config::ResolveOptions;
use crate::json::{locate, quoted_token_at, CodeRange};
use crate::manifest::{classify, split_install_path, ManifestFile, PackageReference};
use crate::pkg::name::validate_package_name;
use crate::resolver::{self, FileSystem};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Why a position does not name a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoReferenceReason {
    /// The file is not a manifest this engine understands.
    UnrecognizedDialect,
    /// The text is not valid JSON.
    MalformedDocument,
    /// The offset is not inside a quoted token.
    NotAStringToken,
    /// The token cannot be an npm package name.
    InvalidPackageName,
    /// The token is not in a package-name position.
    PositionNotAReference,
}

impl NoReferenceReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnrecognizedDialect => "UNRECOGNIZED_DIALECT",
            Self::MalformedDocument => "MALFORMED_DOCUMENT",
            Self::NotAStringToken => "NOT_A_STRING_TOKEN",
            Self::InvalidPackageName => "INVALID_PACKAGE_NAME",
            Self::PositionNotAReference => "POSITION_NOT_A_REFERENCE",
        }
    }
}

impl fmt::Display for NoReferenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for NoReferenceReason {}

/// Outcome of a full lookup.
///
/// "Not installed" is kept apart from "no reference": the first deserves
/// a user-visible notice, the second is the common silent case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    NoReference(NoReferenceReason),
    NotInstalled(PackageReference),
    Installed {
        reference: PackageReference,
        install_dir: PathBuf,
    },
    /// The caller cancelled before the filesystem walk.
    Cancelled,
}

impl Lookup {
    /// Stable status string for machine-readable output.
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::NoReference(_) => "no_reference",
            Self::NotInstalled(_) => "not_installed",
            Self::Installed { .. } => "installed",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub fn reference(&self) -> Option<&PackageReference> {
        match self {
            Self::NotInstalled(reference) | Self::Installed { reference, .. } => Some(reference),
            Self::NoReference(_) | Self::Cancelled => None,
        }
    }
}

/// Find the package reference under `offset`.
///
/// The token is the quoted string around the offset on its line (see
/// [`quoted_token_at`]).
///
/// # Errors
/// Returns the reason the position is not a package reference.
pub fn find_package_reference(
    cache: &dyn DocumentCache,
    file_path: &Path,
    raw_text: &str,
    offset: usize,
) -> Result<PackageReference, NoReferenceReason> {
    if ManifestFile::from_path(file_path).is_none() {
        return Err(NoReferenceReason::UnrecognizedDialect);
    }
    let range = quoted_token_at(raw_text, offset).ok_or(NoReferenceReason::NotAStringToken)?;
    find_package_reference_in_range(cache, file_path, raw_text, range)
}

/// Find the package reference whose token range is exactly `range`.
///
/// # Errors
/// Returns the reason the range is not a package reference.
pub fn find_package_reference_in_range(
    cache: &dyn DocumentCache,
    file_path: &Path,
    raw_text: &str,
    range: CodeRange,
) -> Result<PackageReference, NoReferenceReason> {
    let result = classify_range(cache, file_path, raw_text, range);
    if let Err(reason) = &result {
        debug!(path = %file_path.display(), range = %range, reason = %reason, "no package reference");
    }
    result
}

fn classify_range(
    cache: &dyn DocumentCache,
    file_path: &Path,
    raw_text: &str,
    range: CodeRange,
) -> Result<PackageReference, NoReferenceReason> {
    let file = ManifestFile::from_path(file_path).ok_or(NoReferenceReason::UnrecognizedDialect)?;

    let token = range
        .slice(raw_text)
        .filter(|token| !token.is_empty())
        .ok_or(NoReferenceReason::NotAStringToken)?;
    let name = split_install_path(token).map_or(token, |(_, name)| name);
    validate_package_name(name).map_err(|e| {
        debug!(code = e.code(), package = name, "candidate rejected");
        NoReferenceReason::InvalidPackageName
    })?;

    let doc = cache
        .document(file_path, raw_text)
        .map_err(|_| NoReferenceReason::MalformedDocument)?;
    let hit = locate(&doc, range).ok_or(NoReferenceReason::PositionNotAReference)?;

    classify(file, file_path, &doc, hit, name, range)
        .ok_or(NoReferenceReason::PositionNotAReference)
}

/// Resolve a reference to its install directory, searching no higher than `boundary`.
///
/// `None` means the package is not installed between the reference's
/// start directory and the boundary.
#[must_use]
pub fn resolve_install_dir(
    fs: &dyn FileSystem,
    reference: &PackageReference,
    boundary: &Path,
    options: ResolveOptions,
) -> Option<PathBuf> {
    resolver::resolve_install_dir(
        fs,
        &reference.package_name,
        &reference.resolution_start_dir,
        boundary,
        options,
    )
    .install_dir
}
