#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod cache;
pub mod config;
pub mod error;
pub mod json;
pub mod manifest;
pub mod paths;
pub mod pkg;
pub mod query;
pub mod resolver;
pub mod session;
pub mod version;

pub use cache::{CacheStats, DocumentCache, NoDocumentCache, ParseCache};
pub use config::{CacheOptions, Config, ResolveOptions};
pub use error::Error;
pub use json::{CodeRange, JsonDocument, JsonParser, LineIndex, ParseError, RangedJsonParser};
pub use manifest::{ManifestDialect, ManifestFile, PackageReference};
pub use pkg::{
    detect_package_manager, list_installed_packages, name_codes, read_installed_package,
    validate_package_name, version_satisfies, InstalledPackage, NameError, PackageManager,
};
pub use query::{
    find_package_reference, find_package_reference_in_range, resolve_install_dir, Lookup,
    NoReferenceReason,
};
pub use resolver::{FileSystem, OsFileSystem, ResolveReasonCode, ResolveResult, ResolveStatus};
pub use session::Session;
pub use version::{LOOKUP_SCHEMA_VERSION, VERSION};
