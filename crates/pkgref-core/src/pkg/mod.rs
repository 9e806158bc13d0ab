//! Package-level helpers around a resolved reference.
//!
//! Provides utilities for:
//! - Validating npm package names
//! - Checking installed versions against declared ranges
//! - Reading installed package metadata
//! - Listing installed packages
//! - Detecting the project's package manager

pub mod info;
pub mod list;
pub mod manager;
pub mod name;
pub mod version;

pub use info::{read_installed_package, InstalledPackage};
pub use list::list_installed_packages;
pub use manager::{detect_package_manager, PackageManager};
pub use name::{codes as name_codes, is_valid_package_name, validate_package_name, NameError};
pub use version::version_satisfies;
