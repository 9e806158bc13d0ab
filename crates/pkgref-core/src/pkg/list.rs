//! Listing the packages installed in a `node_modules` directory.

use super::name::is_valid_package_name;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

/// pnpm's virtual store keeps its hoisted packages here.
const PNPM_HOISTED: &str = ".pnpm/node_modules";

/// Sorted, deduplicated names of the packages in `node_modules`.
///
/// Scope directories (`@types`) are expanded into `@types/node` etc., and
/// pnpm's `.pnpm/node_modules` store is included. Entries that are not
/// valid package names (`.bin`, `.package-lock.json`) are skipped.
///
/// # Errors
/// Returns an error if `node_modules` itself cannot be read.
pub fn list_installed_packages(node_modules: &Path) -> io::Result<Vec<String>> {
    let mut names = BTreeSet::new();
    collect(node_modules, &mut names)?;

    let pnpm = node_modules.join(PNPM_HOISTED);
    if pnpm.is_dir() {
        collect(&pnpm, &mut names)?;
    }

    Ok(names.into_iter().collect())
}

fn collect(dir: &Path, names: &mut BTreeSet<String>) -> io::Result<()> {
    for entry in fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();

        if name.starts_with('@') {
            let Ok(scope_entries) = fs::read_dir(&path) else {
                continue;
            };
            for scope_entry in scope_entries.flatten() {
                if !scope_entry.path().is_dir() {
                    continue;
                }
                let scoped = format!("{name}/{}", scope_entry.file_name().to_string_lossy());
                if is_valid_package_name(&scoped) {
                    names.insert(scoped);
                }
            }
        } else if is_valid_package_name(&name) {
            names.insert(name.into_owned());
        }
    }
    Ok(())
}
