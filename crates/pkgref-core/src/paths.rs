use std::path::{Path, PathBuf};

/// Name of the optional per-project configuration file.
pub const CONFIG_FILE_NAME: &str = "pkgref.json";

/// Find the project root by walking up from `cwd` looking for `package.json` or `.git`.
///
/// Returns the first directory containing either marker, or `None` if neither is found.
#[must_use]
pub fn project_root(cwd: &Path) -> Option<PathBuf> {
    let mut current = cwd.to_path_buf();

    loop {
        if current.join("package.json").exists() || current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Path of the config file for the project containing `cwd`.
#[must_use]
pub fn config_path(cwd: &Path) -> Option<PathBuf> {
    project_root(cwd).map(|root| root.join(CONFIG_FILE_NAME))
}
