use std::path::{Component, Path, PathBuf};

/// Drop trailing path separators (`/proj/` -> `/proj`).
///
/// A bare root (`/`) is kept as is. Rebuilding from components also
/// collapses repeated separators and `.` segments; a path made only of
/// `.` segments becomes `.`.
#[must_use]
pub fn strip_trailing_separators(path: &Path) -> PathBuf {
    let stripped: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if stripped.as_os_str().is_empty() && !path.as_os_str().is_empty() {
        return PathBuf::from(".");
    }
    stripped
}

/// Anchor a relative path at the process working directory.
///
/// Absolute paths are returned unchanged. If the working directory is
/// unavailable the path is returned as given.
#[must_use]
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
}

/// Check whether the last component of `path` is exactly `name`.
#[must_use]
pub fn ends_with_segment(path: &Path, name: &str) -> bool {
    path.file_name().is_some_and(|n| n == name)
}
