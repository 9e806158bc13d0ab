//! `pkgref manager` command implementation.

use miette::{IntoDiagnostic, Result};
use pkgref_core::paths::project_root;
use pkgref_core::{detect_package_manager, PackageManager};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct ManagerOutput {
    root: PathBuf,
    package_manager: Option<PackageManager>,
}

pub fn run(dir: &Path, json: bool) -> Result<()> {
    let root = project_root(dir).unwrap_or_else(|| dir.to_path_buf());
    let package_manager = detect_package_manager(&root);

    if json {
        let output = ManagerOutput {
            root,
            package_manager,
        };
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    } else {
        match package_manager {
            Some(pm) => println!("{pm}"),
            None => println!("unknown ({} has no package manager evidence)", root.display()),
        }
    }
    Ok(())
}
