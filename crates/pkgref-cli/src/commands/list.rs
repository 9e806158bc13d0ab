//! `pkgref list` command implementation.

use miette::{miette, Result};
use pkgref_core::list_installed_packages;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct ListOutput {
    node_modules: PathBuf,
    count: usize,
    packages: Vec<String>,
}

pub fn run(dir: &Path, json: bool) -> Result<()> {
    let node_modules = dir.join("node_modules");
    let packages = list_installed_packages(&node_modules)
        .map_err(|e| miette!("cannot read {}: {e}", node_modules.display()))?;

    if json {
        let output = ListOutput {
            node_modules,
            count: packages.len(),
            packages,
        };
        let json = serde_json::to_string_pretty(&output).map_err(|e| miette!("{e}"))?;
        println!("{json}");
    } else {
        for name in &packages {
            println!("{name}");
        }
        eprintln!("{} packages in {}", packages.len(), node_modules.display());
    }
    Ok(())
}
