//! `pkgref lookup` command implementation.
//!
//! Reads a manifest, finds the package reference at the cursor and
//! resolves it to its `node_modules` directory.

use miette::{miette, IntoDiagnostic, Result};
use pkgref_core::{
    read_installed_package, version_satisfies, Config, Error, InstalledPackage, LineIndex, Lookup,
    NoReferenceReason, PackageReference, Session, LOOKUP_SCHEMA_VERSION,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exit code when the reference is valid but the package is not installed.
const EXIT_NOT_INSTALLED: i32 = 1;

/// Cursor position in the file.
#[derive(Debug, Clone, Copy)]
pub enum Position {
    Offset(usize),
    /// 0-based line and character column.
    LineColumn { line: usize, column: usize },
}

#[derive(Debug)]
pub struct LookupArgs {
    pub file: PathBuf,
    pub position: Position,
    pub root: Option<PathBuf>,
}

/// Result for JSON output.
#[derive(Serialize)]
struct LookupOutput<'a> {
    schema_version: u32,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<NoReferenceReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<&'a PackageReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    install_dir: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    installed: Option<InstalledOutput>,
}

#[derive(Serialize)]
struct InstalledOutput {
    #[serde(flatten)]
    package: InstalledPackage,
    /// Whether the installed version satisfies the declared range, when decidable.
    satisfies: Option<bool>,
}

pub fn run(config: &Config, args: LookupArgs, json: bool) -> Result<()> {
    let file = config.cwd.join(&args.file);
    // offsets are byte offsets into the file, so the text must not be re-encoded
    let text = fs::read_to_string(&file)
        .map_err(|source| Error::ManifestRead {
            path: file.clone(),
            source,
        })
        .into_diagnostic()?;

    let offset = match args.position {
        Position::Offset(offset) => offset,
        Position::LineColumn { line, column } => LineIndex::new(&text)
            .offset(&text, line, column)
            .ok_or_else(|| miette!("line {line} is past the end of {}", file.display()))?,
    };
    if offset > text.len() {
        return Err(miette!(
            "offset {offset} is past the end of {} ({} bytes)",
            file.display(),
            text.len()
        ));
    }

    let boundary = args
        .root
        .map_or_else(|| config.cwd.clone(), |root| config.cwd.join(root));
    debug!(file = %file.display(), offset, boundary = %boundary.display(), "lookup");

    let session = Session::from_config(config, boundary);
    let lookup = session.lookup(&file, &text, offset);

    let installed = match &lookup {
        Lookup::Installed {
            reference,
            install_dir,
        } => installed_output(reference, install_dir),
        _ => None,
    };

    if json {
        print_json(&lookup, installed)?;
    } else {
        print_human(&lookup, installed.as_ref(), &file, offset);
    }

    if matches!(lookup, Lookup::NotInstalled(_)) {
        std::process::exit(EXIT_NOT_INSTALLED);
    }
    Ok(())
}

fn installed_output(reference: &PackageReference, install_dir: &Path) -> Option<InstalledOutput> {
    let package = match read_installed_package(install_dir) {
        Ok(package) => package,
        Err(e) => {
            debug!(error = %e, "installed package has no readable manifest");
            return None;
        }
    };
    let satisfies = reference
        .declared_version_range
        .as_deref()
        .and_then(|range| version_satisfies(&package.version, range));
    Some(InstalledOutput { package, satisfies })
}

fn print_json(lookup: &Lookup, installed: Option<InstalledOutput>) -> Result<()> {
    let (reason, install_dir) = match lookup {
        Lookup::NoReference(reason) => (Some(*reason), None),
        Lookup::Installed { install_dir, .. } => (None, Some(install_dir.as_path())),
        Lookup::NotInstalled(_) | Lookup::Cancelled => (None, None),
    };
    let output = LookupOutput {
        schema_version: LOOKUP_SCHEMA_VERSION,
        status: lookup.status(),
        reason,
        reference: lookup.reference(),
        install_dir,
        installed,
    };
    println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    Ok(())
}

fn print_human(lookup: &Lookup, installed: Option<&InstalledOutput>, file: &Path, offset: usize) {
    match lookup {
        Lookup::NoReference(reason) => {
            println!(
                "no package reference at {}:{offset} ({reason})",
                file.display()
            );
        }
        Lookup::Cancelled => println!("lookup cancelled"),
        Lookup::NotInstalled(reference) => {
            eprintln!(
                "error: package '{}' not found in node_modules",
                reference.package_name
            );
            eprintln!(
                "hint: searched upward from {}",
                reference.resolution_start_dir.display()
            );
        }
        Lookup::Installed {
            reference,
            install_dir,
        } => {
            println!("{}", reference.package_name);
            println!("  Location:  {}", install_dir.display());
            println!("  Source:    {}", reference.dialect);
            if !reference.ancestors.is_empty() {
                println!("  Under:     {}", reference.ancestors.join(" > "));
            }
            if let Some(range) = &reference.declared_version_range {
                println!("  Declared:  {range}");
            }
            if let Some(installed) = installed {
                let mark = match installed.satisfies {
                    Some(true) => " \x1b[32m✓\x1b[0m",
                    Some(false) => " \x1b[31m✗\x1b[0m",
                    None => "",
                };
                println!("  Installed: {}{mark}", installed.package.version);
                let urls = [
                    ("Homepage:", &installed.package.homepage_url),
                    ("Repo:", &installed.package.repository_url),
                    ("Issues:", &installed.package.bugs_url),
                ];
                for (label, url) in urls
                    .iter()
                    .filter_map(|(label, url)| url.as_ref().map(|url| (label, url)))
                {
                    println!("  {label:<10} {url}");
                }
            }
        }
    }
}
