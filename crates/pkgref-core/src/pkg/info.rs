//! Metadata of an installed package, read from its own `package.json`.

use crate::error::Error;
use crate::manifest::PACKAGE_JSON;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The parts of an installed package's manifest shown next to a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    pub homepage_url: Option<String>,
    pub repository_url: Option<String>,
    pub bugs_url: Option<String>,
}

/// `"https://…"` or `{ "url": "https://…" }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UrlField {
    Plain(String),
    Object { url: Option<String> },
    Other(serde_json::Value),
}

impl UrlField {
    fn into_url(self) -> Option<String> {
        match self {
            Self::Plain(url) => Some(url),
            Self::Object { url } => url,
            Self::Other(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPackageJson {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    homepage: Option<UrlField>,
    #[serde(default)]
    repository: Option<UrlField>,
    #[serde(default)]
    bugs: Option<UrlField>,
}

/// Read `<install_dir>/package.json`.
///
/// Missing `name`/`version` fields become empty strings; an installed
/// package without them is still worth showing.
///
/// # Errors
/// Returns `ManifestRead` if the file cannot be read and `ManifestParse`
/// if it is not a JSON object.
pub fn read_installed_package(install_dir: &Path) -> Result<InstalledPackage, Error> {
    let path = install_dir.join(PACKAGE_JSON);
    let content = fs::read_to_string(&path).map_err(|source| Error::ManifestRead {
        path: path.clone(),
        source,
    })?;
    let raw: RawPackageJson =
        serde_json::from_str(&content).map_err(|source| Error::ManifestParse { path, source })?;

    Ok(InstalledPackage {
        name: raw.name.unwrap_or_default(),
        version: raw.version.unwrap_or_default(),
        homepage_url: raw.homepage.and_then(UrlField::into_url),
        repository_url: raw.repository.and_then(UrlField::into_url),
        bugs_url: raw.bugs.and_then(UrlField::into_url),
    })
}
