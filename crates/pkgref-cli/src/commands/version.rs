use miette::{IntoDiagnostic, Result};
use pkgref_core::version::version_string;
use pkgref_core::{LOOKUP_SCHEMA_VERSION, VERSION};
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput {
    version: &'static str,
    lookup_schema_version: u32,
}

pub fn run(json: bool) -> Result<()> {
    if json {
        let output = VersionOutput {
            version: VERSION,
            lookup_schema_version: LOOKUP_SCHEMA_VERSION,
        };
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    } else {
        println!("{}", version_string());
    }
    Ok(())
}
