//! Integration tests for `pkgref lookup --json` output.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const MANIFEST: &str = r#"{
  "name": "app",
  "dependencies": {
    "lodash": "^4.17.0",
    "left-pad": "^1.3.0"
  },
  "devDependencies": {
    "@types/node": "^20.0.0"
  }
}"#;

const LOCKFILE: &str = r#"{
  "name": "app",
  "lockfileVersion": 3,
  "packages": {
    "": { "dependencies": { "lodash": "^4.17.0" } },
    "node_modules/lodash": { "version": "4.17.21" }
  }
}"#;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "pkgref-cli", "--bin", "pkgref", "--"]);
    cmd
}

fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("package.json"), MANIFEST).unwrap();
    fs::write(dir.path().join("package-lock.json"), LOCKFILE).unwrap();
    install(dir.path(), "lodash", "4.17.21");
    install(dir.path(), "@types/node", "20.11.5");
    dir
}

fn install(root: &Path, name: &str, version: &str) {
    let dir = root.join("node_modules").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("package.json"),
        format!(
            r#"{{"name":"{name}","version":"{version}","repository":{{"type":"git","url":"https://example.com/{name}.git"}}}}"#
        ),
    )
    .unwrap();
}

fn offset_of(text: &str, needle: &str) -> usize {
    text.find(&format!("\"{needle}\"")).unwrap() + 1
}

fn lookup(dir: &Path, file: &str, position: &[String]) -> (Output, serde_json::Value) {
    let output = cargo_bin()
        .arg("--cwd")
        .arg(dir)
        .args(["--json", "lookup", file])
        .args(position)
        .arg("--root")
        .arg(dir)
        .output()
        .expect("Failed to run lookup command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    (output, json)
}

fn at_offset(offset: usize) -> Vec<String> {
    vec!["--offset".to_string(), offset.to_string()]
}

#[test]
fn test_lookup_installed_package() {
    let dir = project();
    let (output, json) = lookup(
        dir.path(),
        "package.json",
        &at_offset(offset_of(MANIFEST, "lodash") + 2),
    );

    assert!(output.status.success());
    assert_eq!(json["schema_version"].as_u64(), Some(1));
    assert_eq!(json["status"], "installed");
    assert_eq!(json["reference"]["package_name"], "lodash");
    assert_eq!(json["reference"]["declared_version_range"], "^4.17.0");
    assert_eq!(json["reference"]["dialect"], "package-json");

    let install_dir = json["install_dir"].as_str().unwrap();
    assert!(Path::new(install_dir).ends_with("node_modules/lodash"));

    assert_eq!(json["installed"]["version"], "4.17.21");
    assert_eq!(json["installed"]["satisfies"], true);
    assert_eq!(
        json["installed"]["repository_url"],
        "https://example.com/lodash.git"
    );
}

#[test]
fn test_lookup_scoped_dev_dependency() {
    let dir = project();
    let (output, json) = lookup(
        dir.path(),
        "package.json",
        &at_offset(offset_of(MANIFEST, "@types/node")),
    );

    assert!(output.status.success());
    assert_eq!(json["reference"]["package_name"], "@types/node");
    let install_dir = json["install_dir"].as_str().unwrap();
    assert!(Path::new(install_dir).ends_with("node_modules/@types/node"));
}

#[test]
fn test_lookup_not_installed_exits_with_one() {
    let dir = project();
    let (output, json) = lookup(
        dir.path(),
        "package.json",
        &at_offset(offset_of(MANIFEST, "left-pad")),
    );

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json["status"], "not_installed");
    assert_eq!(json["reference"]["package_name"], "left-pad");
    assert!(json.get("install_dir").is_none());
}

#[test]
fn test_lookup_no_reference() {
    let dir = project();
    let (output, json) = lookup(
        dir.path(),
        "package.json",
        &at_offset(offset_of(MANIFEST, "name")),
    );

    assert!(output.status.success());
    assert_eq!(json["status"], "no_reference");
    assert_eq!(json["reason"], "POSITION_NOT_A_REFERENCE");
    assert!(json.get("reference").is_none());
}

#[test]
fn test_lookup_line_column() {
    let dir = project();
    // line 3 is `    "lodash": "^4.17.0",`
    let position = ["--line", "3", "--column", "6"].map(String::from);
    let (output, json) = lookup(dir.path(), "package.json", &position);

    assert!(output.status.success());
    assert_eq!(json["reference"]["package_name"], "lodash");
}

#[test]
fn test_lookup_lockfile_entry() {
    let dir = project();
    let offset = LOCKFILE.find("\"node_modules/lodash\"").unwrap() + 5;
    let (output, json) = lookup(dir.path(), "package-lock.json", &at_offset(offset));

    assert!(output.status.success());
    assert_eq!(json["status"], "installed");
    assert_eq!(json["reference"]["dialect"], "lockfile-flat-map");
    assert_eq!(json["reference"]["package_name"], "lodash");
    assert_eq!(json["reference"]["declared_version_range"], "4.17.21");
}

#[test]
fn test_lookup_unrecognized_file() {
    let dir = project();
    fs::write(dir.path().join("tsconfig.json"), MANIFEST).unwrap();
    let (output, json) = lookup(
        dir.path(),
        "tsconfig.json",
        &at_offset(offset_of(MANIFEST, "lodash")),
    );

    assert!(output.status.success());
    assert_eq!(json["reason"], "UNRECOGNIZED_DIALECT");
}

#[test]
fn test_lookup_rejects_non_utf8_manifest() {
    let dir = project();
    let mut bytes = b"{\"description\": \"caf\xe9\",".to_vec();
    bytes.extend_from_slice(br#" "dependencies": { "lodash": "^4.17.0" } }"#);
    fs::write(dir.path().join("package.json"), &bytes).unwrap();
    let offset = bytes.windows(8).position(|w| w == b"\"lodash\"").unwrap() + 1;

    let output = cargo_bin()
        .arg("--cwd")
        .arg(dir.path())
        .args(["--json", "lookup", "package.json"])
        .args(at_offset(offset))
        .output()
        .expect("Failed to run lookup command");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read package manifest"), "{stderr}");
}

#[test]
fn test_list_json() {
    let dir = project();
    let output = cargo_bin()
        .arg("--cwd")
        .arg(dir.path())
        .args(["--json", "list"])
        .output()
        .expect("Failed to run list command");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(json["count"], 2);
    assert_eq!(json["packages"], serde_json::json!(["@types/node", "lodash"]));
}

#[test]
fn test_manager_json() {
    let dir = project();
    let output = cargo_bin()
        .arg("--cwd")
        .arg(dir.path())
        .args(["--json", "manager"])
        .output()
        .expect("Failed to run manager command");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(json["package_manager"], "npm");
}

#[test]
fn test_version_json() {
    let output = cargo_bin()
        .args(["--json", "version"])
        .output()
        .expect("Failed to run version command");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert!(json["version"].is_string());
    assert_eq!(json["lookup_schema_version"], 1);
}
