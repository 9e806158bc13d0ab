#![deny(clippy::all)]
#![warn(clippy::pedantic)]

//! Benchmark harness for pkgref.
//!
//! Run benchmarks with: `cargo bench -p pkgref-bench`
//!
//! Fixture generators live here so every bench measures the same documents.

use std::fmt::Write;

/// Name of the `i`th synthetic package.
#[must_use]
pub fn package_name(i: usize) -> String {
    if i % 4 == 0 {
        format!("@scope{}/pkg-{i}", i % 7)
    } else {
        format!("pkg-{i}")
    }
}

/// A `package.json` declaring `deps` dependencies.
#[must_use]
pub fn package_json(deps: usize) -> String {
    let mut out = String::from("{\n  \"name\": \"bench-app\",\n  \"dependencies\": {\n");
    for i in 0..deps {
        let sep = if i + 1 == deps { "" } else { "," };
        let _ = writeln!(out, "    \"{}\": \"^{}.0.0\"{sep}", package_name(i), i % 10 + 1);
    }
    out.push_str("  }\n}\n");
    out
}

/// A lockfile v3 with a flat `packages` map of `deps` installs.
#[must_use]
pub fn package_lock(deps: usize) -> String {
    let mut out = String::from(
        "{\n  \"name\": \"bench-app\",\n  \"lockfileVersion\": 3,\n  \"packages\": {\n    \"\": {},\n",
    );
    for i in 0..deps {
        let sep = if i + 1 == deps { "" } else { "," };
        let _ = writeln!(
            out,
            "    \"node_modules/{}\": {{ \"version\": \"{}.0.0\", \"dependencies\": {{ \"{}\": \"*\" }} }}{sep}",
            package_name(i),
            i % 10 + 1,
            package_name((i + 1) % deps),
        );
    }
    out.push_str("  }\n}\n");
    out
}

/// Byte offset of the first quoted occurrence of `needle` (inside the quotes).
#[must_use]
pub fn offset_of(text: &str, needle: &str) -> Option<usize> {
    text.find(&format!("\"{needle}\"")).map(|i| i + 1)
}
