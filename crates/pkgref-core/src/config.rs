use crate::error::Error;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default idle time-to-live for parsed documents (ten minutes).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// Runtime configuration for pkgref.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,

    /// Filesystem resolver options.
    pub resolve: ResolveOptions,

    /// Parse cache options.
    pub cache: CacheOptions,
}

/// Options for the upward `node_modules` search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolveOptions {
    /// Skip realpath canonicalization of each visited directory.
    pub preserve_symlinks: bool,
}

/// Options for the parse cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheOptions {
    /// Idle time after which a cached document is dropped.
    pub ttl_secs: u64,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl CacheOptions {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
            resolve: ResolveOptions::default(),
            cache: CacheOptions::default(),
        }
    }
}

/// On-disk shape of `pkgref.json`. Only engine options are read from file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    resolve: ResolveOptions,
    cache: CacheOptions,
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Load engine options from a config file, keeping `cwd` and logging defaults.
    ///
    /// # Errors
    /// Returns `ConfigRead` if the file cannot be read and `ConfigParse` if
    /// it is not valid JSON of the expected shape.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile =
            serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            resolve: file.resolve,
            cache: file.cache,
            ..Self::default()
        })
    }

    /// Load `pkgref.json` from the project root above `cwd`, if one exists.
    ///
    /// A missing file yields the defaults; a present but broken file is an error.
    pub fn discover(cwd: &Path) -> Result<Self, Error> {
        let config = match paths::config_path(cwd) {
            Some(path) if path.is_file() => Self::load(&path)?,
            _ => Self::default(),
        };
        Ok(config.with_cwd(cwd.to_path_buf()))
    }

    /// Set working directory.
    #[must_use]
    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = cwd;
        self
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Set symlink preservation for the resolver.
    #[must_use]
    pub fn with_preserve_symlinks(mut self, preserve: bool) -> Self {
        self.resolve.preserve_symlinks = preserve;
        self
    }

    /// Set parse cache idle TTL.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache.ttl_secs = ttl.as_secs();
        self
    }
}
