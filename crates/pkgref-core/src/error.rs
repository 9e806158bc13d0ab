use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pkgref operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read package manifest at {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid package manifest at {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_messages_name_the_path() {
        let err = Error::ManifestRead {
            path: PathBuf::from("/proj/package.json"),
            source: io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
        };
        let message = err.to_string();
        assert!(message.starts_with("Failed to read package manifest at /proj/package.json"));
        assert!(message.ends_with("valid UTF-8"));
        assert!(err.source().is_some());

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::ConfigParse {
            path: PathBuf::from("/proj/pkgref.json"),
            source,
        };
        assert!(err
            .to_string()
            .starts_with("Failed to parse config at /proj/pkgref.json"));
    }
}
