//! Whole-file JSON reading and writing shared by filter and merge.

use crate::BuildError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Read and parse a JSON file, attributing failures to `path`.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> crate::Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| BuildError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| BuildError::ParseJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize with 2-space indentation and no trailing newline.
pub(crate) fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> crate::Result<String> {
    serde_json::to_string_pretty(value).map_err(BuildError::Serialize)
}

/// Write `value` as pretty JSON to `path`, creating parent directories.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> crate::Result<()> {
    let content = to_pretty_json(value)?;
    write_file(path, &content)
}

/// Write `content` to `path`, creating parent directories.
pub(crate) fn write_file(path: &Path, content: &str) -> crate::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| BuildError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}
