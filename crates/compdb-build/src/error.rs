//! Error types for compdb-build.

use miette::Diagnostic;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Result type for compdb-build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors that can occur while rewriting a compilation database.
#[derive(Error, Diagnostic, Debug)]
pub enum BuildError {
    /// Failed to read an input file.
    #[error("Failed to read {}: {source}", .path.display())]
    #[diagnostic(
        code(compdb::read),
        help("run the firmware build first so the compilation database exists")
    )]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write an output file.
    #[error("Failed to write {}: {source}", .path.display())]
    #[diagnostic(code(compdb::write))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to create the directory an output file lives in.
    #[error("Failed to create directory {}: {source}", .path.display())]
    #[diagnostic(code(compdb::create_dir))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse JSON (compile_commands.json).
    #[error("Failed to parse JSON in {}: {source}", .path.display())]
    #[diagnostic(
        code(compdb::parse_json),
        help("a compilation database is a JSON array of objects that each carry a \"file\" key")
    )]
    ParseJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to serialize a compilation database.
    #[error("Failed to serialize JSON: {0}")]
    #[diagnostic(code(compdb::serialize))]
    Serialize(#[source] serde_json::Error),

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML config {}: {source}", .path.display())]
    #[diagnostic(code(compdb::parse_toml))]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Failed to render TOML configuration.
    #[error("Failed to serialize TOML config: {0}")]
    #[diagnostic(code(compdb::serialize))]
    SerializeToml(#[source] toml::ser::Error),

    /// Entry carries neither `arguments` nor `command`.
    #[error("No arguments or command for {}", .file.display())]
    #[diagnostic(code(compdb::missing_command))]
    MissingCommand { file: PathBuf },

    /// `arguments` or `command` has the wrong JSON type.
    #[error("Invalid `{field}` for {}", .file.display())]
    #[diagnostic(
        code(compdb::invalid_field),
        help("`arguments` must be an array of strings and `command` a string")
    )]
    InvalidField { file: PathBuf, field: &'static str },

    /// The configured post-build command is blank.
    #[error("Post-build hook command is empty")]
    #[diagnostic(code(compdb::hook), help("set [hook] command in compdb.toml"))]
    EmptyHookCommand,

    /// The post-build command could not be started.
    #[error("Failed to run `{command}`: {source}")]
    #[diagnostic(code(compdb::hook))]
    HookSpawn {
        command: String,
        source: std::io::Error,
    },

    /// The post-build command ran but did not succeed.
    #[error("`{command}` exited with {status}")]
    #[diagnostic(code(compdb::hook))]
    HookFailed { command: String, status: ExitStatus },
}
