//! Compilation database tooling for the control unit and sensor unit firmware.
//!
//! This crate provides:
//! - compile_commands.json parsing with passthrough of unknown keys
//! - Filtering a database for clang-tidy (project sources only, no GCC-only flags)
//! - Merging the test runner's database into the firmware one
//! - The PlatformIO post-build hook that regenerates the database
//! - Tool configuration (`compdb.toml`)
//!
//! # Example
//!
//! ```toml
//! # compdb.toml
//! [filter]
//! include = ["components", "main"]
//! deny_flags = ["-mlongcalls", "-fno-shrink-wrap"]
//!
//! [hook]
//! command = "pio run --target compiledb"
//! ```

mod compile_commands;
pub mod config;
mod error;
mod filter;
mod hook;
mod io;
mod merge;

pub use compile_commands::{CompileCommand, CompileCommands};
pub use config::{Config, FilterConfig, HookConfig, PathsConfig, ResolvedPaths};
pub use error::{BuildError, Result};
pub use filter::{CommandFilter, FilterReport};
pub use hook::PostBuildHook;
pub use merge::{merge_files, MergeOutcome};
