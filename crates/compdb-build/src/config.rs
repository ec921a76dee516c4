//! Tool configuration (compdb.toml format).
//!
//! Every section and key is optional; an absent key keeps the value the
//! firmware projects have always used.

use crate::BuildError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "compdb.toml";

/// GCC/Xtensa flags clang-tidy rejects.
pub const DEFAULT_DENY_FLAGS: &[&str] = &[
    "-mlongcalls",
    "-fno-shrink-wrap",
    "-fno-tree-switch-conversion",
    "-fstrict-volatile-bitfields",
];

/// Path fragments that mark a source file as belonging to the project.
pub const DEFAULT_INCLUDE: &[&str] = &["components", "main"];

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database locations, relative to the project root.
    pub paths: PathsConfig,

    /// Entry selection and flag removal.
    pub filter: FilterConfig,

    /// Post-build regeneration hook.
    pub hook: HookConfig,
}

/// File locations. Relative paths resolve against the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Database produced by the firmware build.
    pub input: PathBuf,

    /// Where the clang-tidy copy is written.
    pub filtered: PathBuf,

    /// Test runner database appended by `merge`.
    pub secondary: PathBuf,

    /// PlatformIO extra-script that registers the hook.
    pub hook_script: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// An entry is kept if its file path contains any of these.
    pub include: Vec<String>,

    /// Arguments removed wherever they appear verbatim.
    pub deny_flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Build step the action is attached to.
    pub step: String,

    /// Command that regenerates compile_commands.json.
    pub command: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: Path::new("build").join("compile_commands.json"),
            filtered: Path::new("build")
                .join("clang-tidy")
                .join("compile_commands.json"),
            secondary: Path::new("test_runner")
                .join("build")
                .join("compile_commands.json"),
            hook_script: Path::new("helpers").join("compiledb.py"),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            include: DEFAULT_INCLUDE.iter().map(|s| s.to_string()).collect(),
            deny_flags: DEFAULT_DENY_FLAGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            step: "buildprog".to_string(),
            command: "platformio run --target compiledb".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| BuildError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| BuildError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `compdb.toml` from the project root, or defaults if there is none.
    pub fn discover(project_root: &Path) -> crate::Result<Self> {
        let path = project_root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Render the effective configuration.
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(BuildError::SerializeToml)
    }
}

impl PathsConfig {
    /// Resolve every path against `project_root`.
    pub fn resolve(&self, project_root: &Path) -> ResolvedPaths {
        ResolvedPaths {
            input: resolve_path(project_root, &self.input),
            filtered: resolve_path(project_root, &self.filtered),
            secondary: resolve_path(project_root, &self.secondary),
            hook_script: resolve_path(project_root, &self.hook_script),
        }
    }
}

/// Absolute (or root-relative) locations derived from [`PathsConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub input: PathBuf,
    pub filtered: PathBuf,
    pub secondary: PathBuf,
    pub hook_script: PathBuf,
}

/// Join `path` onto `root` unless it is already absolute.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
