//! PlatformIO post-build hook that keeps compile_commands.json current.
//!
//! PlatformIO only accepts hooks from Python extra-scripts, so registering
//! the hook means writing such a script; `platformio.ini` then lists it under
//! `extra_scripts`.

use crate::config::HookConfig;
use crate::BuildError;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// A command attached to a named PlatformIO build step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostBuildHook {
    step: String,
    command: String,
}

impl PostBuildHook {
    pub fn new(step: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            command: command.into(),
        }
    }

    pub fn from_config(config: &HookConfig) -> Self {
        Self::new(config.step.clone(), config.command.clone())
    }

    pub fn step(&self) -> &str {
        &self.step
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// The extra-script that registers this hook.
    ///
    /// Step and command are emitted as JSON string literals, which Python
    /// reads back verbatim.
    pub fn script(&self) -> crate::Result<String> {
        let step = serde_json::to_string(&self.step).map_err(BuildError::Serialize)?;
        let command = serde_json::to_string(&self.command).map_err(BuildError::Serialize)?;
        Ok(format!(
            "# Regenerates compile_commands.json after {step}.\n\
             # type: ignore\n\
             Import(\"env\")\n\
             env.AddPostAction({step}, {command})\n"
        ))
    }

    /// Write the extra-script to `path`, creating parent directories.
    pub fn install(&self, path: &Path) -> crate::Result<()> {
        crate::io::write_file(path, &self.script()?)?;
        info!(path = %path.display(), step = %self.step, "installed post-build hook");
        Ok(())
    }

    /// Run the regeneration command from `project_root`.
    pub fn run(&self, project_root: &Path) -> crate::Result<()> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or(BuildError::EmptyHookCommand)?;

        debug!(command = %self.command, cwd = %project_root.display(), "running post-build hook");
        let status = Command::new(program)
            .args(parts)
            .current_dir(project_root)
            .status()
            .map_err(|source| BuildError::HookSpawn {
                command: self.command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(BuildError::HookFailed {
                command: self.command.clone(),
                status,
            });
        }
        info!(command = %self.command, "regenerated compile commands");
        Ok(())
    }
}

impl Default for PostBuildHook {
    fn default() -> Self {
        Self::from_config(&HookConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_script() {
        let script = PostBuildHook::default().script().unwrap();

        assert!(script.contains("Import(\"env\")\n"));
        assert!(script
            .contains("env.AddPostAction(\"buildprog\", \"platformio run --target compiledb\")"));
    }

    #[test]
    fn test_script_escapes_quotes() {
        let hook = PostBuildHook::new("buildprog", r#"sh -c "echo hi""#);

        assert!(hook
            .script()
            .unwrap()
            .contains(r#"env.AddPostAction("buildprog", "sh -c \"echo hi\"")"#));
    }

    #[test]
    fn test_script_uses_python_compatible_escapes() {
        let hook = PostBuildHook::new("buildprog", "echo \u{1b}[0m C:\\pio\ttab");

        let script = hook.script().unwrap();

        assert!(script.contains(r#""echo \u001b[0m C:\\pio\ttab""#));
        assert!(!script.contains("\\u{"));
    }

    #[test]
    fn test_install_writes_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("helpers").join("compiledb.py");
        let hook = PostBuildHook::default();

        hook.install(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), hook.script().unwrap());
    }

    #[test]
    fn test_empty_command() {
        let dir = tempfile::tempdir().unwrap();
        let err = PostBuildHook::new("buildprog", "   ").run(dir.path()).unwrap_err();
        assert!(matches!(err, BuildError::EmptyHookCommand));
    }

    #[test]
    fn test_unknown_program() {
        let dir = tempfile::tempdir().unwrap();
        let err = PostBuildHook::new("buildprog", "compdb-no-such-program --flag")
            .run(dir.path())
            .unwrap_err();
        assert!(matches!(err, BuildError::HookSpawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_status() {
        let dir = tempfile::tempdir().unwrap();

        PostBuildHook::new("buildprog", "true").run(dir.path()).unwrap();

        let err = PostBuildHook::new("buildprog", "false").run(dir.path()).unwrap_err();
        assert!(matches!(err, BuildError::HookFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_uses_project_root() {
        let dir = tempfile::tempdir().unwrap();

        PostBuildHook::new("buildprog", "touch regenerated").run(dir.path()).unwrap();

        assert!(dir.path().join("regenerated").exists());
    }
}
