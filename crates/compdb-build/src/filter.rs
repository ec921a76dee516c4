//! Preparing a compilation database for clang-tidy.
//!
//! The ESP-IDF toolchain passes Xtensa/GCC-only flags that clang rejects, and
//! the database also covers framework sources nobody wants linted. Despite the
//! name, selection is an allow-list: an entry survives only if its file path
//! contains one of the configured fragments.

use crate::config::FilterConfig;
use crate::{CompileCommand, CompileCommands};
use std::path::Path;
use tracing::{debug, info};

/// Selects project entries and strips unsupported flags.
#[derive(Debug, Clone)]
pub struct CommandFilter {
    include: Vec<String>,
    deny_flags: Vec<String>,
}

/// What a filter pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// Entries in the input database.
    pub read: usize,
    /// Entries written to the output.
    pub kept: usize,
    /// Argument tokens dropped across all kept entries.
    pub flags_removed: usize,
}

impl CommandFilter {
    pub fn new(include: Vec<String>, deny_flags: Vec<String>) -> Self {
        Self {
            include,
            deny_flags,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.include.clone(), config.deny_flags.clone())
    }

    /// Whether the entry's file belongs to the project sources.
    pub fn is_relevant(&self, cmd: &CompileCommand) -> bool {
        self.include.iter().any(|needle| cmd.file_contains(needle))
    }

    pub fn is_denied(&self, arg: &str) -> bool {
        self.deny_flags.iter().any(|flag| flag == arg)
    }

    /// Rewrite one entry's `arguments` without denied flags.
    ///
    /// `command` is left as it was, so it may still mention removed flags.
    pub fn clean(&self, mut cmd: CompileCommand) -> crate::Result<(CompileCommand, usize)> {
        let args = cmd.get_args()?;
        let before = args.len();
        let args: Vec<String> = args.into_iter().filter(|a| !self.is_denied(a)).collect();
        let removed = before - args.len();
        cmd.set_arguments(args);
        Ok((cmd, removed))
    }

    /// Filter a whole database, preserving entry order.
    pub fn apply(&self, commands: CompileCommands) -> crate::Result<(CompileCommands, FilterReport)> {
        let mut report = FilterReport {
            read: commands.len(),
            ..FilterReport::default()
        };
        let mut kept = Vec::new();

        for cmd in commands {
            if !self.is_relevant(&cmd) {
                debug!(file = %cmd.file().display(), "skipping entry");
                continue;
            }
            let (cmd, removed) = self.clean(cmd)?;
            report.flags_removed += removed;
            kept.push(cmd);
        }

        report.kept = kept.len();
        Ok((CompileCommands::new(kept), report))
    }

    /// Read `input`, filter it and write the result to `output`.
    pub fn filter_file(&self, input: &Path, output: &Path) -> crate::Result<FilterReport> {
        let commands = CompileCommands::from_file(input)?;
        let (filtered, report) = self.apply(commands)?;
        filtered.write_to(output)?;

        info!(
            input = %input.display(),
            output = %output.display(),
            read = report.read,
            kept = report.kept,
            flags_removed = report.flags_removed,
            "filtered compile commands"
        );
        Ok(report)
    }
}

impl Default for CommandFilter {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}
