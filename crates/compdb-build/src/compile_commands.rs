//! compile_commands.json parsing.
//!
//! PlatformIO (and CMake) can generate a compile_commands.json file that
//! contains the exact compilation commands for each source file. Each entry is
//! kept as its original JSON object; only `file`, `command` and `arguments`
//! are interpreted, everything else is written back exactly as it was read.

use crate::BuildError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A single compile command from compile_commands.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct CompileCommand {
    /// The source file path, copied out of `fields`.
    file: PathBuf,

    /// The whole entry, keys in their original order.
    fields: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for CompileCommand {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let file = match fields.get("file") {
            Some(Value::String(file)) => PathBuf::from(file),
            Some(other) => return Err(format!("invalid `file` value {other}, expected a string")),
            None => return Err("missing field `file`".to_string()),
        };
        Ok(Self { file, fields })
    }
}

impl From<CompileCommand> for Map<String, Value> {
    fn from(cmd: CompileCommand) -> Self {
        cmd.fields
    }
}

impl CompileCommand {
    /// Create an entry for `file` with only a raw command line.
    pub fn new(file: impl Into<PathBuf>, command: impl Into<String>) -> Self {
        let file = file.into();
        let mut fields = Map::new();
        fields.insert(
            "file".to_string(),
            Value::String(file.to_string_lossy().into_owned()),
        );
        fields.insert("command".to_string(), Value::String(command.into()));
        Self { file, fields }
    }

    /// The source file path.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Look up any key of the entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The raw command line, if the entry has one.
    pub fn command(&self) -> Option<&str> {
        self.fields.get("command").and_then(Value::as_str)
    }

    /// Get the compilation arguments as a vector.
    ///
    /// A non-empty `arguments` list wins; otherwise `command` is split on
    /// whitespace (quoted strings are not handled).
    pub fn get_args(&self) -> crate::Result<Vec<String>> {
        if let Some(args) = self.fields.get("arguments").filter(|v| is_truthy(v)) {
            return args
                .as_array()
                .and_then(|items| {
                    items
                        .iter()
                        .map(|a| a.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                })
                .ok_or_else(|| self.invalid("arguments"));
        }

        match self.fields.get("command") {
            Some(Value::String(cmd)) => Ok(cmd.split_whitespace().map(str::to_string).collect()),
            None | Some(Value::Null) => Err(BuildError::MissingCommand {
                file: self.file.clone(),
            }),
            Some(_) => Err(self.invalid("command")),
        }
    }

    /// Replace `arguments`, keeping its position if the key already exists.
    pub fn set_arguments(&mut self, args: Vec<String>) {
        let args = args.into_iter().map(Value::String).collect();
        self.fields.insert("arguments".to_string(), Value::Array(args));
    }

    /// Whether the source path contains `needle` anywhere.
    pub fn file_contains(&self, needle: &str) -> bool {
        self.file.to_string_lossy().contains(needle)
    }

    fn invalid(&self, field: &'static str) -> BuildError {
        BuildError::InvalidField {
            file: self.file.clone(),
            field,
        }
    }
}

/// `null`, `[]` and the like count as "not given".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
    }
}

/// Collection of compile commands (from compile_commands.json).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompileCommands {
    commands: Vec<CompileCommand>,
}

impl CompileCommands {
    pub fn new(commands: Vec<CompileCommand>) -> Self {
        Self { commands }
    }

    /// Load compile commands from a JSON file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        crate::io::read_json(path)
    }

    /// Write the database as indented JSON, creating parent directories.
    pub fn write_to(&self, path: &Path) -> crate::Result<()> {
        crate::io::write_json(path, self)
    }

    /// Render the database the way it is written to disk.
    pub fn to_json(&self) -> crate::Result<String> {
        crate::io::to_pretty_json(self)
    }

    /// Get all compile commands.
    pub fn commands(&self) -> &[CompileCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn into_commands(self) -> Vec<CompileCommand> {
        self.commands
    }
}

impl FromStr for CompileCommands {
    type Err = serde_json::Error;

    /// Parse compile commands from a JSON string.
    fn from_str(json: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(json)
    }
}

impl FromIterator<CompileCommand> for CompileCommands {
    fn from_iter<I: IntoIterator<Item = CompileCommand>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for CompileCommands {
    type Item = CompileCommand;
    type IntoIter = std::vec::IntoIter<CompileCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compile_commands() {
        let json = r#"[
            {
                "directory": "/home/user/controlunit/build",
                "file": "/home/user/controlunit/main/main.cpp",
                "command": "xtensa-esp32-elf-g++ -mlongcalls -Os -c main.cpp"
            },
            {
                "directory": "/home/user/controlunit/build",
                "file": "/home/user/controlunit/components/rest_server/RestServer.cpp",
                "arguments": ["xtensa-esp32-elf-g++", "-Os", "-c", "RestServer.cpp"]
            }
        ]"#;

        let cmds: CompileCommands = json.parse().unwrap();
        assert_eq!(cmds.len(), 2);
        assert_eq!(
            cmds.commands()[0].file(),
            Path::new("/home/user/controlunit/main/main.cpp")
        );

        let args = cmds.commands()[0].get_args().unwrap();
        assert_eq!(
            args,
            vec!["xtensa-esp32-elf-g++", "-mlongcalls", "-Os", "-c", "main.cpp"]
        );

        let args = cmds.commands()[1].get_args().unwrap();
        assert_eq!(args[3], "RestServer.cpp");
    }

    #[test]
    fn test_empty_arguments_fall_back_to_command() {
        let json = r#"[
            {"file": "main.c", "arguments": [], "command": "gcc  -c\tmain.c"},
            {"file": "util.c", "arguments": null, "command": "gcc -c util.c"}
        ]"#;
        let cmds: CompileCommands = json.parse().unwrap();

        assert_eq!(cmds.commands()[0].get_args().unwrap(), vec!["gcc", "-c", "main.c"]);
        assert_eq!(cmds.commands()[1].get_args().unwrap(), vec!["gcc", "-c", "util.c"]);
    }

    #[test]
    fn test_missing_command_is_an_error() {
        let cmds: CompileCommands = r#"[{"file": "main.c"}]"#.parse().unwrap();

        let err = cmds.commands()[0].get_args().unwrap_err();
        assert!(matches!(err, BuildError::MissingCommand { file } if file == Path::new("main.c")));
    }

    #[test]
    fn test_wrongly_typed_arguments_is_an_error() {
        let cmds: CompileCommands =
            r#"[{"file": "a.c", "arguments": ["cc", 3]}, {"file": "b.c", "command": 7}]"#
                .parse()
                .unwrap();

        let err = cmds.commands()[0].get_args().unwrap_err();
        assert!(matches!(err, BuildError::InvalidField { field: "arguments", .. }));
        let err = cmds.commands()[1].get_args().unwrap_err();
        assert!(matches!(err, BuildError::InvalidField { field: "command", .. }));
    }

    #[test]
    fn test_missing_file_fails_to_parse() {
        let result: Result<CompileCommands, _> = r#"[{"command": "gcc -c x.c"}]"#.parse();
        assert!(result.is_err());

        let result: Result<CompileCommands, _> = r#"[{"file": 12, "command": "cc"}]"#.parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_entries_round_trip_unchanged() {
        let json = r#"[{"command":"cc a.c","zeta":1,"directory":7,"file":"a.c","output":null,"alpha":{"x":[true]}}]"#;
        let cmds: CompileCommands = json.parse().unwrap();

        assert_eq!(serde_json::to_string(&cmds).unwrap(), json);
    }

    #[test]
    fn test_set_arguments_keeps_or_appends_position() {
        let json = r#"[
            {"arguments": ["cc", "a.c"], "file": "a.c", "output": "a.o"},
            {"command": "cc b.c", "file": "b.c", "output": "b.o"}
        ]"#;
        let cmds: CompileCommands = json.parse().unwrap();
        let mut commands = cmds.into_commands();
        for cmd in &mut commands {
            cmd.set_arguments(vec!["cc".to_string()]);
        }

        let out = serde_json::to_string(&CompileCommands::new(commands)).unwrap();
        assert_eq!(
            out,
            r#"[{"arguments":["cc"],"file":"a.c","output":"a.o"},{"command":"cc b.c","file":"b.c","output":"b.o","arguments":["cc"]}]"#
        );
    }

    #[test]
    fn test_pretty_output_uses_two_space_indent() {
        let cmds = CompileCommands::new(vec![CompileCommand::new("a.c", "cc a.c")]);

        let expected = "[\n  {\n    \"file\": \"a.c\",\n    \"command\": \"cc a.c\"\n  }\n]";
        assert_eq!(cmds.to_json().unwrap(), expected);
    }

    #[test]
    fn test_non_ascii_written_as_utf8() {
        let cmds = CompileCommands::new(vec![CompileCommand::new("main/größe.c", "cc größe.c")]);

        let json = cmds.to_json().unwrap();
        assert!(json.contains("\"main/größe.c\""));
        assert!(!json.contains("\\u00"));
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("compile_commands.json");

        let cmds = CompileCommands::new(vec![CompileCommand::new("a.c", "cc a.c")]);
        cmds.write_to(&path).unwrap();

        assert_eq!(CompileCommands::from_file(&path).unwrap(), cmds);
    }

    #[test]
    fn test_from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compile_commands.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = CompileCommands::from_file(&path).unwrap_err();
        assert!(matches!(err, BuildError::ParseJson { path: p, .. } if p == path));
    }
}
