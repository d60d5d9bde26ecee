//! Executable plus argument list.

use std::fmt;
use std::str::FromStr;

use crate::RunnerError;

/// A program and its arguments.
///
/// Parsed from a single string by splitting on whitespace. There is no
/// quoting: an argument containing spaces cannot be expressed in the string
/// form, only through [`CommandLine::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits `line` on whitespace into program and arguments.
    pub fn parse(line: &str) -> Result<Self, RunnerError> {
        let mut parts = line.split_whitespace();
        let program = parts.next().ok_or(RunnerError::EmptyCommand)?;
        Ok(Self::new(program, parts))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl FromStr for CommandLine {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_program_and_args() {
        let cmd = CommandLine::parse("sudo migasfree-launcher force-upgrade").unwrap();
        assert_eq!(cmd.program(), "sudo");
        assert_eq!(cmd.args(), ["migasfree-launcher", "force-upgrade"]);
    }

    #[test]
    fn parse_collapses_repeated_spaces() {
        let cmd: CommandLine = "  migasfree-label   --verbose ".parse().unwrap();
        assert_eq!(cmd.program(), "migasfree-label");
        assert_eq!(cmd.args(), ["--verbose"]);
    }

    #[test]
    fn parse_rejects_blank() {
        assert!(matches!(
            CommandLine::parse("   "),
            Err(RunnerError::EmptyCommand)
        ));
    }

    #[test]
    fn display_joins_with_spaces() {
        let cmd = CommandLine::new("dbus-send", ["--system", "--print-reply"]);
        assert_eq!(cmd.to_string(), "dbus-send --system --print-reply");
    }
}
