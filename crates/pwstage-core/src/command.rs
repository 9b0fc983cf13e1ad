//! Argument-vector transfer commands and their shell-quoted rendering.
//!
//! # Design
//! - Commands are executed without a shell; `render` exists for logs and tests.
//! - Rendering quotes only what a POSIX shell would otherwise split or expand.

use std::fmt;

use serde::Serialize;

/// A single external program invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferCommand {
    /// Program name or path.
    pub program: String,
    /// Arguments passed verbatim to the program.
    pub args: Vec<String>,
}

impl TransferCommand {
    /// Start a command for `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// One-line rendering a POSIX shell would parse back into the same argv.
    #[must_use]
    pub fn render(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for TransferCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Everything a wrapped task runs for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferPlan {
    /// Best-effort commands run first; their failure never aborts the task.
    pub preflight: Vec<TransferCommand>,
    /// The transfer itself, subject to the provider's failure policy.
    pub transfer: TransferCommand,
}

impl TransferPlan {
    /// A plan consisting of just the transfer.
    #[must_use]
    pub const fn single(transfer: TransferCommand) -> Self {
        Self {
            preflight: Vec::new(),
            transfer,
        }
    }

    /// Prepend a best-effort command.
    #[must_use]
    pub fn with_preflight(mut self, command: TransferCommand) -> Self {
        self.preflight.push(command);
        self
    }

    /// Rendered commands in execution order.
    #[must_use]
    pub fn render_lines(&self) -> Vec<String> {
        self.preflight
            .iter()
            .chain(std::iter::once(&self.transfer))
            .map(TransferCommand::render)
            .collect()
    }
}

/// Quote `value` for a POSIX shell, leaving plain words untouched.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_shell_safe) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

const fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '_' | '-' | '.' | '/' | ':' | '@' | '%' | '+' | '=' | ',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_leaves_plain_arguments_bare() {
        let cmd = TransferCommand::new("rsync").args(["-avzq", "h:/a/b", "/tmp/b"]);
        assert_eq!(cmd.render(), "rsync -avzq h:/a/b /tmp/b");
        assert_eq!(cmd.to_string(), cmd.render());
    }

    #[test]
    fn render_quotes_arguments_with_spaces() {
        let cmd = TransferCommand::new("rsync")
            .arg("-e")
            .arg("ssh -J bastion");
        assert_eq!(cmd.render(), "rsync -e 'ssh -J bastion'");
    }

    #[test]
    fn shell_quote_escapes_single_quotes_and_empties() {
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote("$HOME"), "'$HOME'");
        assert_eq!(shell_quote("gs://bucket/obj"), "gs://bucket/obj");
    }

    #[test]
    fn plan_lines_follow_execution_order() {
        let plan = TransferPlan::single(TransferCommand::new("rsync").arg("x"))
            .with_preflight(TransferCommand::new("ssh").arg("h"));
        assert_eq!(plan.render_lines(), vec!["ssh h", "rsync x"]);
    }
}
