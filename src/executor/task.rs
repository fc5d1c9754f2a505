//! Per-target task results and the print-need decisions.
//!
//! A [`TaskResult`] is built exactly once from a [`CommandOutput`] and a
//! [`PrintPolicy`], and is read-only afterwards. The print flags decide what
//! is shown on the console and what is persisted; errors always force every
//! channel to be visible.

use serde::{Deserialize, Serialize};

use super::condition::{matches, OutputCondition};
use super::runner::CommandOutput;
use super::target::Target;
use crate::output::{Style, StyledText};

/// User-controlled printing switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintPolicy {
    /// Print stdout of successful targets
    pub print_stdout: bool,
    /// Print stderr of successful targets
    pub print_stderr: bool,
    /// Conditions stdout must satisfy to be printed when there is no error
    pub conditions: Vec<OutputCondition>,
}

impl Default for PrintPolicy {
    fn default() -> Self {
        Self {
            print_stdout: true,
            print_stderr: true,
            conditions: Vec::new(),
        }
    }
}

impl PrintPolicy {
    /// Decide which channels of a finished task are shown and persisted.
    pub fn decide(&self, has_error: bool, has_stderr: bool, stdout: &str) -> PrintDecision {
        PrintDecision {
            error: has_error,
            stdout: has_error || (self.print_stdout && matches(stdout, &self.conditions)),
            stderr: has_error || (self.print_stderr && has_stderr),
        }
    }
}

/// Which channels of one task are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintDecision {
    pub error: bool,
    pub stdout: bool,
    pub stderr: bool,
}

impl PrintDecision {
    /// Whether anything is printed at all
    pub fn anything(&self) -> bool {
        self.error || self.stdout || self.stderr
    }
}

/// The outcome of running the command against one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    /// Target the command ran against
    pub target: Target,

    /// Failure description, empty on success
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    /// Captured stdout
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    /// Captured stderr
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stderr: String,

    pub has_error: bool,
    pub has_stdout: bool,
    pub has_stderr: bool,

    pub print_error: bool,
    pub print_stdout: bool,
    pub print_stderr: bool,
    pub print_anything: bool,

    /// Captured stdout exactly as the command wrote it
    #[serde(skip)]
    pub raw_stdout: Vec<u8>,
    /// Captured stderr exactly as the command wrote it
    #[serde(skip)]
    pub raw_stderr: Vec<u8>,
}

impl TaskResult {
    /// Build the result for `target` and apply the print decisions.
    pub fn new(target: Target, output: CommandOutput, policy: &PrintPolicy) -> Self {
        let CommandOutput {
            stdout: raw_stdout,
            stderr: raw_stderr,
            error,
        } = output;
        let error = error.unwrap_or_default();
        let stdout = String::from_utf8_lossy(&raw_stdout).into_owned();
        let stderr = String::from_utf8_lossy(&raw_stderr).into_owned();

        let has_error = !error.is_empty();
        let has_stdout = !stdout.is_empty();
        let has_stderr = !stderr.is_empty();

        let decision = policy.decide(has_error, has_stderr, &stdout);

        Self {
            target,
            error,
            stdout,
            stderr,
            has_error,
            has_stdout,
            has_stderr,
            print_error: decision.error,
            print_stdout: decision.stdout,
            print_stderr: decision.stderr,
            print_anything: decision.anything(),
            raw_stdout,
            raw_stderr,
        }
    }

    /// Whether this result is classified as a warning (no error, some stderr)
    pub fn is_warning(&self) -> bool {
        !self.has_error && self.has_stderr
    }

    fn banner(&self, label: &str, total: usize) -> String {
        format!(
            "{}: {} ({}/{})",
            label, self.target.id, self.target.index, total
        )
    }

    /// Console lines for this result, empty when there is nothing to print.
    pub fn to_styled_text(&self, total: usize) -> Vec<StyledText> {
        if !self.print_anything {
            return Vec::new();
        }

        let mut lines = vec![
            StyledText::new("\n", Style::Text),
            StyledText::new("---", Style::Dim),
            StyledText::new(self.banner("TASK START", total), Style::Text),
        ];

        if self.print_error {
            lines.push(StyledText::new("ERROR:", Style::Warning));
            lines.push(StyledText::new(self.error.as_str(), Style::Warning));
        }

        if self.print_stderr {
            lines.push(StyledText::new("STDERR:", Style::Warning));
            lines.push(StyledText::new(self.stderr.trim(), Style::Warning));
        }

        if self.print_stdout {
            lines.push(StyledText::new("STDOUT:", Style::Info));
            lines.push(StyledText::new(self.stdout.trim(), Style::Info));
        }

        lines.push(StyledText::new(self.banner("TASK END", total), Style::Text));
        lines.push(StyledText::new("---", Style::Dim));
        lines
    }

    /// Plain delimited text for appending to an output file.
    pub fn to_text(&self, total: usize) -> String {
        if !self.print_anything {
            return String::new();
        }

        let mut output = format!("\n---\n{}\n", self.banner("TASK START", total));

        if self.print_error {
            output.push_str(&format!("\nERROR: {}\n", self.error));
        }

        if self.print_stderr {
            output.push_str(&format!("\nSTDERR:\n{}\n", self.stderr.trim()));
        }

        if self.print_stdout {
            output.push_str(&format!("\nSTDOUT:\n{}\n", self.stdout.trim()));
        }

        output.push_str(&format!("\n{}\n", self.banner("TASK END", total)));
        output
    }

    /// Copy with every channel whose print flag is off cleared.
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        if !masked.print_error {
            masked.error.clear();
        }
        if !masked.print_stdout {
            masked.stdout.clear();
            masked.raw_stdout.clear();
        }
        if !masked.print_stderr {
            masked.stderr.clear();
            masked.raw_stderr.clear();
        }
        masked
    }

    /// YAML document (with leading `---`) for multi-document files, empty
    /// when there is nothing to print.
    pub fn to_yaml_document(&self) -> crate::Result<String> {
        if !self.print_anything {
            return Ok(String::new());
        }
        Ok(format!("---\n{}", serde_yaml::to_string(&self.masked())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn target(index: usize) -> Target {
        let mut target = Target::new("/kube/config", "prod");
        target.index = index;
        target
    }

    fn quiet_policy() -> PrintPolicy {
        PrintPolicy {
            print_stdout: false,
            print_stderr: false,
            conditions: vec![OutputCondition::contains("never-present")],
        }
    }

    #[test]
    fn test_success_prints_stdout_by_default() {
        let result = TaskResult::new(
            target(1),
            CommandOutput::success("pod-a Running\n", ""),
            &PrintPolicy::default(),
        );
        assert!(!result.has_error);
        assert!(result.has_stdout);
        assert!(!result.has_stderr);
        assert!(!result.print_error);
        assert!(result.print_stdout);
        assert!(!result.print_stderr);
        assert!(result.print_anything);
    }

    #[test]
    fn test_error_forces_visibility() {
        let result = TaskResult::new(
            target(1),
            CommandOutput::failure("exit status 1", "", "connection refused"),
            &quiet_policy(),
        );
        assert!(result.has_error);
        assert!(result.print_error);
        assert!(result.print_stdout);
        assert!(result.print_stderr);
        assert!(result.print_anything);
    }

    #[test]
    fn test_decide_without_stderr() {
        let decision = PrintPolicy::default().decide(false, false, "");
        assert_eq!(
            decision,
            PrintDecision {
                error: false,
                stdout: true,
                stderr: false,
            }
        );
        assert!(decision.anything());
        assert!(!quiet_policy().decide(false, true, "out").anything());
    }

    #[test]
    fn test_condition_suppresses_stdout() {
        let policy = PrintPolicy {
            conditions: vec![OutputCondition::contains("Running")],
            ..PrintPolicy::default()
        };
        let result = TaskResult::new(target(1), CommandOutput::success("Pending", ""), &policy);
        assert!(!result.print_stdout);
        assert!(!result.print_anything);
    }

    #[test]
    fn test_stderr_printing_can_be_disabled() {
        let policy = PrintPolicy {
            print_stderr: false,
            ..PrintPolicy::default()
        };
        let result = TaskResult::new(target(1), CommandOutput::success("", "deprecated"), &policy);
        assert!(result.has_stderr);
        assert!(!result.print_stderr);
        assert!(result.is_warning());
    }

    #[test]
    fn test_to_text() {
        let result = TaskResult::new(
            target(2),
            CommandOutput::failure("exit status 1", "partial\n", "  connection refused\n"),
            &PrintPolicy::default(),
        );
        let expected = "\n---\nTASK START: kube--config@prod (2/3)\n\
                        \nERROR: exit status 1\n\
                        \nSTDERR:\nconnection refused\n\
                        \nSTDOUT:\npartial\n\
                        \nTASK END: kube--config@prod (2/3)\n";
        assert_eq!(result.to_text(3), expected);
    }

    #[test]
    fn test_nothing_to_print() {
        let result = TaskResult::new(target(1), CommandOutput::success("ok", ""), &quiet_policy());
        assert!(!result.print_anything);
        assert_eq!(result.to_text(1), "");
        assert!(result.to_styled_text(1).is_empty());
        assert_eq!(result.to_yaml_document().unwrap(), "");
    }

    #[test]
    fn test_styled_text_order() {
        let result = TaskResult::new(
            target(1),
            CommandOutput::failure("exit status 1", "out", "err"),
            &PrintPolicy::default(),
        );
        let plain: Vec<String> = result
            .to_styled_text(1)
            .iter()
            .map(|line| line.plain().to_string())
            .collect();
        assert_eq!(
            plain,
            vec![
                "\n",
                "---",
                "TASK START: kube--config@prod (1/1)",
                "ERROR:",
                "exit status 1",
                "STDERR:",
                "err",
                "STDOUT:",
                "out",
                "TASK END: kube--config@prod (1/1)",
                "---",
            ]
        );
    }

    #[test]
    fn test_masked_clears_unprinted_channels() {
        let policy = PrintPolicy {
            print_stdout: false,
            ..PrintPolicy::default()
        };
        let result = TaskResult::new(target(1), CommandOutput::success("out", "err"), &policy);
        let masked = result.masked();
        assert_eq!(masked.stdout, "");
        assert_eq!(masked.stderr, "err");
        assert!(masked.has_stdout);
    }

    #[test]
    fn test_json_field_names() {
        let result = TaskResult::new(
            target(1),
            CommandOutput::success("out", ""),
            &PrintPolicy::default(),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["target"]["context"], "prod");
        assert_eq!(json["stdout"], "out");
        assert_eq!(json["printAnything"], true);
        assert!(json.get("error").is_none());
        assert!(json.get("stderr").is_none());
    }
}
