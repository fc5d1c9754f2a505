//! Run summary: classification of all task results once the pool drains.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::task::TaskResult;
use crate::error::{Error, Result};
use crate::output::{Style, StyledText};

/// Maximum number of characters of an error message shown in the summary.
pub const MAX_ERROR_CHARS: usize = 256;

/// Aggregate view over every task result of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Results whose command failed, in sequence order
    pub error_tasks: Vec<TaskResult>,
    pub error_count: usize,
    /// Results without error but with stderr, in sequence order
    pub warning_tasks: Vec<TaskResult>,
    pub warning_count: usize,
    pub total_count: usize,
}

impl RunSummary {
    /// Classify every result exactly once: error, then warning, else clean.
    pub fn from_results(results: &IndexMap<String, TaskResult>) -> Self {
        let mut error_tasks = Vec::new();
        let mut warning_tasks = Vec::new();

        for result in results.values() {
            if result.has_error {
                error_tasks.push(result.clone());
            } else if result.has_stderr {
                warning_tasks.push(result.clone());
            }
        }

        error_tasks.sort_by_key(|r| r.target.index);
        warning_tasks.sort_by_key(|r| r.target.index);

        Self {
            error_count: error_tasks.len(),
            warning_count: warning_tasks.len(),
            total_count: results.len(),
            error_tasks,
            warning_tasks,
        }
    }

    /// Number of targets without error
    pub fn success_count(&self) -> usize {
        self.total_count - self.error_count
    }

    /// Number of targets with neither error nor stderr
    pub fn clean_count(&self) -> usize {
        self.total_count - self.error_count - self.warning_count
    }

    /// Whether any target failed
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Final counts line
    pub fn trailer(&self) -> String {
        format!(
            "{} successful ({} with warnings), {} error, {} total",
            self.success_count(),
            self.warning_count,
            self.error_count,
            self.total_count
        )
    }

    /// Entry headlines, each with the trimmed stderr printed below it if any.
    fn entries(&self) -> Vec<(String, Option<&str>)> {
        let errors = self.error_tasks.iter().map(|result| {
            let error = truncate(&result.error, MAX_ERROR_CHARS);
            if result.has_stderr {
                (
                    format!("- {}: error: {}, stderr:", result.target.id, error),
                    Some(result.stderr.trim()),
                )
            } else {
                (format!("- {}: error: {}", result.target.id, error), None)
            }
        });

        let warnings = self.warning_tasks.iter().map(|result| {
            (
                format!("- {}: stderr: {}", result.target.id, result.stderr.trim()),
                None,
            )
        });

        errors.chain(warnings).collect()
    }

    /// Plain summary text for output files.
    pub fn to_text(&self) -> String {
        let mut text = String::from("SUMMARY:\n");
        for (headline, stderr) in self.entries() {
            text.push_str(&headline);
            text.push('\n');
            if let Some(stderr) = stderr {
                text.push_str(stderr);
                text.push('\n');
            }
        }
        text.push_str(&self.trailer());
        text.push('\n');
        text
    }

    /// Summary lines for the console.
    pub fn to_styled_text(&self) -> Vec<StyledText> {
        let mut lines = vec![StyledText::new("SUMMARY:", Style::Text)];
        for (headline, stderr) in self.entries() {
            lines.push(StyledText::new(headline, Style::Warning));
            if let Some(stderr) = stderr {
                lines.push(StyledText::new(stderr, Style::Warning));
            }
        }
        lines.push(StyledText::new(self.trailer(), Style::Text));
        lines
    }

    /// Turn the summary into the run's completion status.
    pub fn into_result(self) -> Result<Self> {
        if self.has_errors() {
            Err(Error::TargetsFailed {
                failed: self.error_count,
                total: self.total_count,
            })
        } else {
            Ok(self)
        }
    }
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
