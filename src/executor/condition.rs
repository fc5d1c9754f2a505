//! Output conditions deciding whether successful stdout is worth printing.
//!
//! A list of [`OutputCondition`]s is a conjunction: stdout must satisfy every
//! condition. Only substring presence is tested; output is never interpreted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// How a condition value is tested against stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionOperator {
    /// Stdout must contain the value
    Contains,
    /// Stdout must not contain the value
    NotContains,
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains => write!(f, "contains"),
            Self::NotContains => write!(f, "not-contains"),
        }
    }
}

/// A single contains / not-contains rule over stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputCondition {
    /// Test to apply
    pub operator: ConditionOperator,
    /// Substring to look for
    pub value: String,
}

impl OutputCondition {
    /// Stdout must contain `value`
    pub fn contains(value: impl Into<String>) -> Self {
        Self {
            operator: ConditionOperator::Contains,
            value: value.into(),
        }
    }

    /// Stdout must not contain `value`
    pub fn not_contains(value: impl Into<String>) -> Self {
        Self {
            operator: ConditionOperator::NotContains,
            value: value.into(),
        }
    }

    /// Check this condition against stdout
    pub fn is_satisfied_by(&self, stdout: &str) -> bool {
        let present = stdout.contains(self.value.as_str());
        match self.operator {
            ConditionOperator::Contains => present,
            ConditionOperator::NotContains => !present,
        }
    }
}

impl fmt::Display for OutputCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.operator, self.value)
    }
}

impl FromStr for OutputCondition {
    type Err = Error;

    /// Parse `contains=<value>` or `not-contains=<value>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (operator, value) = s
            .split_once('=')
            .ok_or_else(|| Error::InvalidCondition(s.to_string()))?;

        if value.is_empty() {
            return Err(Error::InvalidCondition(s.to_string()));
        }

        match operator.trim() {
            "contains" => Ok(Self::contains(value)),
            "not-contains" | "not_contains" | "!contains" => Ok(Self::not_contains(value)),
            _ => Err(Error::InvalidCondition(s.to_string())),
        }
    }
}

/// Evaluate a conjunction of conditions against stdout.
///
/// Stops at the first failing condition. An empty list always matches.
pub fn matches(stdout: &str, conditions: &[OutputCondition]) -> bool {
    conditions.iter().all(|condition| condition.is_satisfied_by(stdout))
}
