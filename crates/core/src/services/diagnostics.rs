//! Runs tasks and turns their failures into reports

use crate::connection::Session;
use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Report returned when the task ran cleanly
pub const NO_ERRORS: &str = "no-errors";

/// Body of the "What went wrong" section of a Gradle failure report
#[allow(clippy::expect_used)]
static WHAT_WENT_WRONG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\* What went wrong:[ \t]*\r?\n(.*?)(?:\r?\n[ \t]*\r?\n|\r?\n\* Try:|$)")
        .expect("constant regex pattern is valid")
});

/// Result of running one task. A failing task is an answer, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    FailureWithText(String),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }

    /// Failure text, or [`NO_ERRORS`] on success
    pub fn into_report(self) -> String {
        match self {
            TaskOutcome::Success => NO_ERRORS.to_string(),
            TaskOutcome::FailureWithText(text) => text,
        }
    }

    /// One-line summary of the failure, when the text is a Gradle failure report
    pub fn headline(&self) -> Option<String> {
        let TaskOutcome::FailureWithText(text) = self else {
            return None;
        };
        let body = WHAT_WENT_WRONG.captures(text)?.get(1)?.as_str();
        let line = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!line.is_empty()).then_some(line)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildDiagnosticsRunner;

impl BuildDiagnosticsRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run `task` with the daemon's error channel captured in memory.
    ///
    /// Any failure of the invocation itself becomes `FailureWithText`. When
    /// the daemon wrote nothing, the failure's own message is the text. A
    /// session that cannot reach the daemon is still an error.
    pub fn run_task(&self, session: &mut Session, task: &str) -> Result<TaskOutcome> {
        let mut captured = Vec::new();
        let result = session.run_tasks(&[task.to_string()], &mut captured);

        match result {
            Ok(()) => {
                debug!("Task {} succeeded in {}", task, session.root().display());
                Ok(TaskOutcome::Success)
            }
            Err(e @ Error::ConnectionError { .. }) => Err(e),
            Err(e) => {
                info!("Task {} failed in {}: {}", task, session.root().display(), e);
                let text = String::from_utf8_lossy(&captured).into_owned();
                if text.trim().is_empty() {
                    Ok(TaskOutcome::FailureWithText(e.to_string()))
                } else {
                    Ok(TaskOutcome::FailureWithText(text))
                }
            }
        }
    }

    /// Captured failure text, or [`NO_ERRORS`]
    pub fn run_and_capture_failure(&self, session: &mut Session, task: &str) -> Result<String> {
        Ok(self.run_task(session, task)?.into_report())
    }
}
