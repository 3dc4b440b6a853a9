//! Completion metrics and their persistence.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::navigation::NavigationState;
use super::session::SessionAdapter;
use crate::util::round2;

/// SCORM 1.2 data model elements written by the tracker.
pub mod cmi {
    pub const LESSON_LOCATION: &str = "cmi.core.lesson_location";
    pub const LESSON_STATUS: &str = "cmi.core.lesson_status";
    pub const SCORE_RAW: &str = "cmi.core.score.raw";
    pub const SUSPEND_DATA: &str = "cmi.suspend_data";
}

/// Lesson status reported to the LMS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonStatus {
    #[default]
    Incomplete,
    Completed,
}

impl LessonStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LessonStatus::Incomplete => "incomplete",
            LessonStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the course could not be marked complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("course already completed")]
    AlreadyCompleted,

    #[error("tracking API is not initialized")]
    Unavailable,
}

/// Externalized progress, as sent to the LMS.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub visited_list: Vec<usize>,
    pub completion_percent: f64,
    pub lesson_location: String,
    pub lesson_status: LessonStatus,
}

impl ProgressSnapshot {
    /// Serialized visited list for `cmi.suspend_data`.
    pub fn suspend_data(&self) -> String {
        serde_json::Value::from(self.visited_list.clone()).to_string()
    }

    /// Completion percentage for `cmi.core.score.raw`.
    pub fn score_raw(&self) -> String {
        format!("{:.2}", self.completion_percent)
    }
}

/// Percentage of slides visited, rounded to two decimals and kept in `[0, 100]`.
pub fn completion_percent(visited: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2((100.0 * visited as f64 / total as f64).clamp(0.0, 100.0))
}

/// Derives progress from navigation and commits it through the session.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    status: LessonStatus,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> LessonStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == LessonStatus::Completed
    }

    pub fn snapshot(&self, nav: &NavigationState) -> ProgressSnapshot {
        ProgressSnapshot {
            visited_list: nav.visited_list(),
            completion_percent: completion_percent(nav.visited().len(), nav.total()),
            lesson_location: nav.current().to_string(),
            lesson_status: self.status,
        }
    }

    /// Record a navigation update.
    ///
    /// Each field is written separately and a rejected write does not stop
    /// the rest. Once the course is completed nothing more is written and
    /// `None` is returned.
    pub fn record(
        &mut self,
        nav: &NavigationState,
        session: &mut SessionAdapter,
    ) -> Option<ProgressSnapshot> {
        if self.is_completed() {
            tracing::debug!("course completed; ignoring navigation update");
            return None;
        }

        let snapshot = self.snapshot(nav);
        if session.is_available() {
            session.set_value(cmi::LESSON_LOCATION, &snapshot.lesson_location);
            session.set_value(cmi::LESSON_STATUS, snapshot.lesson_status.as_str());
            session.set_value(cmi::SUSPEND_DATA, &snapshot.suspend_data());
            session.set_value(cmi::SCORE_RAW, &snapshot.score_raw());
            session.commit();
        }
        Some(snapshot)
    }

    /// Declare the course complete and end the session.
    ///
    /// This happens at most once. Without a tracking API the command is
    /// refused and local state is left alone.
    pub fn complete(&mut self, session: &mut SessionAdapter) -> Result<(), CompletionError> {
        if self.is_completed() {
            return Err(CompletionError::AlreadyCompleted);
        }
        if !session.is_available() {
            return Err(CompletionError::Unavailable);
        }

        self.status = LessonStatus::Completed;
        session.set_value(cmi::LESSON_STATUS, self.status.as_str());
        session.commit();
        if !session.finish() {
            tracing::error!("could not finish tracking session after completion");
        }
        tracing::info!("course completed");
        Ok(())
    }
}
