//! Event handlers tying navigation, progress and the session together.

use super::navigation::{NavError, NavigationState};
use super::progress::{CompletionError, LessonStatus, ProgressSnapshot, ProgressTracker, cmi};
use super::session::{ApiLocator, SessionAdapter};

/// Keys that advance to the next slide and are therefore lock-checked.
const ADVANCE_KEYS: &[&str] = &["ArrowRight", "PageDown"];

/// Runtime state of one learner session in a delivered course.
///
/// Every handler runs navigation first, then progress, then the session, so
/// state changes reach the LMS in the order they happened.
#[derive(Debug)]
pub struct Course {
    nav: NavigationState,
    tracker: ProgressTracker,
    session: SessionAdapter,
    resume_index: usize,
}

impl Course {
    /// Start a session for a deck of `total` slides.
    ///
    /// Connects to the tracking API through `locator`, restores the visit
    /// history and last location from it, and shows the starting slide. A
    /// saved location is only honored if that slide is unlocked.
    pub fn start(total: usize, locator: &dyn ApiLocator) -> Self {
        let mut session = SessionAdapter::connect(locator);

        let (nav, saved_location) = if session.is_available() {
            let nav = NavigationState::restore(total, &session.get_value(cmi::SUSPEND_DATA));
            let location = session.get_value(cmi::LESSON_LOCATION);
            session.set_value(cmi::LESSON_STATUS, LessonStatus::Incomplete.as_str());
            session.commit();
            (nav, location.trim().parse::<usize>().ok())
        } else {
            (NavigationState::new(total), None)
        };

        let resume_index = saved_location
            .filter(|&i| i < total && nav.is_unlocked(i))
            .unwrap_or(0);
        if let Some(saved) = saved_location.filter(|&i| i != resume_index) {
            tracing::info!(saved, "saved location is not reachable; starting at first slide");
        }

        let mut course = Self {
            nav,
            tracker: ProgressTracker::new(),
            session,
            resume_index,
        };
        if total > 0
            && let Err(e) = course.on_slide_shown(None, resume_index)
        {
            tracing::warn!(error = %e, "could not show starting slide");
        }
        course
    }

    /// Slide the learner was returned to when the session started.
    pub fn resume_index(&self) -> usize {
        self.resume_index
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.nav
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn session(&self) -> &SessionAdapter {
        &self.session
    }

    /// Handle a "slide shown" event.
    ///
    /// Returns the snapshot that was recorded, or `None` when the course is
    /// already complete and nothing is recorded any more.
    pub fn on_slide_shown(
        &mut self,
        previous: Option<usize>,
        current: usize,
    ) -> Result<Option<ProgressSnapshot>, NavError> {
        self.nav.show(previous, current)?;
        Ok(self.tracker.record(&self.nav, &mut self.session))
    }

    /// Whether a key press may proceed. Advancing keys are refused while the
    /// next slide is locked.
    pub fn allows_key(&self, key: &str) -> bool {
        !ADVANCE_KEYS.contains(&key) || self.nav.can_advance()
    }

    /// Handle the "complete course" command.
    pub fn complete(&mut self) -> Result<(), CompletionError> {
        self.tracker.complete(&mut self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::session::SessionStatus;
    use crate::runtime::session::testing::{Call, FakeLms, no_api};

    #[test]
    fn test_start_fresh_marks_first_slide() {
        let lms = FakeLms::new();
        let course = Course::start(2, &lms.locator());

        assert_eq!(course.resume_index(), 0);
        assert_eq!(course.navigation().unlocked(), vec![0, 1]);
        assert_eq!(lms.value(cmi::SCORE_RAW).as_deref(), Some("50.00"));
        assert_eq!(lms.value(cmi::LESSON_STATUS).as_deref(), Some("incomplete"));
    }

    #[test]
    fn test_start_resumes_saved_progress() {
        let lms = FakeLms::new()
            .with_value(cmi::SUSPEND_DATA, "[0,1,2]")
            .with_value(cmi::LESSON_LOCATION, "3");
        let course = Course::start(5, &lms.locator());

        assert_eq!(course.resume_index(), 3);
        assert_eq!(course.navigation().current(), 3);
        assert_eq!(course.navigation().visited_list(), vec![0, 1, 2, 3]);
        assert_eq!(lms.value(cmi::SCORE_RAW).as_deref(), Some("80.00"));
    }

    #[test]
    fn test_start_ignores_locked_location() {
        let lms = FakeLms::new()
            .with_value(cmi::SUSPEND_DATA, "garbage")
            .with_value(cmi::LESSON_LOCATION, "3");
        let course = Course::start(5, &lms.locator());

        assert_eq!(course.resume_index(), 0);
        assert_eq!(course.navigation().visited_list(), vec![0]);
    }

    #[test]
    fn test_start_reads_before_writing() {
        let lms = FakeLms::new();
        Course::start(1, &lms.locator());
        let calls = lms.calls();
        assert_eq!(calls[0], Call::Initialize);
        assert_eq!(calls[1], Call::Get(cmi::SUSPEND_DATA.into()));
        assert_eq!(calls[2], Call::Get(cmi::LESSON_LOCATION.into()));
        assert_eq!(
            calls[3],
            Call::Set(cmi::LESSON_STATUS.into(), "incomplete".into())
        );
        assert_eq!(calls[4], Call::Commit);
    }

    #[test]
    fn test_degraded_mode() {
        let mut course = Course::start(3, &no_api);
        assert_eq!(course.session().status(), SessionStatus::Unavailable);

        course.on_slide_shown(Some(0), 1).unwrap();
        assert_eq!(course.navigation().visited_list(), vec![0, 1]);
        assert_eq!(course.complete(), Err(CompletionError::Unavailable));
    }

    #[test]
    fn test_locked_slide_rejected_without_commit() {
        let lms = FakeLms::new();
        let mut course = Course::start(4, &lms.locator());
        let calls = lms.calls().len();

        assert_eq!(
            course.on_slide_shown(Some(0), 2),
            Err(NavError::Locked { target: 2 })
        );
        assert_eq!(lms.calls().len(), calls);
    }

    #[test]
    fn test_advance_keys() {
        let mut course = Course::start(2, &no_api);
        assert!(course.allows_key("ArrowRight"));
        course.on_slide_shown(Some(0), 1).unwrap();
        assert!(!course.allows_key("PageDown"));
        assert!(!course.allows_key("ArrowRight"));
        assert!(course.allows_key("ArrowLeft"));
        assert!(course.allows_key("a"));
    }

    #[test]
    fn test_navigation_after_completion_is_not_committed() {
        let lms = FakeLms::new();
        let mut course = Course::start(3, &lms.locator());
        course.complete().unwrap();
        let calls = lms.calls().len();

        let recorded = course.on_slide_shown(Some(0), 1).unwrap();
        assert!(recorded.is_none());
        assert_eq!(course.navigation().current(), 1);
        assert_eq!(lms.calls().len(), calls);
        assert_eq!(course.session().status(), SessionStatus::Finished);
    }
}
