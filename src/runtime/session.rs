//! Connection to the LMS tracking API.
//!
//! The LMS exposes a SCORM 1.2 API object somewhere up the frame hierarchy
//! of the delivered document. [`FrameWalker`] finds it, and
//! [`SessionAdapter`] wraps it so the rest of the runtime never has to care
//! whether it exists. When the API is missing or refuses to initialize, the
//! adapter turns every call into a no-op and the course runs without
//! persistence.
//!
//! Local state is authoritative: failed writes are logged, never rolled back
//! and never retried.

/// Maximum number of parent frames searched for the tracking API.
pub const MAX_DISCOVERY_HOPS: usize = 7;

/// The host tracking API (SCORM 1.2 `LMS*` calls).
///
/// Methods returning `bool` report whether the host accepted the call.
pub trait TrackingApi {
    fn initialize(&mut self, param: &str) -> bool;
    fn finish(&mut self, param: &str) -> bool;
    fn get_value(&mut self, name: &str) -> String;
    fn set_value(&mut self, name: &str, value: &str) -> bool;
    fn commit(&mut self, param: &str) -> bool;
}

/// A frame of the document hierarchy that may carry the tracking API.
pub trait Frame {
    /// The API object attached to this frame, if any.
    fn api(&self) -> Option<Box<dyn TrackingApi>>;

    /// The enclosing frame. `None` at the top of the hierarchy, including
    /// frames that are their own parent.
    fn parent(&self) -> Option<Box<dyn Frame>>;
}

/// Capability port for discovering the tracking API.
pub trait ApiLocator {
    fn locate(&self) -> Option<Box<dyn TrackingApi>>;
}

impl<F> ApiLocator for F
where
    F: Fn() -> Option<Box<dyn TrackingApi>>,
{
    fn locate(&self) -> Option<Box<dyn TrackingApi>> {
        self()
    }
}

/// Locates the API by walking up from a starting frame.
///
/// The starting frame is checked first, then at most
/// [`MAX_DISCOVERY_HOPS`] ancestors.
pub struct FrameWalker {
    start: Box<dyn Frame>,
}

impl FrameWalker {
    pub fn new(start: Box<dyn Frame>) -> Self {
        Self { start }
    }
}

impl ApiLocator for FrameWalker {
    fn locate(&self) -> Option<Box<dyn TrackingApi>> {
        if let Some(api) = self.start.api() {
            return Some(api);
        }

        let mut next = self.start.parent();
        for hop in 1..=MAX_DISCOVERY_HOPS {
            let frame = next?;
            if let Some(api) = frame.api() {
                tracing::debug!(hop, "found tracking API");
                return Some(api);
            }
            next = frame.parent();
        }

        if next.is_some() {
            tracing::warn!(
                hops = MAX_DISCOVERY_HOPS,
                "gave up looking for tracking API"
            );
        }
        None
    }
}

/// A discovered tracking API and whether it accepted initialization.
pub struct SessionHandle {
    api: Box<dyn TrackingApi>,
    initialized: bool,
}

impl SessionHandle {
    fn new(api: Box<dyn TrackingApi>) -> Self {
        Self {
            api,
            initialized: false,
        }
    }

    fn initialize(&mut self) -> bool {
        self.initialized = self.api.initialize("");
        self.initialized
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Connection status of a [`SessionAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// API present and initialized.
    Active,
    /// No API, or it failed to initialize. Calls are no-ops.
    Unavailable,
    /// `finish` succeeded. Calls are no-ops.
    Finished,
}

/// Wrapper around the tracking API that isolates callers from its absence.
pub struct SessionAdapter {
    handle: Option<SessionHandle>,
    finished: bool,
}

impl SessionAdapter {
    /// Discover the API and initialize it.
    pub fn connect(locator: &dyn ApiLocator) -> Self {
        let Some(api) = locator.locate() else {
            tracing::warn!("tracking API not found; progress will not be saved");
            return Self::unavailable();
        };

        let mut handle = SessionHandle::new(api);
        if !handle.initialize() {
            tracing::warn!("tracking API refused to initialize; progress will not be saved");
        }

        Self {
            handle: Some(handle),
            finished: false,
        }
    }

    /// An adapter with no tracking API behind it.
    pub fn unavailable() -> Self {
        Self {
            handle: None,
            finished: false,
        }
    }

    pub fn status(&self) -> SessionStatus {
        if self.finished {
            SessionStatus::Finished
        } else if self.handle.as_ref().is_some_and(SessionHandle::is_initialized) {
            SessionStatus::Active
        } else {
            SessionStatus::Unavailable
        }
    }

    pub fn is_available(&self) -> bool {
        self.status() == SessionStatus::Active
    }

    fn active(&mut self) -> Option<&mut SessionHandle> {
        if self.finished {
            return None;
        }
        self.handle.as_mut().filter(|h| h.initialized)
    }

    /// Read a value. Empty when unavailable.
    pub fn get_value(&mut self, name: &str) -> String {
        match self.active() {
            Some(handle) => handle.api.get_value(name),
            None => String::new(),
        }
    }

    /// Write a value. Returns whether the host accepted it; `false` when
    /// unavailable.
    pub fn set_value(&mut self, name: &str, value: &str) -> bool {
        let Some(handle) = self.active() else {
            return false;
        };
        let accepted = handle.api.set_value(name, value);
        if !accepted {
            tracing::warn!(name, value, "tracking API rejected value");
        }
        accepted
    }

    /// Ask the host to persist written values.
    pub fn commit(&mut self) -> bool {
        let Some(handle) = self.active() else {
            return false;
        };
        let accepted = handle.api.commit("");
        if !accepted {
            tracing::warn!("tracking API commit failed");
        }
        accepted
    }

    /// End the session.
    ///
    /// Succeeds trivially when no API is available. After a successful
    /// finish the adapter ignores all further calls.
    pub fn finish(&mut self) -> bool {
        if self.finished {
            tracing::debug!("session already finished");
            return true;
        }
        let Some(handle) = self.active() else {
            return true;
        };
        if handle.api.finish("") {
            self.finished = true;
            true
        } else {
            tracing::warn!("tracking API finish failed");
            false
        }
    }
}

impl std::fmt::Debug for SessionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAdapter")
            .field("status", &self.status())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Call, FakeLms, no_api};
    use super::*;

    struct TestFrame {
        api: Option<FakeLms>,
        parent: Option<Box<dyn Fn() -> Box<dyn Frame>>>,
    }

    impl Frame for TestFrame {
        fn api(&self) -> Option<Box<dyn TrackingApi>> {
            self.api
                .clone()
                .map(|lms| Box::new(lms) as Box<dyn TrackingApi>)
        }

        fn parent(&self) -> Option<Box<dyn Frame>> {
            self.parent.as_ref().map(|make| make())
        }
    }

    /// A chain of `depth` frames without the API, topped by one that has it.
    fn chain(depth: usize, lms: FakeLms) -> Box<dyn Frame> {
        if depth == 0 {
            return Box::new(TestFrame {
                api: Some(lms),
                parent: None,
            });
        }
        Box::new(TestFrame {
            api: None,
            parent: Some(Box::new(move || chain(depth - 1, lms.clone()))),
        })
    }

    #[test]
    fn test_api_on_own_frame() {
        let walker = FrameWalker::new(chain(0, FakeLms::new()));
        assert!(walker.locate().is_some());
    }

    #[test]
    fn test_api_within_hop_bound() {
        let walker = FrameWalker::new(chain(MAX_DISCOVERY_HOPS, FakeLms::new()));
        assert!(walker.locate().is_some());
    }

    #[test]
    fn test_api_beyond_hop_bound() {
        let walker = FrameWalker::new(chain(MAX_DISCOVERY_HOPS + 1, FakeLms::new()));
        assert!(walker.locate().is_none());
    }

    #[test]
    fn test_top_frame_without_api() {
        let walker = FrameWalker::new(Box::new(TestFrame {
            api: None,
            parent: None,
        }));
        assert!(walker.locate().is_none());
    }

    #[test]
    fn test_connect_initializes() {
        let lms = FakeLms::new();
        let session = SessionAdapter::connect(&lms.locator());
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(lms.calls(), vec![Call::Initialize]);
    }

    #[test]
    fn test_missing_api_is_unavailable() {
        let mut session = SessionAdapter::connect(&no_api);
        assert_eq!(session.status(), SessionStatus::Unavailable);
        assert_eq!(session.get_value("cmi.suspend_data"), "");
        assert!(!session.set_value("cmi.core.lesson_location", "1"));
        assert!(!session.commit());
        assert!(session.finish());
    }

    #[test]
    fn test_failed_initialize_is_unavailable() {
        let lms = FakeLms::new();
        lms.0.borrow_mut().fail_initialize = true;
        let mut session = SessionAdapter::connect(&lms.locator());
        assert_eq!(session.status(), SessionStatus::Unavailable);
        assert!(
            session
                .handle
                .as_ref()
                .is_some_and(|h| !h.is_initialized())
        );

        assert_eq!(session.get_value("cmi.suspend_data"), "");
        session.set_value("cmi.core.lesson_location", "1");
        session.commit();
        assert!(session.finish());
        assert_eq!(lms.calls(), vec![Call::Initialize]);
    }

    #[test]
    fn test_handle_tracks_initialization() {
        let session = SessionAdapter::connect(&FakeLms::new().locator());
        assert!(session.handle.as_ref().is_some_and(SessionHandle::is_initialized));

        let session = SessionAdapter::connect(&no_api);
        assert!(session.handle.is_none());
    }

    #[test]
    fn test_failed_set_is_reported_not_retried() {
        let lms = FakeLms::new();
        lms.0.borrow_mut().fail_set = vec!["cmi.core.score.raw".to_string()];
        let mut session = SessionAdapter::connect(&lms.locator());

        assert!(!session.set_value("cmi.core.score.raw", "50.00"));
        assert!(session.set_value("cmi.core.lesson_location", "1"));
        let sets = lms
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Set(..)))
            .count();
        assert_eq!(sets, 2);
    }

    #[test]
    fn test_no_calls_after_finish() {
        let lms = FakeLms::new();
        let mut session = SessionAdapter::connect(&lms.locator());
        assert!(session.finish());
        assert_eq!(session.status(), SessionStatus::Finished);

        assert!(!session.set_value("cmi.core.lesson_status", "incomplete"));
        assert!(!session.commit());
        assert_eq!(session.get_value("cmi.core.lesson_status"), "");
        assert!(session.finish());
        assert_eq!(lms.calls(), vec![Call::Initialize, Call::Finish]);
    }

    #[test]
    fn test_failed_finish_keeps_session_open() {
        let lms = FakeLms::new();
        lms.0.borrow_mut().fail_finish = true;
        let mut session = SessionAdapter::connect(&lms.locator());
        assert!(!session.finish());
        assert_eq!(session.status(), SessionStatus::Active);
    }
}
