//! Learner-side runtime of a delivered course.
//!
//! Inside the packaged document, slide changes flow through three stages in
//! a fixed order:
//!
//! 1. [`NavigationState`] records the visit and enforces sequential unlocking
//! 2. [`ProgressTracker`] derives completion metrics from it
//! 3. [`SessionAdapter`] mirrors those metrics to the LMS, best effort
//!
//! [`Course`] owns one of each and exposes the event handlers. Nothing here
//! is global; every session is an explicit value.

mod course;
mod navigation;
mod progress;
mod session;

pub use course::Course;
pub use navigation::{NavError, NavigationState};
pub use progress::{
    CompletionError, LessonStatus, ProgressSnapshot, ProgressTracker, cmi, completion_percent,
};
pub use session::{
    ApiLocator, Frame, FrameWalker, MAX_DISCOVERY_HOPS, SessionAdapter, SessionHandle,
    SessionStatus, TrackingApi,
};
