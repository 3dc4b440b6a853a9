//! # slidepack
//!
//! Package markdown slide decks as SCORM 1.2 courses that an LMS can import,
//! track and resume.
//!
//! ## Features
//!
//! - Split a deck on `---` lines and derive a sidebar from slide headings
//! - Sequential slide unlocking that survives session interruption
//! - Best-effort progress tracking through the LMS's SCORM 1.2 API
//! - Deterministic packaging into an importable ZIP archive
//!
//! ## Quick Start
//!
//! ```no_run
//! use slidepack::export::ScormExporter;
//!
//! let markdown = std::fs::read_to_string("deck.md")?;
//! let archive = ScormExporter::new().export_to_vec(&markdown)?;
//! std::fs::write("scorm_package.zip", archive)?;
//! # Ok::<(), slidepack::Error>(())
//! ```
//!
//! ## Runtime
//!
//! The [`runtime`] module holds the learner-side state machine. It is
//! independent of the browser: the host tracking API and the frame hierarchy
//! it is found in are traits, so sessions can be driven from tests.
//!
//! ```
//! use slidepack::runtime::{Course, TrackingApi};
//!
//! fn no_lms() -> Option<Box<dyn TrackingApi>> {
//!     None
//! }
//!
//! let mut course = Course::start(2, &no_lms);
//! assert_eq!(course.navigation().unlocked(), vec![0, 1]);
//! course.on_slide_shown(Some(0), 1).unwrap();
//! ```

pub mod deck;
mod error;
#[cfg(not(target_arch = "wasm32"))]
pub mod export;
#[cfg(feature = "cli")]
pub mod logging;
pub mod runtime;
#[cfg(feature = "server")]
pub mod server;
pub(crate) mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use deck::{SlideRecord, TocEntry, build_toc, segment};
pub use error::{Error, Result};
pub use runtime::{Course, NavigationState, ProgressSnapshot};
