//! ImageMarker Application
//!
//! Command-line shell that replays recorded annotation sessions against the
//! editor and reports what the host would have seen.

mod session;

pub use session::{AppError, AppResult, RecordingHost, Report, Session, Step, replay};
