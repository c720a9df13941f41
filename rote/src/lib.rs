//! # rote
//!
//! The engine behind a typing test for code templates. It interprets key events
//! against a target text, tracks mistakes and time, decides when a session completes
//! or fails, and computes the final speed and accuracy. Rendering, persistence and
//! input capture are left to the host.
//!
//! ```rust
//! use rote::{OptionSet, Session, SessionState, TypingOption};
//!
//! let options = OptionSet::empty().with(TypingOption::InstantDeath);
//! let mut session = Session::with_target("fn main() {}", ()).unwrap().with_options(options);
//!
//! session.handle_key(&'f'.into());
//! session.handle_key(&'x'.into());
//! assert_eq!(session.state(), SessionState::Failed);
//! ```

pub mod config;
pub mod diff;
pub mod hooks;
pub mod keystroke;
pub mod metrics;
pub mod options;
pub mod particles;
pub mod session;
pub mod timer;

pub use config::Configuration;
pub use hooks::{HookEvent, Hooks, Recorder};
pub use keystroke::{Key, KeyEvent, Modifiers};
pub use metrics::Outcome;
pub use options::{FollowUp, OptionError, OptionSet, TypingOption};
pub use session::{LoadError, Session, SessionState};

/// Characters counted as one word in speed calculations
pub const AVERAGE_WORD_LENGTH: usize = 10;

// Types for more general type-safety
type Seconds = f64;
type Minutes = f64;

// Get the minutes elapsed from seconds
pub(crate) fn minutes(seconds: Seconds) -> Minutes {
    seconds / 60.0
}
