//! # Hooks Module - Lifecycle Callbacks
//!
//! The host learns about session progress through a [`Hooks`] implementation owned by
//! the [`Session`](crate::session::Session). Every method has an empty default, so a
//! host only implements what it needs. `()` ignores everything.
//!
//! Hooks run synchronously inside the session call that triggered them. Anything
//! slow, like persisting an [`Outcome`], should be handed off rather than awaited.

use crate::metrics::Outcome;
use crate::session::SessionState;

pub trait Hooks {
    /// The first content keystroke of a session was accepted
    fn on_test_start(&mut self) {}

    /// The session completed. Called exactly once per session.
    fn on_complete(&mut self, _outcome: &Outcome) {}

    /// The session failed, with a message for the user. Called exactly once per session.
    fn on_failed(&mut self, _message: &str) {}

    /// The session moved to a new state
    fn on_state_change(&mut self, _state: SessionState) {}
}

impl Hooks for () {}

/// Everything a [`Recorder`] has seen
#[derive(Debug, Clone, PartialEq)]
pub enum HookEvent {
    TestStarted,
    Completed(Outcome),
    Failed(String),
    StateChanged(SessionState),
}

/// Hooks that queue every callback for the host to drain later.
///
/// Useful for event loops that poll: the page owning the session drains the queue
/// once per frame instead of being called back mid-update.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    events: Vec<HookEvent>,
}

impl Recorder {
    pub fn events(&self) -> &[HookEvent] {
        &self.events
    }

    /// Takes all queued events, oldest first
    pub fn drain(&mut self) -> Vec<HookEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Hooks for Recorder {
    fn on_test_start(&mut self) {
        self.events.push(HookEvent::TestStarted);
    }

    fn on_complete(&mut self, outcome: &Outcome) {
        self.events.push(HookEvent::Completed(*outcome));
    }

    fn on_failed(&mut self, message: &str) {
        self.events.push(HookEvent::Failed(message.to_string()));
    }

    fn on_state_change(&mut self, state: SessionState) {
        self.events.push(HookEvent::StateChanged(state));
    }
}
