//! # Session Module - The Typing Test State Machine
//!
//! A [`Session`] owns everything a single typing test needs: the target text, the
//! typed buffer, the mistake counter, both clocks and the particle field. Keystrokes
//! are interpreted by [`interpret`](crate::keystroke::interpret) and applied here;
//! lifecycle changes are reported through the session's [`Hooks`].
//!
//! ## Session Lifecycle
//!
#![doc = simple_mermaid::mermaid!("../diagrams/session_lifecycle.mmd")]
//!
//! Completion and failure share one teardown: the session clock is cancelled the moment
//! the session leaves [`SessionState::InProgress`]. Live particles keep fading until a
//! reset clears them.
//!
//! ## Usage Example
//!
//! ```rust
//! use rote::hooks::{HookEvent, Recorder};
//! use rote::session::{Session, SessionState};
//! use web_time::{Duration, Instant};
//!
//! let mut session = Session::with_target("ab", Recorder::default()).unwrap();
//! assert_eq!(session.state(), SessionState::Ready);
//!
//! let start = Instant::now();
//! session.handle_key_at(&'a'.into(), start);
//! session.handle_key_at(&'b'.into(), start + Duration::from_secs(3));
//!
//! assert_eq!(session.state(), SessionState::Complete);
//! let outcome = session.outcome().unwrap();
//! assert_eq!(outcome.wpm, 4.0);
//! assert_eq!(outcome.accuracy, 100.0);
//! assert!(session.hooks().events().contains(&HookEvent::Completed(*outcome)));
//! ```

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use thiserror::Error;
use web_time::Instant;

use crate::config::Configuration;
use crate::diff::{DiffIter, LineContext, LineRenderConfig, diff, render_lines};
use crate::hooks::Hooks;
use crate::keystroke::{Action, Interpretation, KeyEvent, TypedBuffer, interpret};
use crate::metrics::{Outcome, accuracy, live_words_per_minute, round2};
use crate::options::{OptionSet, TypingOption};
use crate::particles::{ParticleField, Point};
use crate::timer::TimerSlot;

/// Shown to the user when a session fails
pub const FAILURE_MESSAGES: [&str; 8] = [
    "Are you even trying?",
    "My grandma types faster than you.",
    "I've seen glaciers move with more urgency.",
    "Maybe typing is not for you.",
    "That was... a performance.",
    "Were you typing with your elbows?",
    "I suggest a new hobby. Maybe knitting?",
    "A for effort... just kidding, it's an F.",
];

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    #[error("Cannot start a session with an empty target text")]
    EmptyTarget,
}

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SessionState {
    /// No target loaded
    Initial,
    /// Target loaded, nothing typed yet. Also the state after a reset.
    Ready,
    InProgress,
    Complete,
    Failed,
}

impl SessionState {
    /// Short status label for a header or status bar
    pub const fn label(self) -> &'static str {
        match self {
            Self::Initial | Self::Ready => "READY",
            Self::InProgress => "RUNNING",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
        }
    }

    /// True for `Complete` and `Failed`
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    const fn accepts_keys(self) -> bool {
        matches!(self, Self::Ready | Self::InProgress)
    }
}

/// A single typing test
#[derive(Debug)]
pub struct Session<H: Hooks = ()> {
    target: Vec<char>,
    typed: TypedBuffer,
    mistakes: u32,
    state: SessionState,

    started_at: Option<Instant>,
    elapsed_secs: u64,
    outcome: Option<Outcome>,
    failure_message: Option<&'static str>,

    options: OptionSet,
    clock: TimerSlot,
    particle_clock: TimerSlot,
    particles: ParticleField,
    cursor_anchor: Point,

    config: Configuration,
    rng: StdRng,
    hooks: H,
}

impl<H: Hooks> Session<H> {
    /// Creates a session in [`SessionState::Initial`], waiting for a target
    pub fn new(hooks: H) -> Self {
        let config = Configuration::default();

        Self {
            target: Vec::new(),
            typed: TypedBuffer::default(),
            mistakes: 0,
            state: SessionState::Initial,
            started_at: None,
            elapsed_secs: 0,
            outcome: None,
            failure_message: None,
            options: OptionSet::empty(),
            clock: TimerSlot::default(),
            particle_clock: TimerSlot::default(),
            particles: ParticleField::new(config.physics),
            cursor_anchor: Point::default(),
            config,
            rng: StdRng::from_entropy(),
            hooks,
        }
    }

    /// Creates a session and loads `text` as its target
    pub fn with_target(text: &str, hooks: H) -> Result<Self, LoadError> {
        let mut session = Self::new(hooks);
        session.load(text)?;
        Ok(session)
    }

    /// Replaces the configuration. Particle physics apply to bursts spawned from now on.
    pub fn with_configuration(mut self, config: Configuration) -> Self {
        self.particles = ParticleField::new(config.physics);
        self.config = config;
        self
    }

    pub const fn with_options(mut self, options: OptionSet) -> Self {
        self.options = options;
        self
    }

    /// Seeds the generator used for particle bursts and failure messages
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Loads a new target and resets the session to [`SessionState::Ready`].
    ///
    /// Anything in progress is torn down first, so nothing from the previous
    /// target can complete or fail afterwards.
    pub fn load(&mut self, text: &str) -> Result<(), LoadError> {
        if text.is_empty() {
            return Err(LoadError::EmptyTarget);
        }

        self.target = text.chars().collect();
        self.typed = TypedBuffer::with_capacity(self.target.len());
        self.reset();
        Ok(())
    }

    /// Resets to [`SessionState::Ready`] with the same target. Does nothing before a
    /// target is loaded.
    pub fn restart(&mut self) {
        if self.state != SessionState::Initial {
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.teardown();
        self.particle_clock.cancel();
        self.particles.clear();

        self.typed.clear();
        self.mistakes = 0;
        self.started_at = None;
        self.elapsed_secs = 0;
        self.outcome = None;
        self.failure_message = None;

        tracing::debug!(chars = self.target.len(), "session reset");
        self.transition(SessionState::Ready);
    }

    /// Stops the session clock. Particles are left to fade out on their own.
    fn teardown(&mut self) {
        self.clock.cancel();
    }

    fn transition(&mut self, state: SessionState) {
        self.state = state;
        self.hooks.on_state_change(state);
    }

    fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.elapsed_secs = 0;
        self.clock.arm(self.config.clock_interval, now);

        tracing::debug!("session started");
        self.hooks.on_test_start();
        self.transition(SessionState::InProgress);
    }

    fn complete(&mut self, now: Instant) {
        self.teardown();

        let started_at = self.started_at.unwrap_or(now);
        let outcome = Outcome::calculate(
            now.saturating_duration_since(started_at),
            self.target.len(),
            self.mistakes,
            self.options,
        );
        self.outcome = Some(outcome);

        tracing::debug!(
            wpm = outcome.wpm,
            accuracy = outcome.accuracy,
            mistakes = outcome.mistakes,
            "session complete"
        );
        self.hooks.on_complete(&outcome);
        self.transition(SessionState::Complete);
    }

    fn fail(&mut self, reason: &str) {
        self.teardown();

        let message = FAILURE_MESSAGES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(FAILURE_MESSAGES[0]);
        self.failure_message = Some(message);

        tracing::info!(reason, mistakes = self.mistakes, "session failed");
        self.hooks.on_failed(message);
        self.transition(SessionState::Failed);
    }

    /// Handles a key event at the current time. See [`Session::handle_key_at`].
    pub fn handle_key(&mut self, event: &KeyEvent) -> Interpretation {
        self.handle_key_at(event, Instant::now())
    }

    /// Handles a key event that happened at `now`.
    ///
    /// Returns the interpretation that was applied, so the host can honour
    /// `suppress_default`. Keys are ignored outside of `Ready` and `InProgress`.
    pub fn handle_key_at(&mut self, event: &KeyEvent, now: Instant) -> Interpretation {
        if !self.state.accepts_keys() {
            return Interpretation::ignored(false);
        }

        let decision = interpret(
            event,
            &self.typed,
            &self.target,
            self.options,
            self.started_at.is_some(),
        );

        if decision.starts_session {
            self.start(now);
        }

        if decision.is_mistake() {
            self.mistakes = self.mistakes.saturating_add(1);
        }

        if let Action::Fail { .. } = decision.action {
            self.fail("instant-death mismatch");
            return decision;
        }

        if decision.burst {
            self.particles
                .burst(self.cursor_anchor, self.config.burst_size, &mut self.rng);
            self.particle_clock
                .ensure_armed(self.config.particle_interval, now);
        }

        if self.typed.apply(decision.action)
            && self.started_at.is_some()
            && self.typed.reaches(self.target.len())
        {
            self.complete(now);
        }

        decision
    }

    /// Advances both clocks to the current time. See [`Session::poll_at`].
    pub fn poll(&mut self) {
        self.poll_at(Instant::now());
    }

    /// Advances both clocks to `now`.
    ///
    /// The session clock updates the elapsed seconds and fails the session once the
    /// maximum test time is reached. The particle clock steps the simulation once per
    /// elapsed period and disarms itself when the field is empty.
    pub fn poll_at(&mut self, now: Instant) {
        if self.clock.poll(now) > 0
            && self.state == SessionState::InProgress
            && let Some(started_at) = self.started_at
        {
            let elapsed = now.saturating_duration_since(started_at);
            self.elapsed_secs = elapsed.as_secs();

            if elapsed >= self.config.max_test_time {
                self.fail("maximum test time reached");
            }
        }

        let ticks = self.particle_clock.poll(now);
        if ticks > 0 {
            self.particles.advance(ticks);
            if self.particles.is_empty() {
                self.particle_clock.cancel();
            }
        }
    }

    /// Sets where new particle bursts originate, usually the rendered cursor position
    pub const fn set_cursor_anchor(&mut self, anchor: Point) {
        self.cursor_anchor = anchor;
    }

    pub const fn cursor_anchor(&self) -> Point {
        self.cursor_anchor
    }

    pub const fn options(&self) -> OptionSet {
        self.options
    }

    /// Replaces the enabled options. Takes effect from the next keystroke.
    pub const fn set_options(&mut self, options: OptionSet) {
        self.options = options;
    }

    /// Toggles an option and returns whether it is now enabled
    pub const fn toggle_option(&mut self, option: TypingOption) -> bool {
        self.options.toggle(option)
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub fn target(&self) -> &[char] {
        &self.target
    }

    pub const fn typed(&self) -> &TypedBuffer {
        &self.typed
    }

    pub const fn mistakes(&self) -> u32 {
        self.mistakes
    }

    pub const fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Whole seconds since the session started, as of the last clock tick
    pub const fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Live words per minute based on the last clock tick
    pub fn live_wpm(&self) -> u32 {
        live_words_per_minute(self.typed.len(), self.elapsed_secs)
    }

    /// Live accuracy over the characters typed so far, rounded to two decimals
    pub fn live_accuracy(&self) -> f64 {
        round2(accuracy(self.typed.len(), self.mistakes))
    }

    /// Typed characters as a percentage of the target, capped at 100
    pub fn progress(&self) -> f64 {
        if self.target.is_empty() {
            return 0.0;
        }

        (self.typed.len() as f64 / self.target.len() as f64 * 100.0).min(100.0)
    }

    /// The outcome of a completed session
    pub const fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// The message picked when the session failed
    pub const fn failure_message(&self) -> Option<&'static str> {
        self.failure_message
    }

    pub const fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub const fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub const fn hooks(&self) -> &H {
        &self.hooks
    }

    pub const fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Per-character view of the target against the typed buffer
    pub fn diff(&self) -> DiffIter<'_> {
        diff(&self.target, self.typed.as_slice())
    }

    /// Lays the target out as lines. See [`render_lines`].
    pub fn render_lines<Line, F: FnMut(LineContext) -> Option<Line>>(
        &self,
        line_renderer: F,
        config: LineRenderConfig,
    ) -> Vec<Line> {
        render_lines(&self.target, self.typed.as_slice(), line_renderer, config)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(())
    }
}
