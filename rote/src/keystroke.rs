//! # Keystroke Module - Turning Key Events into Buffer Edits
//!
//! The interpreter is a pure function: given the typed buffer, the target text, the
//! enabled options and one key event, [`interpret`] decides what should happen. The
//! [`Session`](crate::session::Session) applies the decision, so the rules can be
//! tested without any clock or state machine around them.
//!
//! ## Interpretation Flow
//!
#![doc = simple_mermaid::mermaid!("../diagrams/keystroke_flow.mmd")]
//!
//! ## Usage Example
//!
//! ```rust
//! use rote::keystroke::{interpret, Action, Insertion, KeyEvent, TypedBuffer};
//! use rote::options::OptionSet;
//!
//! let target: Vec<char> = "let".chars().collect();
//! let mut buffer = TypedBuffer::default();
//!
//! let decision = interpret(&KeyEvent::from('l'), &buffer, &target, OptionSet::empty(), false);
//! assert!(decision.starts_session);
//! assert_eq!(decision.action, Action::Insert(Insertion::Typed { char: 'l', correct: true }));
//!
//! buffer.apply(decision.action);
//! assert_eq!(buffer.len(), 1);
//! ```

use crate::options::{OptionSet, TypingOption};

/// A key, reduced to what the interpreter cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Tab,
    Backspace,
    Enter,
    /// Function keys, arrows, modifier-only presses and anything else with a
    /// multi-character name
    Other,
}

/// Modifier keys held during a key event
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const fn any(self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// A raw key event as delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// A key event without modifiers
    pub const fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// Returns the character if this event types a single printable character
    /// with no Ctrl/Alt/Meta held
    pub fn printable(&self) -> Option<char> {
        match self.key {
            Key::Char(char) if !self.modifiers.any() && !char.is_control() => Some(char),
            _ => None,
        }
    }
}

impl From<char> for KeyEvent {
    fn from(value: char) -> Self {
        Self::plain(Key::Char(value))
    }
}

/// Characters added to the buffer by one key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// A printable character, compared against the target at the cursor
    Typed { char: char, correct: bool },
    /// Tab: two literal spaces, never compared
    Indent,
    /// Enter: a literal newline, never compared
    Newline,
}

impl Insertion {
    /// The characters this insertion appends
    pub fn chars(self) -> impl Iterator<Item = char> {
        let (first, second) = match self {
            Self::Typed { char, .. } => (char, None),
            Self::Indent => (' ', Some(' ')),
            Self::Newline => ('\n', None),
        };
        std::iter::once(first).chain(second)
    }
}

/// What a key event does to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// No state change
    Ignore,
    Insert(Insertion),
    /// Remove the last typed character
    Delete,
    /// A mismatch under instant-death: count the mistake, fail, append nothing
    Fail { char: char },
}

/// The interpreter's decision for a single key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interpretation {
    pub action: Action,
    /// The event is the first content keystroke of the session
    pub starts_session: bool,
    /// The host should swallow the event's default behaviour (scrolling, focus change)
    pub suppress_default: bool,
    /// A power-mode particle burst should be spawned at the cursor
    pub burst: bool,
}

impl Interpretation {
    pub(crate) const fn ignored(suppress_default: bool) -> Self {
        Self {
            action: Action::Ignore,
            starts_session: false,
            suppress_default,
            burst: false,
        }
    }

    /// True if the event counts as a mistake
    pub const fn is_mistake(&self) -> bool {
        matches!(
            self.action,
            Action::Fail { .. } | Action::Insert(Insertion::Typed { correct: false, .. })
        )
    }
}

/// Interprets one key event.
///
/// * `event` - The key event
/// * `typed` - The buffer before the event
/// * `target` - The text to reproduce
/// * `options` - Enabled options
/// * `started` - Whether the session already has a start time
///
/// A printable character is compared against `target[typed.len()]`. A cursor past the end of
/// the target (only reachable through Tab/Enter) compares as a mismatch.
pub fn interpret(
    event: &KeyEvent,
    typed: &TypedBuffer,
    target: &[char],
    options: OptionSet,
    started: bool,
) -> Interpretation {
    let printable = event.printable();
    let suppress_default = matches!(event.key, Key::Tab) || printable == Some(' ');

    match (event.key, printable) {
        (Key::Tab, _) => Interpretation {
            action: Action::Insert(Insertion::Indent),
            ..Interpretation::ignored(suppress_default)
        },
        (Key::Backspace, _) if typed.is_empty() => Interpretation::ignored(suppress_default),
        (Key::Backspace, _) => Interpretation {
            action: Action::Delete,
            ..Interpretation::ignored(suppress_default)
        },
        (Key::Enter, _) => Interpretation {
            action: Action::Insert(Insertion::Newline),
            ..Interpretation::ignored(suppress_default)
        },
        (_, Some(char)) => {
            let correct = target.get(typed.len()) == Some(&char);
            let action = if !correct && options.contains(TypingOption::InstantDeath) {
                Action::Fail { char }
            } else {
                Action::Insert(Insertion::Typed { char, correct })
            };

            Interpretation {
                action,
                starts_session: !started,
                suppress_default,
                burst: correct && options.contains(TypingOption::PowerMode),
            }
        }
        _ => Interpretation::ignored(suppress_default),
    }
}

/// The characters typed so far in a session
///
/// The cursor is always at `len()`; it is never stored separately.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TypedBuffer {
    input: Vec<char>,
}

impl TypedBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            input: Vec::with_capacity(capacity),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Number of typed characters, which is also the cursor position
    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn as_slice(&self) -> &[char] {
        &self.input
    }

    /// True once the buffer is at least as long as the target. Tab and Enter can push it past
    /// the end, so this is a `>=` check.
    pub fn reaches(&self, text_len: usize) -> bool {
        self.input.len() >= text_len
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }

    /// Applies an action and returns true if the buffer changed
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Insert(insertion) => {
                self.input.extend(insertion.chars());
                true
            }
            Action::Delete => self.input.pop().is_some(),
            Action::Ignore | Action::Fail { .. } => false,
        }
    }
}

impl std::fmt::Display for TypedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.input.iter().try_for_each(|char| write!(f, "{char}"))
    }
}
