//! # Options Module - Composable Practice Modes
//!
//! A session can be tuned with a handful of independent modes. They are stored
//! as a small bitset ([`OptionSet`]) so they can be copied freely into the
//! [`Outcome`](crate::metrics::Outcome) of a finished session.
//!
//! ```rust
//! use rote::options::{FollowUp, OptionSet, TypingOption};
//!
//! let mut options: OptionSet = "power-mode,back-to-back".parse().unwrap();
//! assert!(options.contains(TypingOption::Repeat));
//!
//! options.toggle(TypingOption::PowerMode);
//! assert!(!options.contains(TypingOption::PowerMode));
//! assert_eq!(options.follow_up(), FollowUp::Repeat);
//! ```

use std::fmt::{self, Display};
use std::str::FromStr;

use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("Unknown typing option '{0}'")]
    Unknown(String),
}

/// A single practice mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum TypingOption {
    /// Particle bursts on every correct keystroke
    PowerMode,
    /// Reload the same template after completion (also known as back-to-back)
    Repeat,
    /// Pick a random template after completion
    Randomization,
    /// Fail the session on the first mistake
    InstantDeath,
}

impl TypingOption {
    const fn bit(self) -> u8 {
        1 << self as u8
    }

    /// Short human readable description, used for toolbars and help text
    pub const fn description(self) -> &'static str {
        match self {
            Self::PowerMode => "Enable power mode",
            Self::Repeat => "Repeat the same template",
            Self::Randomization => "Enable randomization",
            Self::InstantDeath => "Enable instant death mode",
        }
    }
}

impl FromStr for TypingOption {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if name == "back-to-back" {
            return Ok(Self::Repeat);
        }

        Self::iter()
            .find(|option| option.to_string() == name)
            .ok_or_else(|| OptionError::Unknown(s.trim().to_string()))
    }
}

/// What the host should load after a session completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Type the same target again
    Repeat,
    /// Pick a different target at random
    Randomize,
    /// Move on to the next target in order
    Next,
}

/// A set of enabled [`TypingOption`]s
///
/// The set is `Copy` and persists across sessions; the engine only ever reads it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OptionSet(u8);

impl OptionSet {
    /// An empty set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builder-style insertion
    pub const fn with(self, option: TypingOption) -> Self {
        Self(self.0 | option.bit())
    }

    pub const fn contains(self, option: TypingOption) -> bool {
        self.0 & option.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn insert(&mut self, option: TypingOption) {
        self.0 |= option.bit();
    }

    pub const fn remove(&mut self, option: TypingOption) {
        self.0 &= !option.bit();
    }

    /// Flips an option and returns whether it is now enabled
    pub const fn toggle(&mut self, option: TypingOption) -> bool {
        self.0 ^= option.bit();
        self.contains(option)
    }

    /// Iterates the enabled options in declaration order
    pub fn iter(self) -> impl Iterator<Item = TypingOption> {
        TypingOption::iter().filter(move |option| self.contains(*option))
    }

    /// Decides what comes after a completed session.
    ///
    /// `Repeat` takes precedence over `Randomization`; with neither, the host moves to the next
    /// target.
    pub const fn follow_up(self) -> FollowUp {
        if self.contains(TypingOption::Repeat) {
            FollowUp::Repeat
        } else if self.contains(TypingOption::Randomization) {
            FollowUp::Randomize
        } else {
            FollowUp::Next
        }
    }

    /// Returns `(winner, shadowed)` when two enabled options compete for the same decision.
    ///
    /// Every combination is allowed, but `Repeat` silently overrides `Randomization`.
    pub const fn shadowed(self) -> Option<(TypingOption, TypingOption)> {
        if self.contains(TypingOption::Repeat) && self.contains(TypingOption::Randomization) {
            Some((TypingOption::Repeat, TypingOption::Randomization))
        } else {
            None
        }
    }
}

impl FromIterator<TypingOption> for OptionSet {
    fn from_iter<T: IntoIterator<Item = TypingOption>>(iter: T) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl FromStr for OptionSet {
    type Err = OptionError;

    /// Parses a comma separated list, e.g. `"power-mode, instant-death"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .filter(|name| !name.trim().is_empty())
            .map(TypingOption::from_str)
            .collect()
    }
}

impl Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.iter().map(|option| option.to_string()).collect::<Vec<_>>();
        write!(f, "{}", names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_toggle_is_independent() {
        let mut options = OptionSet::empty().with(TypingOption::InstantDeath);

        assert!(options.toggle(TypingOption::PowerMode));
        assert!(options.contains(TypingOption::InstantDeath));

        assert!(!options.toggle(TypingOption::PowerMode));
        assert!(!options.contains(TypingOption::PowerMode));
        assert!(options.contains(TypingOption::InstantDeath));

        options.remove(TypingOption::InstantDeath);
        assert!(options.is_empty());
    }

    #[test]
    fn test_parse_list() {
        let options: OptionSet = "power-mode, back-to-back,INSTANT-DEATH".parse().unwrap();
        assert_eq!(
            options.iter().collect::<Vec<_>>(),
            vec![
                TypingOption::PowerMode,
                TypingOption::Repeat,
                TypingOption::InstantDeath
            ]
        );
        assert_eq!(options.to_string(), "power-mode,repeat,instant-death");

        assert_eq!("".parse::<OptionSet>(), Ok(OptionSet::empty()));
        assert_matches!(
            "power-mode,turbo".parse::<OptionSet>(),
            Err(OptionError::Unknown(name)) if name == "turbo"
        );
    }

    #[test]
    fn test_follow_up_precedence() {
        assert_eq!(OptionSet::empty().follow_up(), FollowUp::Next);

        let random = OptionSet::empty().with(TypingOption::Randomization);
        assert_eq!(random.follow_up(), FollowUp::Randomize);
        assert_eq!(random.shadowed(), None);

        let both = random.with(TypingOption::Repeat);
        assert_eq!(both.follow_up(), FollowUp::Repeat);
        assert_eq!(
            both.shadowed(),
            Some((TypingOption::Repeat, TypingOption::Randomization))
        );
    }
}
