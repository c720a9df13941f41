//! # Metrics Module - Speed and Accuracy Calculations
//!
//! Words are not counted literally. A "word" is [`AVERAGE_WORD_LENGTH`] characters
//! of the target.
//!
//! ```rust
//! use rote::metrics::Outcome;
//! use rote::options::OptionSet;
//! use web_time::Duration;
//!
//! // 100 characters in 100 seconds with no mistakes
//! let outcome = Outcome::calculate(Duration::from_secs(100), 100, 0, OptionSet::empty());
//! assert_eq!(outcome.wpm, 6.0);
//! assert_eq!(outcome.accuracy, 100.0);
//! ```

use web_time::Duration;

use crate::options::OptionSet;
use crate::{AVERAGE_WORD_LENGTH, Seconds, minutes};

/// Rounds to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Calculate Words Per Minute
///
/// * `characters` - How many characters make up the typed text
/// * `seconds` - How many seconds the typing took
///
/// Returns 0 when no time has passed.
pub fn words_per_minute(characters: usize, seconds: Seconds) -> f64 {
    if seconds <= 0.0 {
        return 0.0;
    }

    let words = characters as f64 / AVERAGE_WORD_LENGTH as f64;
    words / minutes(seconds)
}

/// Calculate typing accuracy as a percentage between 0.0 - 100.0
///
/// * `characters` - The length of the text
/// * `mistakes` - Mistakes made while typing it. May exceed `characters`, in which case the
///   accuracy is 0.
pub fn accuracy(characters: usize, mistakes: u32) -> f64 {
    if characters == 0 {
        return 100.0;
    }

    let characters = characters as f64;
    ((characters - f64::from(mistakes)) / characters * 100.0).max(0.0)
}

/// Live WPM shown while typing, truncated to a whole number
///
/// * `typed` - Characters currently in the typed buffer
/// * `elapsed_secs` - Whole seconds reported by the session clock
pub fn live_words_per_minute(typed: usize, elapsed_secs: u64) -> u32 {
    if elapsed_secs == 0 {
        return 0;
    }

    words_per_minute(typed, elapsed_secs as Seconds).floor() as u32
}

/// The result of a completed session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    /// Seconds from the first keystroke to completion
    pub time: Seconds,
    pub mistakes: u32,
    /// Words per minute, rounded to two decimals
    pub wpm: f64,
    /// Percentage between 0.0 - 100.0, rounded to two decimals
    pub accuracy: f64,
    /// The options that were enabled when the session finished
    pub options: OptionSet,
}

impl Outcome {
    /// Computes the outcome of a session
    ///
    /// * `time` - Duration between the start and completion instants
    /// * `total_chars` - Length of the target text
    /// * `mistakes` - Mistakes counted during the session
    /// * `options` - Options enabled at completion
    pub fn calculate(time: Duration, total_chars: usize, mistakes: u32, options: OptionSet) -> Self {
        let seconds = time.as_secs_f64();

        Self {
            time: seconds,
            mistakes,
            wpm: round2(words_per_minute(total_chars, seconds)),
            accuracy: round2(accuracy(total_chars, mistakes)),
            options,
        }
    }
}
