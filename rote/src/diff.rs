//! # Diff Module - Per-Character Classification for Rendering
//!
//! A stateless view over a target text and the characters typed so far. Each
//! target character is classified as pending, correct or incorrect, and the one at
//! the cursor is flagged so the host can draw a caret there.
//!
//! ```rust
//! use rote::diff::{diff, CharClass};
//!
//! let target: Vec<char> = "fn".chars().collect();
//! let typed: Vec<char> = "x".chars().collect();
//!
//! let views: Vec<_> = diff(&target, &typed).collect();
//! assert_eq!(views[0].class, CharClass::Incorrect);
//! assert_eq!(views[1].class, CharClass::Pending);
//! assert!(views[1].has_cursor);
//! ```

/// How a single target character is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Not typed yet
    Pending,
    /// Typed and matching
    Correct,
    /// Typed and different from the target
    Incorrect,
}

/// Rendering information for one target character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharView {
    pub char: char,
    pub class: CharClass,
    pub has_cursor: bool,
    pub index: usize,
}

/// Classifies the target character at `index`
pub fn classify(target: &[char], typed: &[char], index: usize) -> CharClass {
    match typed.get(index) {
        None => CharClass::Pending,
        Some(char) if target.get(index) == Some(char) => CharClass::Correct,
        Some(_) => CharClass::Incorrect,
    }
}

/// Iterates the target as [`CharView`]s
pub fn diff<'a>(target: &'a [char], typed: &'a [char]) -> DiffIter<'a> {
    DiffIter {
        target,
        typed,
        index: 0,
    }
}

/// Iterator returned by [`diff`]
#[derive(Debug, Clone)]
pub struct DiffIter<'a> {
    target: &'a [char],
    typed: &'a [char],
    index: usize,
}

impl ExactSizeIterator for DiffIter<'_> {}

impl std::iter::FusedIterator for DiffIter<'_> {}

impl Iterator for DiffIter<'_> {
    type Item = CharView;

    fn next(&mut self) -> Option<Self::Item> {
        let char = *self.target.get(self.index)?;
        let view = CharView {
            char,
            class: classify(self.target, self.typed, self.index),
            has_cursor: self.index == self.typed.len(),
            index: self.index,
        };

        self.index += 1;
        Some(view)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.target.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

/// A laid out line of the target
pub struct LineContext {
    /// Line index relative to the line holding the cursor
    pub active_line_offset: isize,
    pub contents: Vec<CharView>,
}

/// Configuration for line rendering behavior
pub struct LineRenderConfig {
    /// Maximum number of characters per line
    pub line_length: usize,
    /// Whether to allow breaking words in the middle
    pub wrap_words: bool,
    /// Whether to break at newline characters (\n)
    pub break_at_newlines: bool,
}

impl LineRenderConfig {
    pub const fn new(line_length: usize) -> Self {
        Self {
            line_length,
            wrap_words: false,
            break_at_newlines: true,
        }
    }

    pub const fn with_word_wrapping(mut self, wrap_words: bool) -> Self {
        self.wrap_words = wrap_words;
        self
    }

    pub const fn with_newline_breaking(mut self, break_at_newlines: bool) -> Self {
        self.break_at_newlines = break_at_newlines;
        self
    }
}

/// Lays the target out as lines and applies `line_renderer` to each one.
///
/// Code templates break at their own newlines first. Lines longer than
/// `config.line_length` are wrapped at whitespace unless `wrap_words` allows splitting words.
/// Returning `None` from the renderer drops the line.
pub fn render_lines<Line, F: FnMut(LineContext) -> Option<Line>>(
    target: &[char],
    typed: &[char],
    mut line_renderer: F,
    config: LineRenderConfig,
) -> Vec<Line> {
    let line_length = config.line_length.max(1);
    let mut lines = Vec::new();
    let mut current_line = Vec::new();
    let mut current_line_length = 0;
    let mut cursor_line_index = None;

    for view in diff(target, typed) {
        let is_space = view.char == ' ' || view.char == '\t';
        let is_newline = view.char == '\n';

        if view.has_cursor {
            cursor_line_index = Some(lines.len());
        }

        if config.break_at_newlines && is_newline {
            current_line.push(view);
            lines.push(std::mem::take(&mut current_line));
            current_line_length = 0;
            continue;
        }

        // At a space, check whether the next word still fits
        if !config.wrap_words && is_space && current_line_length > 0 {
            let next_word_length = target[view.index + 1..]
                .iter()
                .take_while(|char| !char.is_whitespace())
                .count();

            if current_line_length + 1 + next_word_length > line_length {
                current_line.push(view);
                lines.push(std::mem::take(&mut current_line));
                current_line_length = 0;
                continue;
            }
        }

        if current_line_length >= line_length {
            lines.push(std::mem::take(&mut current_line));
            current_line_length = 0;

            // Cursor moved to the new line along with this character
            if view.has_cursor {
                cursor_line_index = Some(lines.len());
            }
        }

        current_line.push(view);
        current_line_length += 1;
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    // Cursor past the end of the text sits on the last line
    let cursor_line = cursor_line_index.unwrap_or_else(|| lines.len().saturating_sub(1));

    lines
        .into_iter()
        .enumerate()
        .filter_map(|(index, contents)| {
            line_renderer(LineContext {
                active_line_offset: index as isize - cursor_line as isize,
                contents,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    fn render_text(target: &str, typed: &str, config: LineRenderConfig) -> Vec<String> {
        render_lines(
            &chars(target),
            &chars(typed),
            |line| Some(line.contents.iter().map(|view| view.char).collect()),
            config,
        )
    }

    #[test]
    fn test_classification() {
        let target = chars("hello");
        let typed = chars("hx");

        let rendered: Vec<String> = diff(&target, &typed)
            .map(|view| {
                let class = match view.class {
                    CharClass::Pending => "pending",
                    CharClass::Correct => "correct",
                    CharClass::Incorrect => "incorrect",
                };
                let cursor = if view.has_cursor { " [cursor]" } else { "" };
                format!("{}:{class}{cursor}", view.char)
            })
            .collect();

        assert_eq!(
            rendered,
            vec![
                "h:correct",
                "e:incorrect",
                "l:pending [cursor]",
                "l:pending",
                "o:pending"
            ]
        );

        let iter = diff(&target, &typed);
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.size_hint(), (5, Some(5)));
    }

    #[test]
    fn test_fully_typed_has_no_cursor() {
        let target = chars("ab");
        let typed = chars("ab");
        assert!(diff(&target, &typed).all(|view| !view.has_cursor));
        assert!(diff(&target, &typed).all(|view| view.class == CharClass::Correct));
    }

    #[test]
    fn test_lines_break_at_newlines() {
        let lines = render_text("fn a() {\n  1\n}", "", LineRenderConfig::new(80));
        assert_eq!(lines, vec!["fn a() {\n", "  1\n", "}"]);
    }

    #[test]
    fn test_lines_wrap_at_words() {
        let lines = render_text("hello world this is a test", "", LineRenderConfig::new(10));
        assert_eq!(lines, vec!["hello ", "world this ", "is a test"]);

        let lines = render_text(
            "hello world",
            "",
            LineRenderConfig::new(4).with_word_wrapping(true),
        );
        assert_eq!(lines, vec!["hell", "o wo", "rld"]);
    }

    #[test]
    fn test_active_line_offset() {
        let target = chars("one\ntwo\nthree");
        let typed = chars("one\nt");

        let offsets = render_lines(
            &target,
            &typed,
            |line| Some(line.active_line_offset),
            LineRenderConfig::new(80),
        );
        assert_eq!(offsets, vec![-1, 0, 1]);

        // Ghost lines can be dropped by the renderer
        let visible = render_lines(
            &target,
            &typed,
            |line| (line.active_line_offset >= 0).then_some(line.contents.len()),
            LineRenderConfig::new(80),
        );
        assert_eq!(visible, vec![4, 5]);
    }
}
