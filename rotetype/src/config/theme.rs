use ratatui::style::Color;
use rote::SessionState;
use serde::{Deserialize, Serialize};
use terminal_colorsaurus::QueryOptions;

/// General theme
#[derive(Debug, Deserialize, Serialize)]
pub struct Theme {
    pub text: TextTheme,
    pub cursor: CursorTheme,
    pub state: StateTheme,
    pub term_fg: Color,
    pub term_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        let terminal_palette = terminal_colorsaurus::color_palette(QueryOptions::default()).ok();

        let (term_fg, term_bg) = if let Some(palette) = terminal_palette {
            let fg = palette.foreground.scale_to_8bit();
            let bg = palette.background.scale_to_8bit();
            (Color::Rgb(fg.0, fg.1, fg.2), Color::Rgb(bg.0, bg.1, bg.2))
        } else {
            (Color::Rgb(255, 255, 255), Color::Rgb(0, 0, 0))
        };

        Self {
            text: TextTheme::default(),
            cursor: CursorTheme::default(),
            state: StateTheme::default(),
            term_fg,
            term_bg,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CursorTheme {
    pub color: Color,
    pub text: Color,
}

impl Default for CursorTheme {
    fn default() -> Self {
        Self {
            color: Color::White,
            text: Color::Black,
        }
    }
}

/// Text color theme
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct TextTheme {
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub highlight: Color,
    /// How far untyped text is faded towards the background, between 0.0 and 1.0
    pub pending_fade: f64,
}

impl Default for TextTheme {
    fn default() -> Self {
        Self {
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            highlight: Color::Blue,
            pending_fade: 0.5,
        }
    }
}

/// Badge colors for each session state
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct StateTheme {
    pub ready: Color,
    pub running: Color,
    pub complete: Color,
    pub failed: Color,
}

impl Default for StateTheme {
    fn default() -> Self {
        Self {
            ready: Color::Blue,
            running: Color::Green,
            complete: Color::Magenta,
            failed: Color::Red,
        }
    }
}

impl StateTheme {
    pub const fn color(&self, state: SessionState) -> Color {
        match state {
            SessionState::Initial | SessionState::Ready => self.ready,
            SessionState::InProgress => self.running,
            SessionState::Complete => self.complete,
            SessionState::Failed => self.failed,
        }
    }
}
