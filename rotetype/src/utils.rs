use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::Color,
    widgets::{Block, BorderType, Padding},
};
use rote::{Key, Modifiers};

/// A block with a rounded border
pub const ROUNDED_BLOCK: Block = Block::bordered().border_type(BorderType::Rounded);

pub fn center(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
    let [area_horizontal] = Layout::horizontal([horizontal])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([vertical])
        .flex(Flex::Center)
        .areas(area_horizontal);
    area
}

/// Padding that centers content of the given height and/or width inside `area`
pub const fn centered_padding(area: Rect, height: Option<u16>, width: Option<u16>) -> Padding {
    let vertical = match height {
        Some(height) => area.height.saturating_sub(height) / 2,
        None => 0,
    };
    let horizontal = match width {
        Some(width) => area.width.saturating_sub(width) / 2,
        None => 0,
    };

    Padding::new(horizontal, horizontal, vertical, 0)
}

/// `42s` or `3m 05s`
pub fn format_duration(seconds: f64) -> String {
    let seconds = seconds.max(0.0).round() as u64;
    if seconds < 60 {
        format!("{seconds}s")
    } else {
        format!("{}m {:02}s", seconds / 60, seconds % 60)
    }
}

/// Best-effort RGB value of a colour. Named colours use the standard xterm palette.
pub fn to_rgb(color: Color) -> Option<(u8, u8, u8)> {
    let index = match color {
        Color::Rgb(r, g, b) => return Some((r, g, b)),
        Color::Indexed(index) => index,
        Color::Black => 0,
        Color::Red => 1,
        Color::Green => 2,
        Color::Yellow => 3,
        Color::Blue => 4,
        Color::Magenta => 5,
        Color::Cyan => 6,
        Color::Gray => 7,
        Color::DarkGray => 8,
        Color::LightRed => 9,
        Color::LightGreen => 10,
        Color::LightYellow => 11,
        Color::LightBlue => 12,
        Color::LightMagenta => 13,
        Color::LightCyan => 14,
        Color::White => 15,
        Color::Reset => return None,
    };

    Some(ansi_colours::rgb_from_ansi256(index))
}

/// Blends `color` towards `background`. `amount` 0.0 keeps the colour, 1.0 is the background.
///
/// Set `indexed` for terminals without true colour support.
pub fn fade(color: Color, background: Color, amount: f64, indexed: bool) -> Color {
    let (Some(from), Some(to)) = (to_rgb(color), to_rgb(background)) else {
        return color;
    };

    let amount = amount.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * amount).round() as u8;
    let rgb = (mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2));

    if indexed {
        Color::Indexed(ansi_colours::ansi256_from_rgb(rgb))
    } else {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    }
}

/// A trait defining helper methods for keyevents
pub trait KeyEventHelper {
    /// Returns true if the keyevent contains a pressed key
    fn is_press(&self) -> bool;

    /// Returns true if the keyevent contains the given modifiers
    fn has_mods(&self, mods: KeyModifiers) -> bool;

    /// Returns true if the keyevent contains a character that matches the input
    fn is_char(&self, character: char) -> bool;

    /// Converts the keyevent into the engine's key representation
    fn to_rote(&self) -> rote::KeyEvent;

    /// Returns true if the keyevent matches the given character, and is being pressed
    fn is_press_char(&self, character: char) -> bool {
        self.is_press() && self.is_char(character)
    }

    /// Returns true if the keyevent matches the given character, and is being pressed with CTRL as
    /// a modifier.
    fn is_ctrl_press_char(&self, character: char) -> bool {
        self.has_mods(KeyModifiers::CONTROL) && self.is_press_char(character)
    }
}

impl KeyEventHelper for KeyEvent {
    fn is_press(&self) -> bool {
        self.kind == KeyEventKind::Press
    }

    fn is_char(&self, character: char) -> bool {
        self.code == KeyCode::Char(character)
    }

    fn has_mods(&self, mods: KeyModifiers) -> bool {
        self.modifiers.contains(mods)
    }

    fn to_rote(&self) -> rote::KeyEvent {
        let key = match self.code {
            KeyCode::Char(char) => Key::Char(char),
            KeyCode::Tab => Key::Tab,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Enter => Key::Enter,
            _ => Key::Other,
        };

        let modifiers = Modifiers {
            ctrl: self.has_mods(KeyModifiers::CONTROL),
            alt: self.has_mods(KeyModifiers::ALT),
            meta: self.has_mods(KeyModifiers::SUPER) || self.has_mods(KeyModifiers::META),
        };

        rote::KeyEvent::new(key, modifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade() {
        let white = Color::Rgb(255, 255, 255);
        let black = Color::Rgb(0, 0, 0);

        assert_eq!(fade(white, black, 0.0, false), white);
        assert_eq!(fade(white, black, 1.0, false), black);
        assert_eq!(fade(white, black, 0.5, false), Color::Rgb(128, 128, 128));
        // Out of range amounts are clamped
        assert_eq!(fade(white, black, 3.0, false), black);
        // Nothing to blend against
        assert_eq!(fade(white, Color::Reset, 0.5, false), white);
    }

    #[test]
    fn test_fade_named_colors() {
        let (r, g, b) = ansi_colours::rgb_from_ansi256(1);
        assert_eq!(fade(Color::Red, Color::Black, 0.0, false), Color::Rgb(r, g, b));
        assert!(matches!(
            fade(Color::Red, Color::Black, 0.5, true),
            Color::Indexed(_)
        ));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0s");
        assert_eq!(format_duration(42.4), "42s");
        assert_eq!(format_duration(185.0), "3m 05s");
    }

    #[test]
    fn test_centered_padding() {
        let area = Rect::new(0, 0, 40, 20);
        let padding = centered_padding(area, Some(10), Some(20));
        assert_eq!(padding, Padding::new(10, 10, 5, 0));

        // Content larger than the area is not padded
        let padding = centered_padding(area, Some(30), None);
        assert_eq!(padding, Padding::ZERO);
    }

    #[test]
    fn test_key_conversion() {
        let plain = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(plain.to_rote(), rote::KeyEvent::from('a'));

        let shifted = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(shifted.to_rote().printable(), Some('A'));

        let ctrl = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert!(ctrl.to_rote().modifiers.ctrl);
        assert_eq!(ctrl.to_rote().printable(), None);
        assert!(ctrl.is_ctrl_press_char('r'));

        let sup = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::SUPER);
        assert!(sup.to_rote().modifiers.meta);

        for (code, key) in [
            (KeyCode::Tab, Key::Tab),
            (KeyCode::Backspace, Key::Backspace),
            (KeyCode::Enter, Key::Enter),
            (KeyCode::F(2), Key::Other),
            (KeyCode::Left, Key::Other),
        ] {
            let event = KeyEvent::new(code, KeyModifiers::NONE);
            assert_eq!(event.to_rote().key, key);
        }
    }
}
