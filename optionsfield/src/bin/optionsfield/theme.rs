//! Terminal styling shared by status lines, help text and reports.

use colored::{Color, Colorize};

pub const ARROW: &str = "→";
pub const BULLET: &str = "•";

/// What a piece of CLI text means. The tone picks its color, weight and icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Failure,
    Caution,
    Note,
    Detail,
    Heading,
    Label,
    Value,
    Example,
}

impl Tone {
    pub const fn color(self) -> Color {
        match self {
            Tone::Success => Color::Green,
            Tone::Failure => Color::Red,
            Tone::Caution => Color::Yellow,
            Tone::Note => Color::Blue,
            Tone::Detail => Color::BrightBlack,
            Tone::Heading => Color::BrightBlue,
            Tone::Label => Color::BrightCyan,
            Tone::Value => Color::White,
            Tone::Example => Color::Magenta,
        }
    }

    pub const fn icon(self) -> Option<&'static str> {
        match self {
            Tone::Success => Some("✓"),
            Tone::Failure => Some("✗"),
            Tone::Caution => Some("⚠"),
            Tone::Note => Some("ℹ"),
            Tone::Detail => Some(ARROW),
            Tone::Heading | Tone::Label | Tone::Value | Tone::Example => None,
        }
    }

    const fn is_bold(self) -> bool {
        matches!(self, Tone::Heading | Tone::Label)
    }

    /// `text` in this tone, or untouched when color is off.
    pub fn paint(self, text: &str, use_color: bool) -> String {
        if !use_color {
            return text.to_string();
        }
        let styled = text.color(self.color());
        if self.is_bold() { styled.bold().to_string() } else { styled.to_string() }
    }

    /// Icon-prefixed status line.
    pub fn status_line(self, message: &str, use_color: bool) -> String {
        match self.icon() {
            Some(icon) => {
                format!("{} {}", self.paint(icon, use_color), self.paint(message, use_color))
            }
            None => self.paint(message, use_color),
        }
    }
}
