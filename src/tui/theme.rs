use std::collections::BTreeMap;

use ratatui::style::Color;

use crate::model::attendance::AttendanceStatus;

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub selection_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            yellow: Color::Rgb(0xFF, 0xD7, 0x00),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Create a theme from the `[colors]` config table, falling back to
    /// defaults. Unknown names and malformed values are ignored.
    pub fn from_config(colors: &BTreeMap<String, String>) -> Self {
        let mut theme = Theme::default();

        for (key, value) in colors {
            let Some(color) = parse_hex_color(value) else {
                tracing::warn!(key = %key, value = %value, "ignoring malformed color");
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "highlight" => theme.highlight = color,
                "dim" => theme.dim = color,
                "red" => theme.red = color,
                "yellow" => theme.yellow = color,
                "green" => theme.green = color,
                "selection_bg" => theme.selection_bg = color,
                _ => tracing::warn!(key = %key, "ignoring unknown color name"),
            }
        }

        theme
    }

    /// Get the color for an attendance status
    pub fn status_color(&self, status: AttendanceStatus) -> Color {
        match status {
            AttendanceStatus::Present => self.green,
            AttendanceStatus::Absent => self.red,
            AttendanceStatus::Cancelled => self.yellow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#FF4444"),
            Some(Color::Rgb(0xFF, 0x44, 0x44))
        );
        assert_eq!(parse_hex_color("FF4444"), None); // missing #
        assert_eq!(parse_hex_color("#FF44"), None); // too short
        assert_eq!(parse_hex_color("#ZZZZZZ"), None); // invalid hex
    }

    #[test]
    fn test_from_config_overrides() {
        let mut colors = BTreeMap::new();
        colors.insert("background".to_string(), "#000000".to_string());
        colors.insert("green".to_string(), "nope".to_string());
        colors.insert("purple".to_string(), "#112233".to_string());

        let theme = Theme::from_config(&colors);
        assert_eq!(theme.background, Color::Rgb(0, 0, 0));
        // Malformed and unknown entries leave defaults alone
        assert_eq!(theme.green, Theme::default().green);
        assert_eq!(theme.text, Color::Rgb(0xB0, 0xAA, 0xFF));
    }

    #[test]
    fn test_status_color() {
        let theme = Theme::default();
        assert_eq!(theme.status_color(AttendanceStatus::Present), theme.green);
        assert_eq!(theme.status_color(AttendanceStatus::Absent), theme.red);
        assert_eq!(theme.status_color(AttendanceStatus::Cancelled), theme.yellow);
    }
}
