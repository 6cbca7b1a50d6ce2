use ratatui::style::Color;
use serde::Deserialize;

/// Semantic color slots for the diff viewer.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    // General UI
    pub accent: Color,
    pub text: Color,
    pub text_muted: Color,
    pub surface: Color,

    // Diff
    pub gutter_fg: Color,
    pub diff_add_bg: Color,
    pub diff_del_bg: Color,
    /// Intraline emphasis inside added / removed lines.
    pub emphasis_add_bg: Color,
    pub emphasis_del_bg: Color,
    pub collapsed_bg: Color,
    pub collapsed_fg: Color,

    // Selection and comments
    pub selection_bg: Color,
    pub range_marker_bg: Color,
    pub range_marker_hover_bg: Color,
    pub thread_fg: Color,
    pub thread_bg: Color,
    pub affordance_fg: Color,
    pub affordance_bg: Color,

    // Status indicators
    pub success: Color,
    pub error: Color,
}

pub const THEME_NAMES: &[&str] = &["one-dark", "github-dark", "dracula"];

impl Theme {
    pub fn from_name(name: &str) -> Self {
        match name {
            "github-dark" => github_dark(),
            "dracula" => dracula(),
            _ => one_dark(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        one_dark()
    }
}

pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

// ── Serde-compatible override struct ──────────────────────────────

/// `[colors]` table of the config file; each slot is a `#rrggbb` string.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ThemeOverrides {
    pub accent: Option<String>,
    pub text: Option<String>,
    pub text_muted: Option<String>,
    pub surface: Option<String>,
    pub gutter_fg: Option<String>,
    pub diff_add_bg: Option<String>,
    pub diff_del_bg: Option<String>,
    pub emphasis_add_bg: Option<String>,
    pub emphasis_del_bg: Option<String>,
    pub collapsed_bg: Option<String>,
    pub collapsed_fg: Option<String>,
    pub selection_bg: Option<String>,
    pub range_marker_bg: Option<String>,
    pub range_marker_hover_bg: Option<String>,
    pub thread_fg: Option<String>,
    pub thread_bg: Option<String>,
    pub affordance_fg: Option<String>,
    pub affordance_bg: Option<String>,
    pub success: Option<String>,
    pub error: Option<String>,
}

pub fn apply_overrides(theme: &mut Theme, overrides: &ThemeOverrides) {
    macro_rules! apply {
        ($($field:ident),* $(,)?) => {
            $(
                if let Some(c) = overrides.$field.as_deref().and_then(parse_hex_color) {
                    theme.$field = c;
                }
            )*
        };
    }
    apply!(
        accent,
        text,
        text_muted,
        surface,
        gutter_fg,
        diff_add_bg,
        diff_del_bg,
        emphasis_add_bg,
        emphasis_del_bg,
        collapsed_bg,
        collapsed_fg,
        selection_bg,
        range_marker_bg,
        range_marker_hover_bg,
        thread_fg,
        thread_bg,
        affordance_fg,
        affordance_bg,
        success,
        error,
    );
}

// ── Built-in themes ──────────────────────────────────────────────

fn one_dark() -> Theme {
    Theme {
        name: "one-dark".to_string(),
        accent: Color::Cyan,
        text: Color::Rgb(171, 178, 191),
        text_muted: Color::DarkGray,
        surface: Color::Rgb(30, 30, 30),
        gutter_fg: Color::Rgb(92, 99, 112),
        diff_add_bg: Color::Rgb(0, 30, 0),
        diff_del_bg: Color::Rgb(40, 0, 0),
        emphasis_add_bg: Color::Rgb(0, 70, 0),
        emphasis_del_bg: Color::Rgb(90, 0, 0),
        collapsed_bg: Color::Rgb(20, 20, 20),
        collapsed_fg: Color::Rgb(92, 99, 112),
        selection_bg: Color::Rgb(70, 50, 100),
        range_marker_bg: Color::Rgb(70, 60, 20),
        range_marker_hover_bg: Color::Rgb(130, 110, 30),
        thread_fg: Color::Rgb(229, 192, 123),
        thread_bg: Color::Rgb(38, 38, 46),
        affordance_fg: Color::Black,
        affordance_bg: Color::Cyan,
        success: Color::Green,
        error: Color::Red,
    }
}

fn github_dark() -> Theme {
    Theme {
        name: "github-dark".to_string(),
        accent: Color::Rgb(88, 166, 255),
        text: Color::Rgb(230, 237, 243),
        text_muted: Color::Rgb(125, 133, 144),
        surface: Color::Rgb(22, 27, 34),
        gutter_fg: Color::Rgb(110, 118, 129),
        diff_add_bg: Color::Rgb(18, 40, 24),
        diff_del_bg: Color::Rgb(50, 18, 18),
        emphasis_add_bg: Color::Rgb(30, 90, 45),
        emphasis_del_bg: Color::Rgb(110, 30, 35),
        collapsed_bg: Color::Rgb(13, 17, 23),
        collapsed_fg: Color::Rgb(125, 133, 144),
        selection_bg: Color::Rgb(38, 79, 120),
        range_marker_bg: Color::Rgb(75, 60, 15),
        range_marker_hover_bg: Color::Rgb(150, 115, 25),
        thread_fg: Color::Rgb(210, 153, 34),
        thread_bg: Color::Rgb(33, 38, 45),
        affordance_fg: Color::Rgb(13, 17, 23),
        affordance_bg: Color::Rgb(88, 166, 255),
        success: Color::Rgb(63, 185, 80),
        error: Color::Rgb(248, 81, 73),
    }
}

fn dracula() -> Theme {
    Theme {
        name: "dracula".to_string(),
        accent: Color::Rgb(139, 233, 253),
        text: Color::Rgb(248, 248, 242),
        text_muted: Color::Rgb(98, 114, 164),
        surface: Color::Rgb(40, 42, 54),
        gutter_fg: Color::Rgb(98, 114, 164),
        diff_add_bg: Color::Rgb(15, 40, 15),
        diff_del_bg: Color::Rgb(45, 10, 10),
        emphasis_add_bg: Color::Rgb(25, 85, 35),
        emphasis_del_bg: Color::Rgb(100, 20, 25),
        collapsed_bg: Color::Rgb(30, 31, 40),
        collapsed_fg: Color::Rgb(98, 114, 164),
        selection_bg: Color::Rgb(68, 71, 90),
        range_marker_bg: Color::Rgb(80, 75, 30),
        range_marker_hover_bg: Color::Rgb(140, 130, 40),
        thread_fg: Color::Rgb(241, 250, 140),
        thread_bg: Color::Rgb(50, 52, 66),
        affordance_fg: Color::Rgb(40, 42, 54),
        affordance_bg: Color::Rgb(189, 147, 249),
        success: Color::Rgb(80, 250, 123),
        error: Color::Rgb(255, 85, 85),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(parse_hex_color("0a0b0c"), Some(Color::Rgb(10, 11, 12)));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }

    #[test]
    fn test_overrides_skip_invalid_colors() {
        let mut theme = Theme::from_name("dracula");
        let overrides = ThemeOverrides {
            selection_bg: Some("#010203".to_string()),
            thread_fg: Some("not a color".to_string()),
            ..Default::default()
        };
        apply_overrides(&mut theme, &overrides);
        assert_eq!(theme.selection_bg, Color::Rgb(1, 2, 3));
        assert_eq!(theme.thread_fg, Color::Rgb(241, 250, 140));
    }

    #[test]
    fn test_unknown_name_falls_back() {
        assert_eq!(Theme::from_name("nope").name, "one-dark");
        for name in THEME_NAMES {
            assert_eq!(Theme::from_name(name).name, *name);
        }
    }
}
