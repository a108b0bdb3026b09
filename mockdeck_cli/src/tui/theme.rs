//! Dashboard color palettes
//!
//! Two palettes, toggled at runtime with `t`; the chosen one persists in the
//! config file so the preference survives restarts.

use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeName {
    Dark,
    Light,
}

impl ThemeName {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Dark => "dark",
            ThemeName::Light => "light",
        }
    }
}

/// Palette for the dashboard widgets
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub name: ThemeName,

    pub text: Color,
    pub dim: Color,
    pub border: Color,
    pub key: Color,

    pub success: Color,
    pub error: Color,
    pub neutral: Color,

    pub hanging: Color,
    pub method: Color,
    pub path: Color,

    pub selection_bg: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: ThemeName::Dark,
            text: Color::White,
            dim: Color::DarkGray,
            border: Color::DarkGray,
            key: Color::Cyan,
            success: Color::Green,
            error: Color::Red,
            neutral: Color::Yellow,
            hanging: Color::Red,
            method: Color::Blue,
            path: Color::Magenta,
            selection_bg: Color::Rgb(40, 40, 60),
        }
    }

    pub fn light() -> Self {
        Self {
            name: ThemeName::Light,
            text: Color::Black,
            dim: Color::Gray,
            border: Color::Gray,
            key: Color::Rgb(0, 110, 140),
            success: Color::Rgb(20, 120, 60),
            error: Color::Rgb(180, 40, 40),
            neutral: Color::Rgb(160, 120, 0),
            hanging: Color::Rgb(180, 40, 40),
            method: Color::Rgb(30, 70, 160),
            path: Color::Rgb(110, 40, 160),
            selection_bg: Color::Rgb(220, 220, 235),
        }
    }

    /// Look up a palette by its persisted name; unknown names fall back to dark
    pub fn named(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn toggled(&self) -> Self {
        match self.name {
            ThemeName::Dark => Self::light(),
            ThemeName::Light => Self::dark(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_falls_back_to_dark() {
        assert_eq!(Theme::named("light").name, ThemeName::Light);
        assert_eq!(Theme::named("dark").name, ThemeName::Dark);
        assert_eq!(Theme::named("solarized").name, ThemeName::Dark);
    }

    #[test]
    fn test_toggle_roundtrip() {
        let theme = Theme::dark();
        assert_eq!(theme.toggled().name, ThemeName::Light);
        assert_eq!(theme.toggled().toggled().name, ThemeName::Dark);
    }
}
