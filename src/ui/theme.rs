//! Dashboard colors.
//!
//! Two palettes, one for dark and one for light terminal backgrounds. Chart
//! line colors belong to each metric's chart surface, not to the palette.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::Severity;

/// Background luma above which the light palette is used.
const LIGHT_BACKGROUND_LUMA: f32 = 0.5;

/// Styles shared by every dashboard panel.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Status text, overlay frames and other accents.
    pub accent: Color,
    pub warning: Color,
    pub critical: Color,
    /// Connection dot while the server answers.
    pub connected: Color,
    /// Frames around the readings panel and charts.
    pub border: Color,
    pub title: Style,
    /// Highlighted row in the device picker.
    pub picker_selected: Style,
    pub device_active: Style,
    pub device_inactive: Style,
    /// Labels, placeholders and other secondary text.
    pub muted: Style,
    pub border_type: BorderType,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        let accent = Color::Cyan;
        Self {
            accent,
            warning: Color::Yellow,
            critical: Color::Red,
            connected: Color::Green,
            border: Color::Gray,
            title: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            picker_selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            device_active: Style::default()
                .fg(accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            device_inactive: Style::default().fg(Color::Gray),
            muted: Style::default().add_modifier(Modifier::DIM),
            border_type: BorderType::Rounded,
        }
    }

    pub fn light() -> Self {
        let accent = Color::Blue;
        Self {
            accent,
            warning: Color::Rgb(180, 110, 0),
            critical: Color::Red,
            connected: Color::Green,
            border: Color::DarkGray,
            title: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            picker_selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            device_active: Style::default()
                .fg(accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            device_inactive: Style::default().fg(Color::DarkGray),
            muted: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Pick a palette for a terminal background of the given luma (0.0 to 1.0).
    ///
    /// An unknown background gets the dark palette.
    pub fn for_background(luma: Option<f32>) -> Self {
        match luma {
            Some(luma) if luma > LIGHT_BACKGROUND_LUMA => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Query the terminal background and pick a palette for it.
    pub fn auto_detect() -> Self {
        Self::for_background(terminal_light::luma().ok())
    }

    /// Banner style for an alert.
    ///
    /// Critical banners are filled so they stand out from the warning row.
    pub fn severity_style(&self, severity: Severity) -> Style {
        match severity {
            Severity::Warning => Style::default().fg(self.warning).add_modifier(Modifier::BOLD),
            Severity::Critical => Style::default()
                .fg(Color::White)
                .bg(self.critical)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Foreground-only style for alert counts in the footer.
    pub fn severity_fg(&self, severity: Severity) -> Style {
        match severity {
            Severity::Warning => Style::default().fg(self.warning),
            Severity::Critical => Style::default().fg(self.critical),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_selects_palette() {
        assert_eq!(Theme::for_background(Some(0.9)).accent, Theme::light().accent);
        assert_eq!(Theme::for_background(Some(0.1)).accent, Theme::dark().accent);
        assert_eq!(Theme::for_background(Some(0.5)).accent, Theme::dark().accent);
        assert_eq!(Theme::for_background(None).accent, Theme::dark().accent);
    }

    #[test]
    fn test_critical_banner_is_filled() {
        let theme = Theme::dark();
        assert_eq!(theme.severity_style(Severity::Critical).bg, Some(theme.critical));
        assert_eq!(theme.severity_style(Severity::Warning).bg, None);
        assert_eq!(theme.severity_fg(Severity::Warning).fg, Some(theme.warning));
    }
}
