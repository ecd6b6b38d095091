//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use eye2heart_types::RiskLevel;

use crate::data::{BpmRange, StabilityScore, TrendStatus};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for stable / low-risk values.
    pub good: Color,
    /// Color for medium-risk values.
    pub caution: Color,
    /// Color for high-risk values and rising trends.
    pub alert: Color,
    /// Color for falling trends.
    pub falling: Color,
    /// Color for muted text (insufficient data, unknown values).
    pub muted: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            good: Color::Green,
            caution: Color::Yellow,
            alert: Color::Red,
            falling: Color::LightBlue,
            muted: Color::Gray,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            good: Color::Rgb(0x05, 0x96, 0x69),
            caution: Color::Rgb(0xd9, 0x77, 0x06),
            alert: Color::Rgb(0xdc, 0x26, 0x26),
            falling: Color::Rgb(0x25, 0x63, 0xeb),
            muted: Color::Rgb(0x64, 0x74, 0x8b),
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Accent color for a trend status.
    pub fn trend_color(&self, status: TrendStatus) -> Color {
        match status {
            TrendStatus::Stable => self.good,
            TrendStatus::Increasing => self.alert,
            TrendStatus::Decreasing => self.falling,
            TrendStatus::InsufficientData => self.muted,
        }
    }

    pub fn trend_style(&self, status: TrendStatus) -> Style {
        Style::default()
            .fg(self.trend_color(status))
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for a risk level. Unrecognised levels are muted.
    pub fn risk_style(&self, risk: Option<RiskLevel>) -> Style {
        match risk {
            Some(RiskLevel::Low) => Style::default().fg(self.good),
            Some(RiskLevel::Medium) => Style::default().fg(self.caution),
            Some(RiskLevel::High) => Style::default().fg(self.alert).add_modifier(Modifier::BOLD),
            None => Style::default().fg(self.muted),
        }
    }

    pub fn stability_style(&self, score: StabilityScore) -> Style {
        match score {
            StabilityScore::Excellent => Style::default().fg(self.good),
            StabilityScore::Good => Style::default().fg(self.caution),
            StabilityScore::ActionRequired => {
                Style::default().fg(self.alert).add_modifier(Modifier::BOLD)
            }
        }
    }

    pub fn range_style(&self, range: Option<BpmRange>) -> Style {
        match range {
            Some(BpmRange::Within) => Style::default(),
            Some(BpmRange::Below) => Style::default().fg(self.falling),
            Some(BpmRange::Above) => Style::default().fg(self.alert),
            None => Style::default().fg(self.muted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_colors_distinct() {
        let theme = Theme::light();
        assert_eq!(theme.trend_color(TrendStatus::Increasing), Color::Rgb(0xdc, 0x26, 0x26));
        assert_ne!(
            theme.trend_color(TrendStatus::Stable),
            theme.trend_color(TrendStatus::Decreasing)
        );
    }

    #[test]
    fn test_unknown_risk_is_muted() {
        let theme = Theme::dark();
        assert_eq!(theme.risk_style(None), Style::default().fg(theme.muted));
    }
}
