//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};

/// Render the header bar with the analytics overview.
///
/// Displays: trend indicator, record count, mean heart rate, high-risk count.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            Span::styled(" EYE2HEART ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("│ Loading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let analysis = &data.analysis;
    let trend_style = app.theme.trend_style(analysis.trend.status);

    let mut spans = vec![
        Span::styled(" ● ", trend_style),
        Span::styled("EYE2HEART ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            analysis.total_records.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" records │ mean "),
        Span::styled(
            format!("{:.0}", analysis.mean_heart_rate),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" BPM │ "),
        Span::styled(analysis.trend.status.label(), trend_style),
        Span::raw(" │ "),
    ];

    if analysis.high_risk_count > 0 {
        spans.push(Span::styled(
            analysis.high_risk_count.to_string(),
            app.theme.stability_style(analysis.stability),
        ));
    } else {
        spans.push(Span::styled("0", Style::default().add_modifier(Modifier::DIM)));
    }
    spans.push(Span::raw(" high risk"));

    if let Some(added) = app.history.new_records().filter(|&n| n != 0) {
        spans.push(Span::styled(
            format!(" ({:+})", added),
            Style::default().fg(app.theme.highlight),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Trends "), Line::from(" 2:History ")];

    let selected = match app.current_view {
        View::Trends => 0,
        View::History => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Temporary status messages take priority over everything else. An expired
/// session is reported until the user quits.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if app.session_expired {
        let paragraph = Paragraph::new(" Session expired, run `eye2heart login` again | q:quit")
            .style(Style::default().fg(app.theme.alert));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref data) = app.data {
        let elapsed = data.last_updated.elapsed();

        let controls = match app.current_view {
            View::Trends => "r:refresh e:export Tab:switch ?:help q:quit",
            View::History if app.filter_active => "Type to search | Enter:apply Esc:cancel",
            View::History => "/:search s:sort S:reverse Tab:switch ?:help q:quit",
        };

        let error = app
            .load_error
            .as_deref()
            .map(|e| format!(" | Error: {}", e))
            .unwrap_or_default();

        format!(
            " {} | Updated {:.1}s ago{} | {}",
            app.source_description(),
            elapsed.as_secs_f64(),
            error,
            controls,
        )
    } else if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit r:retry", err)
    } else {
        " Loading... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  Tab ←/→ 1/2 Switch views"),
        Line::from("  ↑/↓ j/k     Navigate history"),
        Line::from("  PgUp/PgDn   Jump 10 records"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from(""),
        section(" History"),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        section(" General"),
        Line::from("  r         Refresh vitals"),
        Line::from("  e         Export report to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 23u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
