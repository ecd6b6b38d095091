//! Trends view rendering.
//!
//! Shows the current insight, three summary cards and a heart-rate
//! sparkline across all records.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::history::normalize_sparkline;
use crate::data::{VitalsData, REFERENCE_RANGE};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Dataset name shown next to the chart.
const DATASET: &str = "Vitals_v1.0";

/// Render the Trends view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        if app.load_error.is_some() {
            render_connection_error(frame, app, area);
        } else {
            render_loading(frame, app, area);
        }
        return;
    };

    if data.is_empty() {
        render_empty(frame, app, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Insight bar
            Constraint::Length(6), // Cards
            Constraint::Min(5),    // Chart
        ])
        .split(area);

    render_insight(frame, app, data, chunks[0]);
    render_cards(frame, app, data, chunks[1]);
    render_chart(frame, app, data, chunks[2]);
}

fn render_insight(frame: &mut Frame, app: &App, data: &VitalsData, area: Rect) {
    let analysis = &data.analysis;
    let status = analysis.trend.status;
    let trend_style = app.theme.trend_style(status);

    let mut left = Vec::new();
    if let Some(icon) = status.icon() {
        left.push(Span::raw(format!("{} ", icon)));
    }
    left.push(Span::styled(
        "CURRENT INSIGHT: ",
        Style::default().add_modifier(Modifier::DIM),
    ));
    left.push(Span::styled(status.label(), trend_style));
    if let Some(delta) = analysis.trend.delta {
        left.push(Span::styled(
            format!(" ({:+.1} BPM)", delta),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }

    let right = Line::from(vec![
        Span::styled("STABILITY SCORE: ", Style::default().add_modifier(Modifier::DIM)),
        Span::styled(
            analysis.stability.label(),
            app.theme.stability_style(analysis.stability),
        ),
        Span::raw(" "),
    ])
    .alignment(Alignment::Right);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.trend_color(status)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    frame.render_widget(Paragraph::new(Line::from(left)), inner);
    frame.render_widget(Paragraph::new(right), inner);
}

fn render_cards(frame: &mut Frame, app: &App, data: &VitalsData, area: Rect) {
    let analysis = &data.analysis;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let (low, high) = REFERENCE_RANGE;
    render_card(
        frame,
        app,
        columns[0],
        "MEAN HEART RATE",
        Line::from(vec![
            Span::styled(
                format!("{:.0}", analysis.mean_heart_rate),
                Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" BPM", Style::default().add_modifier(Modifier::DIM)),
        ]),
        Line::from(vec![
            Span::raw("Reference Range: "),
            Span::styled(
                format!("{:.0}–{:.0} BPM", low, high),
                Style::default().fg(app.theme.good),
            ),
        ]),
    );

    render_card(
        frame,
        app,
        columns[1],
        "HIGH-RISK DETECTIONS",
        Line::from(Span::styled(
            analysis.high_risk_count.to_string(),
            Style::default().fg(app.theme.alert).add_modifier(Modifier::BOLD),
        )),
        Line::from("Total elevated risk flags"),
    );

    render_card(
        frame,
        app,
        columns[2],
        "TOTAL ASSESSMENTS",
        Line::from(Span::styled(
            analysis.total_records.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Verified longitudinal scans"),
    );
}

fn render_card(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: &str,
    value: Line<'_>,
    caption: Line<'_>,
) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let lines = vec![
        Line::from(""),
        value,
        caption.style(Style::default().add_modifier(Modifier::DIM)),
    ];
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_chart(frame: &mut Frame, app: &App, data: &VitalsData, area: Rect) {
    let period = data
        .period()
        .map(|(from, to)| format!("{} - {}", from, to))
        .unwrap_or_default();
    let title = format!(
        " Heart Rate Propagation • DATASET: {} • PERIOD: {} ",
        DATASET, period
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let series = data.heart_rate_series();
    let width = inner.width.saturating_sub(2) as usize;
    let mut lines = Vec::new();

    if series.len() < 2 {
        lines.push(Line::from(Span::styled(
            " Not enough readings to chart",
            Style::default().add_modifier(Modifier::DIM),
        )));
    } else {
        let (min, max) = series
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled(
                render_sparkline(&normalize_sparkline(&series), width),
                Style::default().fg(app.theme.highlight),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!(
                " {} readings, {:.0}–{:.0} BPM",
                series.len(),
                min,
                max
            ),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    let refreshes = app.history.mean_sparkline();
    if !refreshes.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(" Mean across refreshes ", Style::default().add_modifier(Modifier::DIM)),
            Span::raw(render_sparkline(&refreshes, width.saturating_sub(23))),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render levels as sparkline characters, keeping the most recent values
/// that fit in `width`.
fn render_sparkline(levels: &[u8], width: usize) -> String {
    let skip = levels.len().saturating_sub(width);
    levels[skip..]
        .iter()
        .map(|&v| SPARKLINE_CHARS[v.min(7) as usize])
        .collect()
}

fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
    render_centered(
        frame,
        app,
        area,
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "Initializing Health Analytics...",
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ],
        app.theme.border,
    );
}

fn render_connection_error(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Connection Interrupted",
            Style::default().fg(app.theme.alert).add_modifier(Modifier::BOLD),
        )),
        Line::from("Unable to synchronize with medical records."),
    ];
    if let Some(ref err) = app.load_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    render_centered(frame, app, area, lines, app.theme.alert);
}

fn render_empty(frame: &mut Frame, app: &App, area: Rect) {
    render_centered(
        frame,
        app,
        area,
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "No Records Found",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Perform an AI analysis to begin tracking trends.",
                Style::default().add_modifier(Modifier::DIM),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Run `eye2heart analyze --image <file>` to add one.",
                Style::default().fg(app.theme.muted),
            )),
        ],
        app.theme.border,
    );
}

fn render_centered(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    lines: Vec<Line<'_>>,
    border: ratatui::style::Color,
) {
    let block = Block::default()
        .title(" Vitals Trends ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(border));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_sparkline_keeps_latest() {
        assert_eq!(render_sparkline(&[0, 3, 7], 8), "▁▄█");
        assert_eq!(render_sparkline(&[0, 3, 7], 2), "▄█");
        assert_eq!(render_sparkline(&[], 4), "");
    }
}
