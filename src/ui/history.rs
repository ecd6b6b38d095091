//! Detailed diagnostic history view.
//!
//! One row per record, sortable and filterable.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::VitalRow;

/// Width of the confidence bar, in cells.
const ACCURACY_BAR_WIDTH: usize = 10;

/// Column to sort the history table by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Order the records were returned in.
    #[default]
    Order,
    Timestamp,
    Source,
    HeartRate,
    Risk,
    Confidence,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Order => SortColumn::Timestamp,
            SortColumn::Timestamp => SortColumn::Source,
            SortColumn::Source => SortColumn::HeartRate,
            SortColumn::HeartRate => SortColumn::Risk,
            SortColumn::Risk => SortColumn::Confidence,
            SortColumn::Confidence => SortColumn::Order,
        }
    }

    fn label(self) -> &'static str {
        match self {
            SortColumn::Order => "order",
            SortColumn::Timestamp => "time",
            SortColumn::Source => "source",
            SortColumn::HeartRate => "bpm",
            SortColumn::Risk => "risk",
            SortColumn::Confidence => "accuracy",
        }
    }
}

/// Render the history table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    if data.is_empty() {
        render_no_records(frame, app, area);
        return;
    }

    let rows = app.visible_rows();

    let header = Row::new(vec![
        Cell::from(format_header("Timestamp", SortColumn::Timestamp, app)),
        Cell::from(format_header("Assessment ID / Source", SortColumn::Source, app)),
        Cell::from(format_header("Metric (BPM)", SortColumn::HeartRate, app)),
        Cell::from(format_header("Risk Status", SortColumn::Risk, app)),
        Cell::from(format_header("AI Accuracy", SortColumn::Confidence, app)),
    ])
    .height(1)
    .style(app.theme.header);

    let table_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            let bpm_cell = match row.range {
                Some(range) if range != crate::data::BpmRange::Within => {
                    format!("{} {}", row.heart_rate, range.symbol())
                }
                _ => row.heart_rate.clone(),
            };

            Row::new(vec![
                Cell::from(row.date_time.clone()),
                Cell::from(row.scan_label.clone())
                    .style(Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM)),
                Cell::from(bpm_cell).style(
                    app.theme
                        .range_style(row.range)
                        .add_modifier(Modifier::BOLD),
                ),
                Cell::from(row.risk_text.to_uppercase()).style(app.theme.risk_style(row.risk)),
                Cell::from(accuracy_bar(row.confidence)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(24),
        Constraint::Fill(3),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(ACCURACY_BAR_WIDTH as u16 + 9),
    ];

    let selected = app.selected_index.min(rows.len().saturating_sub(1));
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !rows.is_empty() {
        format!(" [{}/{}]", selected + 1, rows.len())
    } else {
        String::new()
    };

    let title = format!(
        " Detailed Diagnostic History ({}/{}) [s:sort {}{}]{}{} ",
        rows.len(),
        data.rows.len(),
        app.sort_column.label(),
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(table_rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_no_records(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Detailed Diagnostic History ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let lines = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "    No assessments recorded yet.",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Confidence as a filled bar plus percentage, e.g. `████████░░ 82%`.
fn accuracy_bar(confidence: Option<f64>) -> String {
    let Some(pct) = confidence else {
        return "-".to_string();
    };
    let clamped = pct.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * ACCURACY_BAR_WIDTH as f64).round() as usize;
    format!(
        "{}{} {}%",
        "█".repeat(filled),
        "░".repeat(ACCURACY_BAR_WIDTH - filled),
        format_percent(pct)
    )
}

fn format_percent(pct: f64) -> String {
    if pct.fract() == 0.0 {
        format!("{:.0}", pct)
    } else {
        format!("{:.1}", pct)
    }
}

/// Sort rows by the given column and direction.
///
/// Missing values sort before present ones. Ties fall back to the original
/// record order.
pub fn sort_rows_by(rows: &mut [&VitalRow], column: SortColumn, ascending: bool) {
    rows.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Order => a.index.cmp(&b.index),
            SortColumn::Timestamp => a.timestamp.cmp(&b.timestamp),
            SortColumn::Source => a.scan_label.to_lowercase().cmp(&b.scan_label.to_lowercase()),
            SortColumn::HeartRate => cmp_optional(a.bpm, b.bpm),
            SortColumn::Risk => a.risk.cmp(&b.risk),
            SortColumn::Confidence => cmp_optional(a.confidence, b.confidence),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        if primary == Ordering::Equal {
            a.index.cmp(&b.index)
        } else {
            primary
        }
    });
}

fn cmp_optional(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{TrendPolicy, VitalsData};
    use eye2heart_types::VitalRecord;

    fn sample() -> VitalsData {
        let records = vec![
            VitalRecord::builder()
                .image_name("b.png")
                .heart_rate(90.0)
                .risk_level("High")
                .confidence(70.0)
                .created_at("2024-03-02 09:00:00")
                .build(),
            VitalRecord::builder()
                .image_name("a.png")
                .heart_rate("bad")
                .risk_level("Low")
                .created_at("2024-03-01 09:00:00")
                .build(),
            VitalRecord::builder()
                .image_name("c.png")
                .heart_rate(65.0)
                .risk_level("Medium")
                .confidence(95.5)
                .created_at("2024-03-03 09:00:00")
                .build(),
        ];
        VitalsData::from_records(records, &TrendPolicy::default())
    }

    fn labels(rows: &[&VitalRow]) -> Vec<String> {
        rows.iter().map(|r| r.scan_label.clone()).collect()
    }

    #[test]
    fn test_sort_column_cycles() {
        let mut col = SortColumn::default();
        for _ in 0..6 {
            col = col.next();
        }
        assert_eq!(col, SortColumn::Order);
    }

    #[test]
    fn test_sort_by_heart_rate() {
        let data = sample();
        let mut rows: Vec<&VitalRow> = data.rows.iter().collect();

        sort_rows_by(&mut rows, SortColumn::HeartRate, true);
        assert_eq!(labels(&rows), ["a.png", "c.png", "b.png"]);

        sort_rows_by(&mut rows, SortColumn::HeartRate, false);
        assert_eq!(labels(&rows), ["b.png", "c.png", "a.png"]);
    }

    #[test]
    fn test_sort_by_timestamp_and_source() {
        let data = sample();
        let mut rows: Vec<&VitalRow> = data.rows.iter().collect();

        sort_rows_by(&mut rows, SortColumn::Timestamp, true);
        assert_eq!(labels(&rows), ["a.png", "b.png", "c.png"]);

        sort_rows_by(&mut rows, SortColumn::Order, true);
        assert_eq!(labels(&rows), ["b.png", "a.png", "c.png"]);
    }

    #[test]
    fn test_accuracy_bar() {
        assert_eq!(accuracy_bar(None), "-");
        assert_eq!(accuracy_bar(Some(100.0)), "██████████ 100%");
        assert_eq!(accuracy_bar(Some(95.5)), "██████████ 95.5%");
        assert_eq!(accuracy_bar(Some(0.0)), "░░░░░░░░░░ 0%");
    }
}
