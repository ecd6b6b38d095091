//! Application state and navigation logic.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use crate::data::{History, TrendPolicy, VitalRow, VitalsData};
use crate::source::DataSource;
use crate::ui::history::SortColumn;
use crate::ui::Theme;

/// Default file written by the export key.
pub const DEFAULT_EXPORT_PATH: &str = "vitals_report.json";

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Insight bar, summary cards and heart-rate sparkline.
    Trends,
    /// Detailed diagnostic history table.
    History,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Trends => View::History,
            View::History => View::Trends,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        // Only two views, so previous and next coincide
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Trends => "Trends",
            View::History => "History",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub policy: TrendPolicy,
    pub data: Option<VitalsData>,
    pub history: History,
    pub load_error: Option<String>,
    /// Set once the source reports the session was rejected.
    pub session_expired: bool,

    // Navigation state (History view)
    pub selected_index: usize,

    // Sorting (History view)
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,
    pub export_path: PathBuf,

    // Status message (temporary feedback)
    pub status_message: Option<(String, std::time::Instant)>,
}

impl App {
    /// Create a new App with the given data source and trend policy.
    pub fn new(source: Box<dyn DataSource>, policy: TrendPolicy) -> Self {
        Self::with_theme(source, policy, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme.
    pub fn with_theme(source: Box<dyn DataSource>, policy: TrendPolicy, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Trends,
            show_help: false,
            source,
            policy,
            data: None,
            history: History::new(),
            load_error: None,
            session_expired: false,
            selected_index: 0,
            sort_column: SortColumn::default(),
            sort_ascending: true,
            filter_text: String::new(),
            filter_active: false,
            theme,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// True until the first snapshot arrives or the source reports an error.
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.load_error.is_none()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, std::time::Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Poll the data source for new data.
    ///
    /// Returns Ok(true) if new data was received, Ok(false) if no new data.
    /// Source errors are kept in `load_error`; previously loaded data stays
    /// on screen.
    pub fn reload_data(&mut self) -> Result<bool> {
        let polled = self.source.poll();

        if self.source.is_unauthorized() && !self.session_expired {
            warn!("Session rejected by server");
            self.session_expired = true;
        }
        self.load_error = self.source.error().map(str::to_string);

        let Some(records) = polled else {
            return Ok(false);
        };

        let data = VitalsData::from_records(records, &self.policy);
        debug!(
            records = data.analysis.total_records,
            trend = ?data.analysis.trend.status,
            "New vitals snapshot"
        );

        self.history.record(&data);
        self.data = Some(data);
        self.clamp_selection();
        Ok(true)
    }

    /// Ask the source for fresh data, then poll it.
    pub fn force_refresh(&mut self) {
        self.source.refresh();
        let _ = self.reload_data();
        self.set_status_message("Refreshing...".to_string());
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_row_count();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.visible_row_count().saturating_sub(1);
        self.selected_index = (self.selected_index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_index = self.visible_row_count().saturating_sub(1);
    }

    /// History rows after filtering and sorting, in display order.
    pub fn visible_rows(&self) -> Vec<&VitalRow> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        let mut rows: Vec<&VitalRow> = data.rows.iter().filter(|r| self.matches_filter(r)).collect();
        crate::ui::history::sort_rows_by(&mut rows, self.sort_column, self.sort_ascending);
        rows
    }

    fn visible_row_count(&self) -> usize {
        let Some(ref data) = self.data else {
            return 0;
        };
        if self.filter_text.is_empty() {
            return data.rows.len();
        }
        data.rows.iter().filter(|r| self.matches_filter(r)).count()
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column.
    pub fn cycle_sort(&mut self) {
        self.sort_column = self.sort_column.next();
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        self.sort_ascending = !self.sort_ascending;
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.clamp_selection();
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if a row matches the current filter.
    ///
    /// Matches case-insensitively against the scan label, risk level and
    /// formatted timestamp.
    pub fn matches_filter(&self, row: &VitalRow) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        let search = self.filter_text.to_lowercase();
        [&row.scan_label, &row.risk_text, &row.date_time]
            .iter()
            .any(|field| field.to_lowercase().contains(&search))
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current analysis and records to a JSON report.
    pub fn export_report(&self, path: &Path) -> Result<()> {
        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };
        crate::report::write_report(path, data, self.source.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ChannelSource;
    use eye2heart_types::VitalRecord;
    use tokio::sync::watch;

    #[derive(Debug)]
    struct RejectedSource;

    impl DataSource for RejectedSource {
        fn poll(&mut self) -> Option<Vec<VitalRecord>> {
            None
        }

        fn description(&self) -> &str {
            "rejected"
        }

        fn error(&self) -> Option<&str> {
            Some("Session expired, please log in again")
        }

        fn is_unauthorized(&self) -> bool {
            true
        }
    }

    fn record(name: &str, rate: f64, risk: &str) -> VitalRecord {
        VitalRecord::builder()
            .image_name(name)
            .heart_rate(rate)
            .risk_level(risk)
            .created_at("2024-03-01 09:00:00")
            .build()
    }

    fn app_with(records: Vec<VitalRecord>) -> (watch::Sender<Option<Vec<VitalRecord>>>, App) {
        let (tx, source) = ChannelSource::create("test");
        tx.send(Some(records)).unwrap();
        let mut app = App::with_theme(Box::new(source), TrendPolicy::default(), Theme::dark());
        app.reload_data().unwrap();
        (tx, app)
    }

    #[test]
    fn test_loading_until_first_snapshot() {
        let (_tx, source) = ChannelSource::create("test");
        let mut app = App::with_theme(Box::new(source), TrendPolicy::default(), Theme::dark());
        assert!(app.is_loading());
        assert!(!app.reload_data().unwrap());
        assert!(app.is_loading());
    }

    #[test]
    fn test_reload_builds_analysis() {
        let (_tx, app) = app_with(vec![
            record("a.png", 70.0, "Low"),
            record("b.png", 80.0, "High"),
            record("c.png", 90.0, "High"),
        ]);
        let data = app.data.as_ref().unwrap();
        assert_eq!(data.analysis.mean_heart_rate, 80.0);
        assert_eq!(data.analysis.high_risk_count, 2);
        assert_eq!(app.history.len(), 1);
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn test_rejected_api_session_expires_after_polling_stops() {
        let source = crate::source::ApiSource::spawn_with(
            || async { Err(eye2heart_client::ClientError::Unauthorized) },
            std::time::Duration::from_secs(60),
            "test",
        );
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let mut app = App::with_theme(Box::new(source), TrendPolicy::default(), Theme::dark());
        assert!(!app.reload_data().unwrap());
        assert!(app.session_expired);
        assert!(!app.is_loading());
    }

    #[test]
    fn test_unauthorized_source_marks_session_expired() {
        let mut app = App::with_theme(Box::new(RejectedSource), TrendPolicy::default(), Theme::dark());
        app.reload_data().unwrap();
        assert!(app.session_expired);
        assert!(app.load_error.is_some());
        assert!(!app.is_loading());
    }

    #[test]
    fn test_filter_rows() {
        let (_tx, mut app) = app_with(vec![
            record("left_eye.png", 70.0, "Low"),
            record("right_eye.png", 80.0, "High"),
        ]);
        app.filter_text = "HIGH".to_string();
        let rows = app.visible_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].scan_label, "right_eye.png");

        app.clear_filter();
        assert_eq!(app.visible_rows().len(), 2);
    }

    #[test]
    fn test_selection_bounds() {
        let (_tx, mut app) = app_with(vec![
            record("a.png", 70.0, "Low"),
            record("b.png", 80.0, "Low"),
            record("c.png", 90.0, "Low"),
        ]);
        app.select_next_n(10);
        assert_eq!(app.selected_index, 2);
        app.select_prev_n(10);
        assert_eq!(app.selected_index, 0);
        app.select_last();
        assert_eq!(app.selected_index, 2);

        // Shrinking the filtered list clamps the selection
        app.filter_push('b');
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_view_cycle() {
        let (_tx, mut app) = app_with(Vec::new());
        assert_eq!(app.current_view, View::Trends);
        app.next_view();
        assert_eq!(app.current_view, View::History);
        app.prev_view();
        assert_eq!(app.current_view, View::Trends);
    }

    #[test]
    fn test_export_report() {
        let (_tx, app) = app_with(vec![record("a.png", 70.0, "Low"), record("b.png", 76.0, "Low")]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        app.export_report(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["summary"]["mean_heart_rate"], 73.0);
        assert_eq!(value["records"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_export_without_data_fails() {
        let (_tx, source) = ChannelSource::create("test");
        let app = App::with_theme(Box::new(source), TrendPolicy::default(), Theme::dark());
        assert!(app.export_report(Path::new("unused.json")).is_err());
    }
}
