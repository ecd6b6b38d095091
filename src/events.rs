use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Trends),
        KeyCode::Char('2') => app.set_view(View::History),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),

        // History navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Char('r') => app.force_refresh(),

        KeyCode::Char('?') => app.toggle_help(),

        // Sorting and filtering apply to the history table
        KeyCode::Char('s') if app.current_view == View::History => app.cycle_sort(),
        KeyCode::Char('S') if app.current_view == View::History => app.toggle_sort_direction(),
        KeyCode::Char('/') => {
            app.set_view(View::History);
            app.start_filter();
        }
        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char('e') => {
            let export_path = app.export_path.clone();
            match app.export_report(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Report exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.filter_active = false;
        }

        // Keep text but exit input mode
        KeyCode::Esc => {
            app.cancel_filter();
        }

        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }

        KeyCode::Char(c) => {
            app.filter_push(c);
        }

        _ => {}
    }
}

/// Handle mouse events
///
/// `content_start_row` is the first screen row of the view area.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Table border and header row come before the first record
            if app.current_view == View::History && clicked_row > content_start_row + 1 {
                let item_row = (clicked_row - content_start_row - 2) as usize;
                if item_row < app.visible_rows().len() {
                    app.selected_index = item_row;
                }
            }

            // Tab bar sits on row 1, after the header
            if clicked_row == 1 {
                // " 1:Trends " spans columns 0-9, " 2:History " follows the divider
                if mouse.column < 11 {
                    app.set_view(View::Trends);
                } else if mouse.column < 23 {
                    app.set_view(View::History);
                }
            }
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TrendPolicy;
    use crate::source::ChannelSource;
    use crate::ui::Theme;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use eye2heart_types::VitalRecord;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app() -> App {
        let (tx, source) = ChannelSource::create("test");
        let records = (0..5)
            .map(|i| {
                VitalRecord::builder()
                    .image_name(format!("scan_{}.png", i))
                    .heart_rate(70.0 + i as f64)
                    .risk_level("Low")
                    .build()
            })
            .collect();
        tx.send(Some(records)).unwrap();
        let mut app = App::with_theme(Box::new(source), TrendPolicy::default(), Theme::dark());
        app.reload_data().unwrap();
        app
    }

    #[test]
    fn test_view_keys() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('2')));
        assert_eq!(app.current_view, View::History);
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_view, View::Trends);
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn test_filter_input() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        assert!(app.filter_active);
        assert_eq!(app.current_view, View::History);

        for c in "scan_3".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(!app.filter_active);
        assert_eq!(app.visible_rows().len(), 1);

        handle_key_event(&mut app, key(KeyCode::Char('c')));
        assert_eq!(app.visible_rows().len(), 5);
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::PageDown));
        assert_eq!(app.selected_index, 4);
        handle_key_event(&mut app, key(KeyCode::Home));
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_sort_only_in_history() {
        let mut app = app();
        let before = app.sort_column;
        handle_key_event(&mut app, key(KeyCode::Char('s')));
        assert_eq!(app.sort_column, before);

        app.set_view(View::History);
        handle_key_event(&mut app, key(KeyCode::Char('s')));
        assert_ne!(app.sort_column, before);
    }

    #[test]
    fn test_export_without_data_sets_message() {
        let (_tx, source) = ChannelSource::create("test");
        let mut app = App::with_theme(Box::new(source), TrendPolicy::default(), Theme::dark());
        handle_key_event(&mut app, key(KeyCode::Char('e')));
        assert!(app.get_status_message().unwrap().starts_with("Export failed"));
    }
}
