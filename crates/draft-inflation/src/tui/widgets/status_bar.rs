// Status bar widget: fetch status, draft id, live flag, last update.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::FetchStatus;
use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [status dot] [draft id] [LIVE/PAUSED] [updated HH:MM:SS] [message]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = Vec::new();

    let (dot, dot_color) = status_indicator(&state.status);
    spans.push(Span::styled(format!(" {} ", dot), Style::default().fg(dot_color)));

    let draft_label = if state.draft_id.is_empty() {
        "no draft".to_string()
    } else {
        format!("Draft {}", state.draft_id)
    };
    spans.push(Span::styled(draft_label, Style::default().fg(Color::White)));
    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));

    let (live_label, live_color) = if state.is_live {
        ("LIVE", Color::Green)
    } else {
        ("PAUSED", Color::Yellow)
    };
    spans.push(Span::styled(
        live_label,
        Style::default().fg(live_color).add_modifier(Modifier::BOLD),
    ));

    if let Some(dashboard) = &state.dashboard {
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        let source = if dashboard.from_cache { " (cached)" } else { "" };
        spans.push(Span::styled(
            format!(
                "Updated {}{}",
                dashboard.fetched_at.format("%H:%M:%S"),
                source
            ),
            Style::default().fg(Color::Gray),
        ));
        if !dashboard.report.unmatched.is_empty() {
            spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
            spans.push(Span::styled(
                format!("{} unmatched", dashboard.report.unmatched.len()),
                Style::default().fg(Color::Yellow),
            ));
        }
    }

    if let Some(message) = status_message(&state.status) {
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(message, Style::default().fg(Color::Red)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Return the status dot character and its color.
pub fn status_indicator(status: &FetchStatus) -> (&'static str, Color) {
    match status {
        FetchStatus::Idle => ("○", Color::Gray),
        FetchStatus::Loading => ("◌", Color::Yellow),
        FetchStatus::Ready => ("●", Color::Green),
        FetchStatus::Error(_) => ("●", Color::Red),
    }
}

fn status_message(status: &FetchStatus) -> Option<String> {
    match status {
        FetchStatus::Error(message) => Some(format!("Error: {}", message)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::populated_state;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn rendered_text(state: &ViewState) -> String {
        let backend = TestBackend::new(120, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), state))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn indicator_colors() {
        assert_eq!(status_indicator(&FetchStatus::Ready).1, Color::Green);
        assert_eq!(status_indicator(&FetchStatus::Loading).1, Color::Yellow);
        assert_eq!(
            status_indicator(&FetchStatus::Error("x".into())).1,
            Color::Red
        );
    }

    #[test]
    fn shows_draft_and_live_flag() {
        let state = populated_state();
        let text = rendered_text(&state);
        assert!(text.contains("Draft 1122334455"));
        assert!(text.contains("LIVE"));
        assert!(text.contains("Updated"));
        assert!(text.contains("1 unmatched"));
    }

    #[test]
    fn shows_error_message_and_placeholder() {
        let mut state = ViewState::default();
        state.status = FetchStatus::Error("timed out".into());
        let text = rendered_text(&state);
        assert!(text.contains("no draft"));
        assert!(text.contains("PAUSED"));
        assert!(text.contains("Error: timed out"));
    }
}
