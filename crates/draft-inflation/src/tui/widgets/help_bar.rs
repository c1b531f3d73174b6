// Help bar widget: context-sensitive keyboard hints.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = Vec::new();
    for (key, action) in hints(state) {
        spans.push(Span::styled(format!(" {}", key), Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(format!(":{} ", action), Style::default().fg(Color::Gray)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Key hints for the current input mode.
pub fn hints(state: &ViewState) -> &'static [(&'static str, &'static str)] {
    if state.confirm_quit {
        &[("y", "quit"), ("n", "cancel")]
    } else if state.draft_prompt.is_some() {
        &[("Enter", "load draft"), ("Esc", "cancel")]
    } else if state.filter_mode {
        &[("Enter", "apply"), ("Esc", "clear")]
    } else if state.filter_panel.is_some() {
        &[
            ("↑↓", "field"),
            ("←→", "move/min"),
            ("H/L", "max"),
            ("Space", "toggle"),
            ("x", "reset"),
            ("Esc", "close"),
        ]
    } else {
        &[
            ("1-4", "tabs"),
            ("↑↓", "scroll"),
            ("/", "search"),
            ("f", "filters"),
            ("x", "reset"),
            ("m", "more"),
            ("d", "draft"),
            ("L", "live"),
            ("r", "refresh"),
            ("q", "quit"),
        ]
    }
}
