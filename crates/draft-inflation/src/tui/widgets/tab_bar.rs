// Tab bar widget: numbered tab labels with the active tab highlighted.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::TabId;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(tab_spans(state.active_tab)))
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Build tab indicator spans, e.g. "[1:Inflation] [2:Ticker] [3:Teams] [4:Scatter]".
pub fn tab_spans(active: TabId) -> Vec<Span<'static>> {
    let mut spans = vec![Span::raw(" ")];
    for (idx, tab) in TabId::ALL.iter().enumerate() {
        let style = if *tab == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}:{}]", idx + 1, tab.label()), style));
        spans.push(Span::raw(" "));
    }
    spans
}
