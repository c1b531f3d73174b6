// Filter bar and filter panel.
//
// The bar is a single row summarizing active filters, or echoing the text
// being typed into the search or draft-id prompt. The panel is a popup over
// the main area for editing set and range filters.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::quit_confirm::centered_rect;
use crate::filter::{FilterState, NumericRange};
use crate::tui::{FilterField, ViewState};

const PANEL_WIDTH: u16 = 72;
const PANEL_HEIGHT: u16 = 10;

/// Render the one-row filter bar.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = if let Some(prompt) = &state.draft_prompt {
        prompt_line("Draft id: ", prompt)
    } else if state.filter_mode {
        prompt_line("Search: ", &state.filter.player_text)
    } else {
        let total = state.dashboard.as_ref().map(|d| d.picks.len()).unwrap_or(0);
        let shown = state.visible_picks().len();
        let summary = summarize(&state.filter);
        let color = if state.filter.is_active() {
            Color::Yellow
        } else {
            Color::Gray
        };
        Line::from(vec![
            Span::styled(format!(" Filters: {}", summary), Style::default().fg(color)),
            Span::styled(
                format!("  ({} of {} picks)", shown, total),
                Style::default().fg(Color::Gray),
            ),
        ])
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn prompt_line<'a>(label: &'a str, text: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!(" {}", label),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(text),
        Span::styled("█", Style::default().fg(Color::White)),
    ])
}

/// Describe the active filters, or `none`.
pub fn summarize(filter: &FilterState) -> String {
    let mut parts = Vec::new();
    if !filter.teams.is_empty() {
        let teams: Vec<&str> = filter.teams.iter().map(String::as_str).collect();
        parts.push(format!("team={}", teams.join(",")));
    }
    if !filter.positions.is_empty() {
        let positions: Vec<&str> = filter.positions.iter().map(|p| p.display_str()).collect();
        parts.push(format!("pos={}", positions.join(",")));
    }
    if !filter.tiers.is_empty() {
        let tiers: Vec<String> = filter.tiers.iter().map(|t| t.label()).collect();
        parts.push(format!("tier={}", tiers.join(",")));
    }
    for (name, range) in [
        ("price", &filter.price),
        ("exp", &filter.expected_price),
        ("infl%", &filter.inflation),
    ] {
        if range.is_active() {
            parts.push(format!("{} {}", name, range_text(range)));
        }
    }
    let text = filter.player_text.trim();
    if !text.is_empty() {
        parts.push(format!("\"{}\"", text));
    }

    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(" | ")
    }
}

fn range_text(range: &NumericRange) -> String {
    format!("{:.0}..{:.0}", range.min, range.max)
}

/// Render the filter panel popup over the given area.
pub fn render_panel(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(panel) = &state.filter_panel else {
        return;
    };
    let popup = centered_rect(PANEL_WIDTH, PANEL_HEIGHT, area);
    frame.render_widget(Clear, popup);

    let lines: Vec<Line> = FilterField::ALL
        .iter()
        .map(|field| {
            let focused = *field == panel.field;
            let label_style = if focused {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan)
            };
            let mut spans = vec![Span::styled(format!(" {:<12}", field.label()), label_style)];
            spans.push(Span::raw(" "));
            spans.extend(field_spans(state, *field, focused.then_some(panel.cursor)));
            Line::from(spans)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Filters ");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, popup);
}

/// Option chips for a set field, or the bounds of a range field. `cursor` is
/// set only on the focused field.
fn field_spans(state: &ViewState, field: FilterField, cursor: Option<usize>) -> Vec<Span<'static>> {
    let filter = &state.filter;
    let options: Vec<(String, bool)> = match field {
        FilterField::Teams => state
            .team_options()
            .into_iter()
            .map(|t| {
                let on = filter.teams.contains(&t);
                (t, on)
            })
            .collect(),
        FilterField::Positions => state
            .position_options()
            .into_iter()
            .map(|p| (p.display_str().to_string(), filter.positions.contains(&p)))
            .collect(),
        FilterField::Tiers => state
            .tier_options()
            .into_iter()
            .map(|t| (t.label(), filter.tiers.contains(&t)))
            .collect(),
        FilterField::Price => return range_spans(&filter.price),
        FilterField::ExpectedPrice => return range_spans(&filter.expected_price),
        FilterField::Inflation => return range_spans(&filter.inflation),
    };

    if options.is_empty() {
        return vec![Span::styled("(none yet)", Style::default().fg(Color::DarkGray))];
    }

    options
        .into_iter()
        .enumerate()
        .map(|(idx, (label, on))| {
            let mark = if on { "[x]" } else { "[ ]" };
            let mut style = if on {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            if cursor == Some(idx) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Span::styled(format!("{}{} ", mark, label), style)
        })
        .collect()
}

fn range_spans(range: &NumericRange) -> Vec<Span<'static>> {
    let style = if range.is_active() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let mut spans = vec![Span::styled(range_text(range), style)];
    if !range.is_active() {
        spans.push(Span::styled(" (any)", Style::default().fg(Color::DarkGray)));
    }
    spans
}
