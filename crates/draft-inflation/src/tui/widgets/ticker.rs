// Ticker tab: most recent picks, newest first, with valuation columns.
//
// Collapsed shows the latest few picks; expanded (`m`) lists every visible
// pick and follows the scroll offset.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use super::{
    format_doe, format_money, format_opt_money, format_opt_pct, header_style, severity_color,
};
use crate::tui::ViewState;
use crate::valuation::inflation::{doe_severity, inflation_severity, AnnotatedPick, Severity};

/// Rows shown while the ticker is collapsed.
pub const COLLAPSED_ROWS: usize = 5;

/// Render the pick ticker into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let visible = state.visible_picks();
    let total = visible.len();

    let header = Row::new(vec![
        "#", "Player", "Pos", "Team", "Price", "Exp", "DOE", "Infl%", "Tier",
    ])
    .style(header_style());

    let limit = if state.ticker_expanded {
        usize::MAX
    } else {
        COLLAPSED_ROWS
    };
    let rows: Vec<Row> = if visible.is_empty() {
        let message = if state.dashboard.is_some() {
            "No matching picks"
        } else {
            "No picks yet"
        };
        vec![Row::new(vec![Cell::from(""), Cell::from(message)])]
    } else {
        visible
            .into_iter()
            .skip(state.scroll_offset)
            .take(limit)
            .map(pick_row)
            .collect()
    };

    let title = if state.ticker_expanded {
        format!("Ticker (all {})", total)
    } else {
        format!("Ticker (latest {} of {})", total.min(COLLAPSED_ROWS), total)
    };

    let widths = [
        Constraint::Length(4),
        Constraint::Min(18),
        Constraint::Length(4),
        Constraint::Length(14),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(4),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

fn pick_row(annotated: &AnnotatedPick) -> Row<'static> {
    let pick = &annotated.pick;
    Row::new(vec![
        Cell::from(pick.pick_no.to_string()),
        Cell::from(pick.player_name.clone()),
        Cell::from(pick.position.display_str().to_string()),
        Cell::from(annotated.team_name.clone()),
        Cell::from(format_money(pick.price_f64())),
        Cell::from(format_opt_money(annotated.expected_price)),
        Cell::from(format_doe(annotated.doe))
            .style(Style::default().fg(severity_color(doe_severity(annotated.doe)))),
        Cell::from(format_opt_pct(annotated.inflation)).style(
            Style::default().fg(severity_color(
                annotated
                    .inflation
                    .map(inflation_severity)
                    .unwrap_or(Severity::Neutral),
            )),
        ),
        Cell::from(annotated.tier.label()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::populated_state;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn rendered_lines(state: &ViewState, height: u16) -> Vec<String> {
        let width = 100;
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), state))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn collapsed_shows_latest_five() {
        let state = populated_state();
        let lines = rendered_lines(&state, 20);
        let text = lines.join("\n");
        assert!(text.contains("Ticker (latest 5 of 7)"));
        assert!(text.contains("Unknown Guy"));
        assert!(text.contains("Josh Allen"));
        assert!(!text.contains("Bijan Robinson"));
        // Newest pick is the first data row
        assert!(lines[2].contains("Unknown Guy"));
    }

    #[test]
    fn expanded_shows_everything() {
        let mut state = populated_state();
        state.ticker_expanded = true;
        let text = rendered_lines(&state, 20).join("\n");
        assert!(text.contains("Ticker (all 7)"));
        assert!(text.contains("Bijan Robinson"));
    }

    #[test]
    fn expanded_respects_scroll_offset() {
        let mut state = populated_state();
        state.ticker_expanded = true;
        state.scroll_offset = 6;
        let lines = rendered_lines(&state, 20);
        assert!(lines[2].contains("Bijan Robinson"));
    }

    #[test]
    fn unmatched_pick_shows_placeholders() {
        let state = populated_state();
        let lines = rendered_lines(&state, 20);
        assert!(lines[2].contains("N/A"));
    }

    #[test]
    fn empty_filter_result_message() {
        let mut state = populated_state();
        state.filter.player_text = "zzz".into();
        let text = rendered_lines(&state, 10).join("\n");
        assert!(text.contains("No matching picks"));
    }
}
