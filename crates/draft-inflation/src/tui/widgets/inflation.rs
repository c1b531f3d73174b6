// Inflation tab: overall, positional and tiered inflation tables.
//
// With filters active the statistics are re-aggregated over the visible
// picks only, so the tables always describe what the ticker would show.
// Unfiltered, the backend's own figures sit in a Srv% column next to the
// local ones.

use std::borrow::Cow;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use super::{format_doe, format_money, format_opt_pct, format_pct, header_style, severity_color};
use crate::tui::ViewState;
use crate::valuation::inflation::{
    aggregate, doe_severity, inflation_severity, AnnotatedPick, InflationReport, ServerInflation,
};

/// Render the inflation tab into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(dashboard) = &state.dashboard else {
        let placeholder = Paragraph::new("  Waiting for draft data...")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Inflation"));
        frame.render_widget(placeholder, area);
        return;
    };

    let filtered = state.filter.is_active();
    let report: Cow<'_, InflationReport> = if filtered {
        let visible: Vec<AnnotatedPick> = state.visible_picks().into_iter().cloned().collect();
        Cow::Owned(aggregate(&visible))
    } else {
        Cow::Borrowed(&dashboard.report)
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let server = dashboard.server.as_ref().filter(|_| !filtered);
    render_overall(frame, chunks[0], &report, server, filtered);
    render_positional(frame, columns[0], &report, server);
    render_tiered(frame, columns[1], &report, server);
}

fn server_cell(pct: Option<f64>) -> Cell<'static> {
    let color = match pct {
        Some(p) => severity_color(inflation_severity(p)),
        None => Color::DarkGray,
    };
    Cell::from(format_opt_pct(pct)).style(Style::default().fg(color))
}

fn render_overall(
    frame: &mut Frame,
    area: Rect,
    report: &InflationReport,
    server: Option<&ServerInflation>,
    filtered: bool,
) {
    let color = severity_color(inflation_severity(report.overall_inflation));
    let mut headline = vec![
        Span::raw(" Overall inflation: "),
        Span::styled(
            format_pct(report.overall_inflation),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(server) = server.and_then(|s| s.overall) {
        headline.push(Span::styled(
            format!("  (server {})", format_pct(server)),
            Style::default().fg(Color::Gray),
        ));
    }

    let totals = Line::from(format!(
        " {} picks | spent {} | expected {} | {} unmatched",
        report.total_picks,
        format_money(report.total_actual_cost),
        format_money(report.total_expected_cost),
        report.unmatched.len(),
    ));

    let title = if filtered { "Overall (filtered)" } else { "Overall" };
    let paragraph = Paragraph::new(vec![Line::from(headline), totals])
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);
}

fn render_positional(
    frame: &mut Frame,
    area: Rect,
    report: &InflationReport,
    server: Option<&ServerInflation>,
) {
    let mut titles = vec!["Pos", "Picks", "Spent", "DOE", "Infl%"];
    if server.is_some() {
        titles.push("Srv%");
    }
    let header = Row::new(titles).style(header_style());

    let rows: Vec<Row> = report
        .positions
        .iter()
        .map(|(position, stat)| {
            let doe = (stat.priced_picks > 0).then_some(stat.doe);
            let mut cells = vec![
                Cell::from(position.display_str().to_string()),
                Cell::from(stat.picks.to_string()),
                Cell::from(format_money(stat.total_spent)),
                Cell::from(format_doe(doe))
                    .style(Style::default().fg(severity_color(doe_severity(doe)))),
                Cell::from(format_pct(stat.inflation))
                    .style(Style::default().fg(severity_color(inflation_severity(stat.inflation)))),
            ];
            if let Some(server) = server {
                cells.push(server_cell(server.position_inflation(position)));
            }
            Row::new(cells)
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Min(6),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("By Position"));
    frame.render_widget(table, area);
}

fn render_tiered(
    frame: &mut Frame,
    area: Rect,
    report: &InflationReport,
    server: Option<&ServerInflation>,
) {
    let mut titles = vec!["Pos", "Tier", "Picks", "Avg $", "DOE", "Infl%"];
    if server.is_some() {
        titles.push("Srv%");
    }
    let header = Row::new(titles).style(header_style());

    let rows: Vec<Row> = report
        .tiers
        .iter()
        .flat_map(|(position, tiers)| {
            tiers.iter().map(move |(tier, stat)| {
                let doe = (stat.expected_cost > 0.0).then_some(stat.doe);
                let mut cells = vec![
                    Cell::from(position.display_str().to_string()),
                    Cell::from(tier.label()),
                    Cell::from(stat.picks.to_string()),
                    Cell::from(format_money(stat.avg_cost)),
                    Cell::from(format_doe(doe))
                        .style(Style::default().fg(severity_color(doe_severity(doe)))),
                    Cell::from(format_pct(stat.inflation)).style(
                        Style::default().fg(severity_color(inflation_severity(stat.inflation))),
                    ),
                ];
                if let Some(server) = server {
                    cells.push(server_cell(server.tier_inflation(position, tier)));
                }
                Row::new(cells)
            })
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title("By Tier");
    if rows.is_empty() {
        let placeholder = Paragraph::new("  No picks yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let widths = [
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Min(6),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::pick::Position;
    use crate::tui::tests::populated_state;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn rendered_text(state: &ViewState) -> String {
        let backend = TestBackend::new(100, 24);
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
    fn placeholder_without_data() {
        let text = rendered_text(&ViewState::default());
        assert!(text.contains("Waiting for draft data"));
    }

    #[test]
    fn shows_overall_and_server_figure() {
        let state = populated_state();
        let text = rendered_text(&state);
        assert!(text.contains("Overall inflation:"));
        assert!(text.contains("(server +7.5%)"));
        assert!(text.contains("By Position"));
        assert!(text.contains("By Tier"));
    }

    #[test]
    fn server_column_sits_next_to_local_figures() {
        let state = populated_state();
        let text = rendered_text(&state);
        assert!(text.contains("Srv%"));
        // RB: backend +11.1% against the local average of +13.5%
        assert!(text.contains("+11.1%"));
        assert!(text.contains("+13.5%"));
        // RB tier 1 from the backend; positions it omits read N/A
        assert!(text.contains("-4.4%"));
        assert!(text.contains("N/A"));
    }

    #[test]
    fn server_column_hidden_without_feed() {
        let mut state = populated_state();
        if let Some(dashboard) = state.dashboard.as_mut() {
            dashboard.server = None;
        }
        let text = rendered_text(&state);
        assert!(!text.contains("Srv%"));
        assert!(!text.contains("(server"));
    }

    #[test]
    fn filtered_view_reaggregates_visible_picks() {
        let mut state = populated_state();
        state.filter.toggle_position(Position::QB);
        let text = rendered_text(&state);
        assert!(text.contains("Overall (filtered)"));
        // Josh Allen: $30 against $25 expected
        assert!(text.contains("+20.0%"));
        assert!(text.contains(" 1 picks"));
        assert!(!text.contains("(server"));
        assert!(!text.contains("Srv%"));
    }
}
