// Teams tab: league summary with budget gauges, plus the selected team's
// roster.
//
// The selected team follows the scroll offset (Up/Down on this tab).

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use super::{format_money, header_style};
use crate::draft::team::{budget_gauge, NeedLevel, RosterPlayer, TeamBreakdown};
use crate::tui::ViewState;

/// Render the teams overview into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let teams: &[TeamBreakdown] = state
        .dashboard
        .as_ref()
        .map(|d| d.teams.as_slice())
        .unwrap_or(&[]);

    if teams.is_empty() {
        let placeholder = Paragraph::new("  No team data available")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Teams"));
        frame.render_widget(placeholder, area);
        return;
    }

    let selected = state.scroll_offset.min(teams.len() - 1);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_summary(frame, columns[0], teams, selected);
    render_roster(frame, columns[1], &teams[selected]);
}

fn render_summary(frame: &mut Frame, area: Rect, teams: &[TeamBreakdown], selected: usize) {
    let header = Row::new(vec!["Team", "Spent", "Left", "Budget", "Strong", "Needs"])
        .style(header_style());

    let rows: Vec<Row> = teams
        .iter()
        .enumerate()
        .map(|(idx, team)| {
            let style = if idx == selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(team.team_name.clone()),
                Cell::from(format_money(team.total_spend)),
                Cell::from(format_money(team.remaining_budget)),
                Cell::from(gauge_string(team.remaining_budget))
                    .style(Style::default().fg(Color::Cyan)),
                Cell::from(positions_at(team, NeedLevel::Strength)),
                Cell::from(positions_at(team, NeedLevel::Need)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(12),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(12),
        Constraint::Length(12),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Teams"));
    frame.render_widget(table, area);
}

fn render_roster(frame: &mut Frame, area: Rect, team: &TeamBreakdown) {
    let header = Row::new(vec!["Slot", "Player", "$"]).style(header_style());

    let mut rows: Vec<Row> = team
        .starters
        .iter()
        .map(|slot| roster_row(slot.label.clone(), slot.player.as_ref()))
        .collect();
    rows.extend(
        team.bench
            .iter()
            .map(|player| roster_row("BN".to_string(), player.as_ref())),
    );

    let widths = [
        Constraint::Length(5),
        Constraint::Min(12),
        Constraint::Length(5),
    ];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("{} roster", team.team_name)),
    );
    frame.render_widget(table, area);
}

fn roster_row(label: String, player: Option<&RosterPlayer>) -> Row<'static> {
    match player {
        Some(p) => Row::new(vec![
            Cell::from(label),
            Cell::from(p.name.clone()),
            Cell::from(format_money(p.amount)),
        ]),
        None => Row::new(vec![
            Cell::from(label),
            Cell::from("-").style(Style::default().fg(Color::DarkGray)),
            Cell::from(""),
        ]),
    }
}

/// Five-cell gauge of remaining budget, e.g. `■■■□□`.
pub fn gauge_string(remaining: f64) -> String {
    let (filled, empty) = budget_gauge(remaining);
    format!("{}{}", "■".repeat(filled), "□".repeat(empty))
}

/// Comma-separated positions at the given need level, in display order.
fn positions_at(team: &TeamBreakdown, level: NeedLevel) -> String {
    team.needs
        .iter()
        .filter(|(_, l)| **l == level)
        .map(|(pos, _)| pos.display_str())
        .collect::<Vec<_>>()
        .join(",")
}
