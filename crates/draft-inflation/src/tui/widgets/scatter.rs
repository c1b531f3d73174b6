// Scatter tab: price against pick number, one series per position, with the
// per-position R² and cost-of-waiting table alongside.

use std::collections::{BTreeMap, HashSet};

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Line;
use ratatui::widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table};
use ratatui::Frame;

use super::header_style;
use crate::draft::pick::Position;
use crate::tui::ViewState;
use crate::valuation::regression::{PositionRegression, ScatterPoint};

/// Render the scatter tab into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(dashboard) = &state.dashboard else {
        let placeholder = Paragraph::new("  Waiting for draft data...")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Price vs Pick"));
        frame.render_widget(placeholder, area);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let visible: HashSet<u32> = state
        .visible_picks()
        .iter()
        .map(|p| p.pick.pick_no)
        .collect();
    let points: Vec<&ScatterPoint> = dashboard
        .scatter
        .iter()
        .filter(|p| visible.contains(&p.pick_no))
        .collect();

    render_chart(frame, columns[0], &points);
    render_regressions(frame, columns[1], &dashboard.regressions);
}

/// Series color per position.
pub fn position_color(position: &Position) -> Color {
    match position {
        Position::QB => Color::Red,
        Position::RB => Color::Green,
        Position::WR => Color::Cyan,
        Position::TE => Color::Yellow,
        Position::K => Color::Magenta,
        Position::DEF => Color::Blue,
        Position::Other(_) => Color::Gray,
    }
}

/// Group points into `(x, y)` series keyed by position.
pub fn series_by_position(points: &[&ScatterPoint]) -> BTreeMap<Position, Vec<(f64, f64)>> {
    let mut series: BTreeMap<Position, Vec<(f64, f64)>> = BTreeMap::new();
    for point in points {
        series
            .entry(point.position.clone())
            .or_default()
            .push((f64::from(point.pick_no), point.price));
    }
    series
}

fn render_chart(frame: &mut Frame, area: Rect, points: &[&ScatterPoint]) {
    let series = series_by_position(points);
    let max_x = points
        .iter()
        .map(|p| f64::from(p.pick_no))
        .fold(1.0_f64, f64::max);
    let max_y = points.iter().map(|p| p.price).fold(1.0_f64, f64::max);

    let datasets: Vec<Dataset> = series
        .iter()
        .map(|(position, data)| {
            Dataset::default()
                .name(position.display_str().to_string())
                .marker(Marker::Braille)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(position_color(position)))
                .data(data)
        })
        .collect();

    let x_axis = Axis::default()
        .title("Pick")
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, max_x])
        .labels(axis_labels(max_x));
    let y_axis = Axis::default()
        .title("$")
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, max_y])
        .labels(axis_labels(max_y));

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title("Price vs Pick"))
        .x_axis(x_axis)
        .y_axis(y_axis);
    frame.render_widget(chart, area);
}

fn axis_labels(max: f64) -> Vec<Line<'static>> {
    vec![
        Line::from("0"),
        Line::from(format!("{:.0}", max / 2.0)),
        Line::from(format!("{:.0}", max)),
    ]
}

fn render_regressions(
    frame: &mut Frame,
    area: Rect,
    regressions: &BTreeMap<Position, PositionRegression>,
) {
    let header = Row::new(vec!["Pos", "R²", "1", "5", "10", "20"]).style(header_style());

    let rows: Vec<Row> = regressions
        .iter()
        .map(|(position, reg)| {
            let mut cells = vec![
                Cell::from(position.display_str().to_string())
                    .style(Style::default().fg(position_color(position))),
                Cell::from(format_r2(reg.r2)),
            ];
            match reg.cost_of_waiting {
                Some(cost) => cells.extend(
                    [cost.one_pick, cost.five_picks, cost.ten_picks, cost.twenty_picks]
                        .into_iter()
                        .map(|c| Cell::from(format!("{:.1}%", c * 100.0))),
                ),
                None => cells.extend((0..4).map(|_| Cell::from("N/A"))),
            }
            Row::new(cells)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Min(5),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Cost of waiting"));
    frame.render_widget(table, area);
}

pub fn format_r2(r2: Option<f64>) -> String {
    match r2 {
        Some(v) => format!("{:.2}", v),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::populated_state;
    use crate::valuation::table::Tier;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn point(pick_no: u32, position: Position, price: f64) -> ScatterPoint {
        ScatterPoint {
            pick_no,
            price,
            position,
            player_name: format!("P{pick_no}"),
            expected_price: None,
            tier: Tier::NotAvailable,
        }
    }

    fn rendered_text(state: &ViewState) -> String {
        let backend = TestBackend::new(120, 30);
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
    fn series_grouped_by_position() {
        let points = [
            point(1, Position::RB, 60.0),
            point(2, Position::WR, 50.0),
            point(3, Position::RB, 40.0),
        ];
        let refs: Vec<&ScatterPoint> = points.iter().collect();
        let series = series_by_position(&refs);
        assert_eq!(series.len(), 2);
        assert_eq!(series[&Position::RB], vec![(1.0, 60.0), (3.0, 40.0)]);
    }

    #[test]
    fn r2_formatting() {
        assert_eq!(format_r2(Some(0.8765)), "0.88");
        assert_eq!(format_r2(None), "N/A");
    }

    #[test]
    fn renders_chart_and_regression_table() {
        let state = populated_state();
        let text = rendered_text(&state);
        assert!(text.contains("Price vs Pick"));
        assert!(text.contains("Cost of waiting"));
        // Only one QB pick: the fit is undefined
        assert!(text.contains("N/A"));
    }

    #[test]
    fn placeholder_without_data() {
        let text = rendered_text(&ViewState::default());
        assert!(text.contains("Waiting for draft data"));
    }
}
