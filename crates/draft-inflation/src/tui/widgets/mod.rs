// TUI widget modules for each dashboard panel, plus shared cell formatting.

pub mod filter_bar;
pub mod help_bar;
pub mod inflation;
pub mod quit_confirm;
pub mod scatter;
pub mod status_bar;
pub mod tab_bar;
pub mod teams;
pub mod ticker;

use ratatui::style::{Color, Modifier, Style};

use crate::valuation::inflation::Severity;

/// Cell color for a severity band. Overpaying is red, bargains are green.
pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::SeverePositive => Color::Red,
        Severity::ModeratePositive => Color::LightRed,
        Severity::MildPositive => Color::Yellow,
        Severity::Neutral => Color::White,
        Severity::MildNegative => Color::LightCyan,
        Severity::ModerateNegative => Color::LightGreen,
        Severity::SevereNegative => Color::Green,
    }
}

/// Signed percentage with one decimal, e.g. `+12.5%`.
pub fn format_pct(pct: f64) -> String {
    format!("{:+.1}%", pct)
}

pub fn format_opt_pct(pct: Option<f64>) -> String {
    pct.map(format_pct).unwrap_or_else(|| "N/A".to_string())
}

/// Whole-dollar amount, e.g. `$42`.
pub fn format_money(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.0}", amount.abs())
    } else {
        format!("${:.0}", amount)
    }
}

pub fn format_opt_money(amount: Option<f64>) -> String {
    amount.map(format_money).unwrap_or_else(|| "-".to_string())
}

/// Signed dollar difference, e.g. `+$5` or `-$3`.
pub fn format_doe(doe: Option<f64>) -> String {
    match doe {
        Some(d) if d < 0.0 => format!("-${:.0}", d.abs()),
        Some(d) => format!("+${:.0}", d),
        None => "-".to_string(),
    }
}

/// Bold white style used for every table header row.
pub fn header_style() -> Style {
    Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_formatting_is_signed() {
        assert_eq!(format_pct(12.345), "+12.3%");
        assert_eq!(format_pct(-4.0), "-4.0%");
        assert_eq!(format_pct(0.0), "+0.0%");
        assert_eq!(format_opt_pct(None), "N/A");
    }

    #[test]
    fn money_formatting() {
        assert_eq!(format_money(42.0), "$42");
        assert_eq!(format_money(-3.0), "-$3");
        assert_eq!(format_opt_money(None), "-");
        assert_eq!(format_doe(Some(5.0)), "+$5");
        assert_eq!(format_doe(Some(-2.0)), "-$2");
        assert_eq!(format_doe(None), "-");
    }

    #[test]
    fn severity_colors_are_distinct_by_sign() {
        assert_eq!(severity_color(Severity::Neutral), Color::White);
        assert_ne!(
            severity_color(Severity::SeverePositive),
            severity_color(Severity::SevereNegative)
        );
    }
}
