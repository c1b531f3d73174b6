// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                               |
// +--------------------------------------------------+
// | Tab Bar (1 row)                                  |
// +--------------------------------------------------+
// | Main Panel (fill)                                |
// |                                                  |
// +--------------------------------------------------+
// | Filter Bar (1 row)                               |
// +--------------------------------------------------+
// | Help Bar (1 row)                                 |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each dashboard zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Draft id, live flag, fetch status, last update time.
    pub status_bar: Rect,
    pub tab_bar: Rect,
    /// Tab-switched content area.
    pub main_panel: Rect,
    /// Active filters, or the text being typed into a prompt.
    pub filter_bar: Rect,
    /// Keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the dashboard layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(1), // tab bar
            Constraint::Min(8),    // main panel
            Constraint::Length(1), // filter bar
            Constraint::Length(1), // help bar
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        tab_bar: vertical[1],
        main_panel: vertical[2],
        filter_bar: vertical[3],
        help_bar: vertical[4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 120, 40)
    }

    #[test]
    fn layout_all_rects_nonzero() {
        let layout = build_layout(test_area());
        let rects = [
            ("status_bar", layout.status_bar),
            ("tab_bar", layout.tab_bar),
            ("main_panel", layout.main_panel),
            ("filter_bar", layout.filter_bar),
            ("help_bar", layout.help_bar),
        ];
        for (name, rect) in rects {
            assert!(rect.width > 0, "{name} has zero width");
            assert!(rect.height > 0, "{name} has zero height");
        }
    }

    #[test]
    fn layout_bars_are_single_rows() {
        let layout = build_layout(test_area());
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.tab_bar.height, 1);
        assert_eq!(layout.filter_bar.height, 1);
        assert_eq!(layout.help_bar.height, 1);
        assert_eq!(layout.main_panel.height, 36);
    }

    #[test]
    fn layout_rows_are_stacked_in_order() {
        let layout = build_layout(test_area());
        assert_eq!(layout.status_bar.y, 0);
        assert_eq!(layout.tab_bar.y, 1);
        assert_eq!(layout.main_panel.y, 2);
        assert_eq!(layout.help_bar.y, 39);
        assert_eq!(layout.filter_bar.y, 38);
    }

    #[test]
    fn layout_small_terminal_does_not_panic() {
        let layout = build_layout(Rect::new(0, 0, 20, 6));
        assert_eq!(layout.status_bar.width, 20);
    }
}
