// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app orchestrator, or into local ViewState mutations (tab switching,
// scrolling, filtering).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{FilterField, FilterPanel, ViewState};
use crate::protocol::{TabId, UserCommand};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator (draft id change, liveness toggle, refresh, quit).
/// Returns `None` when the key press was handled locally by mutating
/// `ViewState`.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Crossterm emits Press and Release on some platforms.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }
    if view_state.draft_prompt.is_some() {
        return handle_draft_prompt(key_event, view_state);
    }
    if view_state.filter_mode {
        return handle_filter_mode(key_event, view_state);
    }
    if view_state.filter_panel.is_some() {
        return handle_filter_panel(key_event, view_state);
    }

    match key_event.code {
        KeyCode::Char('1') => select_tab(view_state, TabId::Inflation),
        KeyCode::Char('2') => select_tab(view_state, TabId::Ticker),
        KeyCode::Char('3') => select_tab(view_state, TabId::Teams),
        KeyCode::Char('4') => select_tab(view_state, TabId::Scatter),

        KeyCode::Up | KeyCode::Char('k') => {
            scroll_up(view_state, 1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            scroll_down(view_state, 1);
            None
        }
        KeyCode::PageUp => {
            scroll_up(view_state, PAGE_SIZE);
            None
        }
        KeyCode::PageDown => {
            scroll_down(view_state, PAGE_SIZE);
            None
        }

        KeyCode::Char('/') => {
            view_state.filter_mode = true;
            None
        }
        KeyCode::Char('f') => {
            view_state.filter_panel = Some(FilterPanel::default());
            None
        }
        KeyCode::Char('x') => {
            view_state.filter.reset();
            view_state.scroll_offset = 0;
            None
        }
        KeyCode::Esc => {
            view_state.filter.player_text.clear();
            None
        }

        KeyCode::Char('m') => {
            view_state.ticker_expanded = !view_state.ticker_expanded;
            view_state.scroll_offset = 0;
            None
        }

        KeyCode::Char('d') => {
            view_state.draft_prompt = Some(view_state.draft_id.clone());
            None
        }
        KeyCode::Char('L') => Some(UserCommand::ToggleLive),
        KeyCode::Char('r') => Some(UserCommand::Refresh),

        // Quit asks for confirmation first
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }

        _ => None,
    }
}

const PAGE_SIZE: usize = 10;

fn select_tab(view_state: &mut ViewState, tab: TabId) -> Option<UserCommand> {
    if view_state.active_tab != tab {
        view_state.active_tab = tab;
        view_state.scroll_offset = 0;
    }
    None
}

/// In quit confirmation mode `y`/`q` confirm, `n`/Esc cancel, and every
/// other key is swallowed.
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

/// Draft id prompt: Enter submits the trimmed text, Esc abandons it.
fn handle_draft_prompt(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let prompt = view_state.draft_prompt.as_mut()?;
    match key_event.code {
        KeyCode::Esc => {
            view_state.draft_prompt = None;
            None
        }
        KeyCode::Enter => {
            let draft_id = prompt.trim().to_string();
            view_state.draft_prompt = None;
            Some(UserCommand::SetDraftId(draft_id))
        }
        KeyCode::Backspace => {
            prompt.pop();
            None
        }
        KeyCode::Char(c) => {
            prompt.push(c);
            None
        }
        _ => None,
    }
}

/// Player-name filter entry. Esc clears the text; Enter keeps it.
fn handle_filter_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.filter_mode = false;
            view_state.filter.player_text.clear();
            None
        }
        KeyCode::Enter => {
            view_state.filter_mode = false;
            None
        }
        KeyCode::Backspace => {
            view_state.filter.player_text.pop();
            view_state.scroll_offset = 0;
            None
        }
        KeyCode::Char(c) => {
            view_state.filter.player_text.push(c);
            view_state.scroll_offset = 0;
            None
        }
        _ => None,
    }
}

/// Filter panel navigation.
///
/// Up/Down pick the field. On set fields Left/Right move the cursor and
/// Space toggles the option under it. On range fields Left/Right nudge the
/// lower bound, Shift+Left/Right (or `H`/`L`) nudge the upper bound, and
/// Space resets the range.
fn handle_filter_panel(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let panel = view_state.filter_panel.clone()?;
    let field = panel.field;
    let shifted = key_event.modifiers.contains(KeyModifiers::SHIFT);

    match key_event.code {
        KeyCode::Esc | KeyCode::Char('f') => {
            view_state.filter_panel = None;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.filter_panel = Some(FilterPanel {
                field: field.prev(),
                cursor: 0,
            });
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view_state.filter_panel = Some(FilterPanel {
                field: field.next(),
                cursor: 0,
            });
        }
        KeyCode::Left | KeyCode::Char('h') if field.is_range() => {
            shift_range(view_state, field, !shifted, -field.step());
        }
        KeyCode::Right | KeyCode::Char('l') if field.is_range() => {
            shift_range(view_state, field, !shifted, field.step());
        }
        KeyCode::Char('H') if field.is_range() => {
            shift_range(view_state, field, false, -field.step());
        }
        KeyCode::Char('L') if field.is_range() => {
            shift_range(view_state, field, false, field.step());
        }
        KeyCode::Left | KeyCode::Char('h') => {
            set_cursor(view_state, panel.cursor.saturating_sub(1));
        }
        KeyCode::Right | KeyCode::Char('l') => {
            let last = view_state.option_count(field).saturating_sub(1);
            set_cursor(view_state, (panel.cursor + 1).min(last));
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            toggle_option(view_state, field, panel.cursor);
        }
        KeyCode::Char('x') => {
            view_state.filter.reset();
        }
        _ => {}
    }
    view_state.scroll_offset = 0;
    None
}

fn set_cursor(view_state: &mut ViewState, cursor: usize) {
    if let Some(panel) = view_state.filter_panel.as_mut() {
        panel.cursor = cursor;
    }
}

fn shift_range(view_state: &mut ViewState, field: FilterField, lower: bool, delta: f64) {
    let range = match field {
        FilterField::Price => &mut view_state.filter.price,
        FilterField::ExpectedPrice => &mut view_state.filter.expected_price,
        FilterField::Inflation => &mut view_state.filter.inflation,
        _ => return,
    };
    if lower {
        range.shift_min(delta);
    } else {
        range.shift_max(delta);
    }
}

fn toggle_option(view_state: &mut ViewState, field: FilterField, cursor: usize) {
    match field {
        FilterField::Teams => {
            if let Some(team) = view_state.team_options().get(cursor) {
                view_state.filter.toggle_team(team);
            }
        }
        FilterField::Positions => {
            if let Some(position) = view_state.position_options().into_iter().nth(cursor) {
                view_state.filter.toggle_position(position);
            }
        }
        FilterField::Tiers => {
            if let Some(tier) = view_state.tier_options().get(cursor) {
                view_state.filter.toggle_tier(*tier);
            }
        }
        FilterField::Price => view_state.filter.price.reset(),
        FilterField::ExpectedPrice => view_state.filter.expected_price.reset(),
        FilterField::Inflation => view_state.filter.inflation.reset(),
    }
}

/// Largest scroll offset for the active tab: the last visible ticker row,
/// or the last team on the Teams tab.
fn scroll_limit(view_state: &ViewState) -> usize {
    match view_state.active_tab {
        TabId::Ticker => view_state.visible_picks().len().saturating_sub(1),
        TabId::Teams => view_state
            .dashboard
            .as_ref()
            .map(|d| d.teams.len().saturating_sub(1))
            .unwrap_or(0),
        TabId::Inflation | TabId::Scatter => 0,
    }
}

fn scroll_up(view_state: &mut ViewState, lines: usize) {
    view_state.scroll_offset = view_state.scroll_offset.saturating_sub(lines);
}

fn scroll_down(view_state: &mut ViewState, lines: usize) {
    let limit = scroll_limit(view_state);
    view_state.scroll_offset = view_state.scroll_offset.saturating_add(lines).min(limit);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
