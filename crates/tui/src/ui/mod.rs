pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, Mode};

use components::hints::{KeyHint, hint_separator, hints_to_spans};
pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
use theme::Theme;

const BROWSE_HINTS: [KeyHint; 6] = [
    KeyHint::new("a", "add"),
    KeyHint::new("f", "filter"),
    KeyHint::new("b", "opening balance"),
    KeyHint::new("d", "delete"),
    KeyHint::new("r", "reload"),
    KeyHint::new("↑↓", "select"),
];

const FORM_HINTS: [KeyHint; 3] = [
    KeyHint::new("Tab", "next"),
    KeyHint::new("Enter", "save"),
    KeyHint::new("Esc", "cancel"),
];

const FILTER_HINTS: [KeyHint; 3] = [
    KeyHint::new("Tab", "field"),
    KeyHint::new("←→", "change"),
    KeyHint::new("Enter", "close"),
];

const CONFIRM_HINTS: [KeyHint; 2] = [KeyHint::new("y", "delete"), KeyHint::new("n", "keep")];

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let theme = Theme::default();
    let area = frame.area();

    // Main layout: info bar, content, bottom bar
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    screens::dashboard::render(frame, layout[1], state, &theme);
    render_bottom_bar(frame, layout[2], state, &theme);

    screens::popups::render(frame, area, state, &theme);
    components::toast::render(frame, area, state.toast.as_ref(), &theme);
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let tier = state.tracker.tier();
    let tier_style = match tier {
        engine::Tier::Remote => Style::default().fg(theme.positive),
        engine::Tier::Local => Style::default().fg(theme.accent),
    };

    let line = Line::from(vec![
        Span::styled("Data", Style::default().fg(theme.text_muted)),
        Span::raw(": "),
        Span::styled(tier.label(), tier_style),
        Span::raw("  "),
        Span::styled("Server", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.base_url)),
        Span::styled("Users", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.users)),
        Span::styled("Transactions", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}", state.tracker.transactions().len())),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let hints: &[KeyHint] = match state.mode {
        Mode::Browse => &BROWSE_HINTS,
        Mode::Form | Mode::OpeningBalance => &FORM_HINTS,
        Mode::Filter => &FILTER_HINTS,
        Mode::ConfirmDelete(_) => &CONFIRM_HINTS,
    };

    let mut parts = hints_to_spans(hints, theme);
    if state.mode == Mode::Browse {
        parts.push(hint_separator(theme));
        parts.push(Span::styled("q", Style::default().fg(theme.accent)));
        parts.push(Span::raw(" quit"));
    }

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}
