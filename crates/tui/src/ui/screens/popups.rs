use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::{AppState, FilterField, FormField, Mode},
    ui::{components::card::Panel, theme::Theme},
};

/// Calculates a centered rect of at most `width` x `height`.
fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}

/// Draws the popup for the current mode, if any.
pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    match state.mode {
        Mode::Browse => {}
        Mode::Form => render_form(frame, area, state, theme),
        Mode::Filter => render_filter(frame, area, state, theme),
        Mode::OpeningBalance => render_opening_balance(frame, area, state, theme),
        Mode::ConfirmDelete(id) => render_confirm_delete(frame, area, state, id, theme),
    }
}

/// Draws a centered popup panel and returns its inner area.
fn open(frame: &mut Frame<'_>, area: Rect, title: &str, height: u16, theme: &Theme) -> Rect {
    Panel::new(title, theme)
        .popup()
        .draw(frame, centered_box(48, height, area))
}

fn render_form(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let inner = open(frame, area, "New transaction", 9, theme);
    let form = &state.form;

    let categories = state.form_categories();
    let category = categories
        .get(form.category)
        .map_or("(none)", |(_, name)| *name);
    let date = if form.date.is_empty() && form.focus != FormField::Date {
        "today"
    } else {
        form.date.as_str()
    };

    let lines = vec![
        field_line(
            "Type",
            &format!("‹ {} ›", form.kind.label()),
            form.focus == FormField::Kind,
            theme,
        ),
        field_line("Amount", &form.amount, form.focus == FormField::Amount, theme),
        field_line(
            "Category",
            &format!("‹ {category} ›"),
            form.focus == FormField::Category,
            theme,
        ),
        field_line(
            "Description",
            &form.description,
            form.focus == FormField::Description,
            theme,
        ),
        field_line("Date", date, form.focus == FormField::Date, theme),
        Line::from(""),
        Line::from(Span::styled(
            "Tab next  ←→ choose  Enter save  Esc cancel",
            Style::default().fg(theme.dim),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_filter(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let inner = open(frame, area, "Filter", 5, theme);
    let focus = state.filter.focus;

    let lines = vec![
        field_line(
            "Category",
            &format!("‹ {} ›", state.filter_category_label()),
            focus == FilterField::Category,
            theme,
        ),
        field_line(
            "Type",
            &format!("‹ {} ›", state.filter_kind_label()),
            focus == FilterField::Kind,
            theme,
        ),
        Line::from(Span::styled(
            "←→ change  Backspace all  Enter close",
            Style::default().fg(theme.dim),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_opening_balance(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let inner = open(frame, area, "Opening balance", 5, theme);
    let current = state.tracker.opening_balance().amount();

    let lines = vec![
        field_line("Amount", &state.balance_input, true, theme),
        Line::from(Span::styled(
            format!("current {current}"),
            Style::default().fg(theme.dim),
        )),
        Line::from(Span::styled(
            "Enter save  Esc cancel",
            Style::default().fg(theme.dim),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_confirm_delete(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    id: i64,
    theme: &Theme,
) {
    let inner = open(frame, area, "Delete transaction", 4, theme);
    let description = state
        .rendered
        .rows
        .iter()
        .find(|row| row.id == id)
        .map_or_else(String::new, |row| format!("{} ({})", row.description, row.amount));

    let lines = vec![
        Line::from(description),
        Line::from(vec![
            Span::raw("Delete this transaction? "),
            Span::styled("y", Style::default().fg(theme.accent)),
            Span::raw("/"),
            Span::styled("n", Style::default().fg(theme.accent)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

/// One `label: value` row; the focused row shows a cursor.
fn field_line(label: &str, value: &str, focused: bool, theme: &Theme) -> Line<'static> {
    let cursor = if focused { "│" } else { "" };
    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };

    Line::from(vec![
        Span::styled(format!("{label:<12}"), Style::default().fg(theme.dim)),
        Span::styled(format!("{value}{cursor}"), style),
    ])
}
