use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
};

use crate::{
    app::AppState,
    ui::{
        components::{
            card::{Figure, Panel},
            charts,
            money::{styled_amount, styled_balance},
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    render_cards(frame, layout[0], state, theme);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(layout[1]);

    render_table(frame, body[0], state, theme);
    charts::render_breakdown(frame, body[1], &state.rendered.breakdown, theme);
}

fn render_cards(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let summary = state.rendered.summary;
    let opening = state.tracker.opening_balance().amount();

    Figure::new("Balance", styled_balance(summary.balance, theme))
        .caption(format!("opening {opening}"))
        .draw(frame, cards[0], theme);
    Figure::new(
        "Income",
        Span::styled(
            summary.total_income.to_string(),
            Style::default().fg(theme.positive),
        ),
    )
    .draw(frame, cards[1], theme);
    Figure::new(
        "Expense",
        Span::styled(
            summary.total_expense.to_string(),
            Style::default().fg(theme.negative),
        ),
    )
    .draw(frame, cards[2], theme);
}

fn render_table(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let title = format!(
        "Transactions · {} / {}",
        state.filter_category_label(),
        state.filter_kind_label()
    );
    let inner = Panel::new(&title, theme).draw(frame, area);

    if state.rendered.rows.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("No transactions. Press ", Style::default().fg(theme.dim)),
                Span::styled("a", Style::default().fg(theme.accent)),
                Span::styled(" to add one.", Style::default().fg(theme.dim)),
            ]))
            .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let header = Row::new(["Date", "Type", "Category", "Description", "Amount"])
        .style(Style::default().fg(theme.dim));
    let rows = state.rendered.rows.iter().map(|row| {
        Row::new(vec![
            Cell::from(row.date.format("%d %b %Y").to_string()),
            Cell::from(row.kind.label()),
            Cell::from(row.category.clone()),
            Cell::from(row.description.clone()),
            Cell::from(styled_amount(row.amount, row.kind, theme)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(11),
            Constraint::Length(7),
            Constraint::Length(12),
            Constraint::Min(10),
            Constraint::Length(16),
        ],
    )
    .header(header)
    .row_highlight_style(
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("» ");

    let mut table_state = TableState::default();
    table_state.select(Some(state.selected));
    frame.render_stateful_widget(table, inner, &mut table_state);
}
