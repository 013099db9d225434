use engine::Breakdown;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::ui::{components::card::Panel, theme::Theme};

const BAR_WIDTH: usize = 20;
const LABEL_WIDTH: usize = 14;

/// Renders the expense breakdown as one labelled bar per category.
pub fn render_breakdown(frame: &mut Frame<'_>, area: Rect, breakdown: &Breakdown, theme: &Theme) {
    let inner = Panel::new("Expenses by category", theme).draw(frame, area);

    if breakdown.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No expenses recorded yet",
                Style::default().fg(theme.dim),
            ))
            .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let total = breakdown.total().minor().unsigned_abs();
    let rows: Vec<Line> = breakdown
        .entries()
        .iter()
        .take(inner.height as usize)
        .map(|entry| {
            let value = entry.amount.minor().unsigned_abs();
            let pct = if total > 0 { value * 100 / total } else { 0 };

            Line::from(vec![
                Span::styled(
                    format!(
                        "{:<width$}",
                        truncate(&entry.label, LABEL_WIDTH - 1),
                        width = LABEL_WIDTH
                    ),
                    Style::default().fg(theme.text),
                ),
                Span::styled(
                    ascii_bar(value, total, BAR_WIDTH),
                    Style::default().fg(theme.negative),
                ),
                Span::styled(format!(" {pct:>3}% "), Style::default().fg(theme.dim)),
                Span::styled(
                    entry.amount.to_string(),
                    Style::default().fg(theme.text_muted),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(rows), inner);
}

/// Creates a simple ASCII-based horizontal bar for inline use.
///
/// Returns a string like `████████░░░░░░░░░░░░` representing the ratio.
#[must_use]
pub fn ascii_bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return "░".repeat(width);
    }

    let ratio = (value as f64 / max as f64).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64) as usize).min(width);
    let empty = width.saturating_sub(filled);

    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
