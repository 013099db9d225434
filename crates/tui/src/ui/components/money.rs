use engine::{Money, TransactionKind};
use ratatui::{style::Style, text::Span};

use crate::ui::theme::Theme;

/// Amount of one transaction: `+` and green for income, `-` and red for
/// expense.
#[must_use]
pub fn styled_amount(amount: Money, kind: TransactionKind, theme: &Theme) -> Span<'static> {
    let (color, prefix) = match kind {
        TransactionKind::Income => (theme.positive, "+"),
        TransactionKind::Expense => (theme.negative, "-"),
    };
    Span::styled(format!("{prefix}{amount}"), Style::default().fg(color))
}

/// A running total, colored by sign.
#[must_use]
pub fn styled_balance(amount: Money, theme: &Theme) -> Span<'static> {
    let color = if amount.is_negative() {
        theme.negative
    } else if amount.is_positive() {
        theme.positive
    } else {
        theme.text
    };
    Span::styled(amount.to_string(), Style::default().fg(color))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expense_shows_minus_sign() {
        let theme = Theme::default();
        let span = styled_amount(Money::from_major(50_000), TransactionKind::Expense, &theme);
        assert_eq!(span.content, "-Rp 50.000");
        assert_eq!(span.style.fg, Some(theme.negative));
    }

    #[test]
    fn negative_balance_is_red() {
        let theme = Theme::default();
        let span = styled_balance(Money::from_major(-1_500), &theme);
        assert_eq!(span.content, "-Rp 1.500");
        assert_eq!(span.style.fg, Some(theme.negative));
    }
}
