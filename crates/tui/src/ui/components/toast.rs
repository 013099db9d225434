use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::{
    app::{ToastLevel, ToastState},
    ui::theme::Theme,
};

const MAX_WIDTH: u16 = 56;

fn level_color(level: ToastLevel, theme: &Theme) -> Color {
    match level {
        ToastLevel::Info => theme.text,
        ToastLevel::Success => theme.positive,
        ToastLevel::Error => theme.error,
    }
}

/// Bottom-right corner, one row above the hint bar.
fn placement(message: &str, area: Rect) -> Rect {
    let wanted = u16::try_from(message.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(4);
    let width = wanted.min(MAX_WIDTH).min(area.width);
    let height = (if wanted > width { 4 } else { 3 }).min(area.height);
    Rect {
        x: area.right().saturating_sub(width),
        y: area.bottom().saturating_sub(height + 1).max(area.y),
        width,
        height,
    }
}

pub fn render(frame: &mut Frame<'_>, area: Rect, toast: Option<&ToastState>, theme: &Theme) {
    let Some(toast) = toast else {
        return;
    };
    let rect = placement(&toast.message, area);
    let style = Style::default().fg(level_color(toast.level, theme));

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(toast.message.as_str())
            .style(style)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(style),
            ),
        rect,
    );
}
