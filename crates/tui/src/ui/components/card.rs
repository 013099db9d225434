use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::ui::theme::Theme;

/// Bordered panel behind every dashboard section and popup.
pub struct Panel<'a> {
    title: &'a str,
    theme: &'a Theme,
    popup: bool,
}

impl<'a> Panel<'a> {
    pub fn new(title: &'a str, theme: &'a Theme) -> Self {
        Self {
            title,
            theme,
            popup: false,
        }
    }

    /// Popups clear what lies underneath and use the focused border.
    pub fn popup(self) -> Self {
        Self {
            popup: true,
            ..self
        }
    }

    fn block(&self) -> Block<'a> {
        let border = if self.popup {
            self.theme.border_focused
        } else {
            self.theme.border
        };
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(Line::from(Span::styled(
                format!(" {} ", self.title),
                Style::default().fg(self.theme.accent),
            )))
            .style(Style::default().bg(self.theme.surface))
    }

    /// Draws the border and returns the area left for content.
    pub fn draw(&self, frame: &mut Frame<'_>, area: Rect) -> Rect {
        if self.popup {
            frame.render_widget(Clear, area);
        }
        let block = self.block();
        let inner = block.inner(area);
        frame.render_widget(block, area);
        inner
    }
}

/// One summary figure in bold, with an optional caption under it.
pub struct Figure<'a> {
    title: &'a str,
    value: Span<'static>,
    caption: Option<String>,
}

impl<'a> Figure<'a> {
    pub fn new(title: &'a str, value: Span<'static>) -> Self {
        Self {
            title,
            value,
            caption: None,
        }
    }

    pub fn caption(self, caption: impl Into<String>) -> Self {
        Self {
            caption: Some(caption.into()),
            ..self
        }
    }

    pub fn draw(self, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
        let inner = Panel::new(self.title, theme).draw(frame, area);

        let bold = self.value.style.add_modifier(Modifier::BOLD);
        let mut lines = vec![Line::from(self.value.style(bold))];
        if let Some(caption) = self.caption {
            lines.push(Line::styled(caption, Style::default().fg(theme.dim)));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }
}
