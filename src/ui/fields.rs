use crate::input::TextField;
use crate::models::{StatusKind, StatusMessage};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthChar;

pub fn key_hint(key: &str, label: &str) -> Vec<Span<'static>> {
    vec![
        Span::styled(
            key.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(format!(" {}  ", label)),
    ]
}

/// Characters of `value` starting at display column `offset`.
pub fn visible_slice(value: &str, offset: usize) -> String {
    let mut column = 0;
    value
        .chars()
        .skip_while(|c| {
            let skip = column < offset;
            column += c.width().unwrap_or(0);
            skip
        })
        .collect()
}

/// Bordered single-line input. Places the terminal cursor when focused.
pub fn draw_text_field(
    f: &mut Frame,
    area: Rect,
    title: &str,
    field: &TextField,
    focused: bool,
    placeholder: &str,
) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let inner_width = area.width.saturating_sub(2) as usize;
    let offset = field.scroll_offset(inner_width);

    let content = if field.value().is_empty() {
        Line::from(Span::styled(
            placeholder.to_string(),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(visible_slice(field.value(), offset))
    };

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title.to_string()),
    );
    f.render_widget(paragraph, area);

    if focused {
        let cursor_x = area.x + 1 + (field.cursor_column() - offset) as u16;
        f.set_cursor_position((cursor_x, area.y + 1));
    }
}

pub fn draw_status(f: &mut Frame, area: Rect, status: Option<&StatusMessage>) {
    let Some(status) = status else {
        return;
    };
    let style = match status.kind {
        StatusKind::Info => Style::default().fg(Color::Green),
        StatusKind::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    };
    f.render_widget(Paragraph::new(status.text.as_str()).style(style), area);
}
