use crate::answer::AnswerVerdict;
use crate::models::App;
use crate::ui::fields::{draw_status, draw_text_field, key_hint};
use crate::ui::layout::calculate_quiz_chunks;
use crate::ui::raster::RasterView;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn draw_quiz(f: &mut Frame, app: &App) {
    let Some(result) = &app.result else {
        return;
    };
    let layout = calculate_quiz_chunks(f.area());

    let header = Paragraph::new("Guess the missing word")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    let image_block = Block::default().borders(Borders::ALL).title("Illustration");
    let image_inner = image_block.inner(layout.image_area);
    f.render_widget(image_block, layout.image_area);
    match &app.result_preview {
        Some(preview) => f.render_widget(RasterView::new(preview).keep_aspect(true), image_inner),
        None => f.render_widget(
            Paragraph::new("(image preview unavailable)")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            image_inner,
        ),
    }

    let solved = app.answer_revealed || app.verdict == Some(AnswerVerdict::Correct);
    let mut sentence_lines = vec![Line::from(Span::styled(
        result.blanked_sentence.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if solved {
        sentence_lines.push(Line::from(Span::styled(
            format!("{}  ({})", result.original_sentence, result.target_word),
            Style::default().fg(Color::Green),
        )));
    }
    let sentence = Paragraph::new(sentence_lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Sentence"));
    f.render_widget(sentence, layout.sentence_area);

    draw_text_field(
        f,
        layout.guess_area,
        "Your guess",
        &app.guess_input,
        !solved,
        "[type the missing word]",
    );

    draw_status(f, layout.status_area, app.status.as_ref());

    let mut line = Vec::new();
    line.extend(key_hint("Enter", "Check"));
    line.extend(key_hint("Ctrl+A", "Reveal"));
    line.extend(key_hint("Ctrl+S", "Save card"));
    line.extend(key_hint("Ctrl+R", "New quiz"));
    line.extend(key_hint("Esc", "Quit"));
    let help = Paragraph::new(Line::from(line))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}

pub fn draw_quit_confirmation(f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(5)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new("Quit")
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let message = Paragraph::new("Leave Visual Vocab? The current quiz will be lost.")
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, chunks[1]);

    let help_text = vec![Line::from(vec![
        Span::styled(
            "y",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Yes (Quit)  "),
        Span::styled(
            "n",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::from(" No (Go back)"),
    ])];
    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}
