use crate::models::{App, ComposeField, QuizMode};
use crate::ui::fields::{draw_status, draw_text_field, key_hint};
use crate::ui::layout::{CanvasGeometry, calculate_compose_chunks};
use crate::ui::raster::{RasterView, Sampling};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn draw_compose(f: &mut Frame, app: &mut App) {
    let layout = calculate_compose_chunks(f.area());

    let mode_style = match app.mode {
        QuizMode::Submit => Style::default().fg(Color::Yellow),
        QuizMode::Generate => Style::default().fg(Color::Magenta),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Visual Vocab",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from("  -  Mode: "),
        Span::styled(app.mode.label(), mode_style.add_modifier(Modifier::BOLD)),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    draw_text_field(
        f,
        layout.word_area,
        "Target word",
        &app.word_input,
        app.focus == ComposeField::Word,
        "[e.g. improve]",
    );
    draw_text_field(
        f,
        layout.sentence_area,
        "Example sentence (optional)",
        &app.sentence_input,
        app.focus == ComposeField::Sentence,
        "[leave empty to let the AI write one]",
    );

    let canvas_title = if app.drawing.is_some() {
        "Sketch (drag to draw, Ctrl+L to clear) - drawing ready"
    } else {
        "Sketch (drag to draw)"
    };
    let canvas_block = Block::default().borders(Borders::ALL).title(canvas_title);
    let canvas_inner = canvas_block.inner(layout.canvas_area);
    f.render_widget(canvas_block, layout.canvas_area);
    f.render_widget(
        RasterView::new(app.surface.image()).sampling(Sampling::Darkest),
        canvas_inner,
    );

    app.canvas = Some(CanvasGeometry::new(
        canvas_inner,
        app.surface.width(),
        app.surface.height(),
    ));

    draw_status(f, layout.status_area, app.status.as_ref());

    let mut line = Vec::new();
    line.extend(key_hint("Tab", "Switch field"));
    line.extend(key_hint("Ctrl+T", "Toggle mode"));
    line.extend(key_hint("Ctrl+L", "Clear sketch"));
    line.extend(key_hint("Ctrl+E", "Random example"));
    line.extend(key_hint("Enter", "Create quiz"));
    line.extend(key_hint("Esc", "Quit"));
    let help = Paragraph::new(Line::from(line))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}

pub fn draw_generating(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(5)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new("Creating your quiz")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let elapsed = app
        .generation_started
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0);
    let detail = match app.mode {
        QuizMode::Submit => "Preparing the sentence for your drawing",
        QuizMode::Generate => "Illustrating and preparing the sentence",
    };
    let message = Paragraph::new(vec![
        Line::from(format!("\"{}\"", app.word_input.value().trim())),
        Line::from(""),
        Line::from(format!("{}... ({}s)", detail, elapsed)),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, chunks[1]);

    let help = Paragraph::new(Line::from(key_hint("Esc", "Cancel")))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}
