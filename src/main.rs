use crossbeam_channel::{Receiver, unbounded};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{
        self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    },
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use visual_vocab::ai_worker::spawn_quiz_worker;
use visual_vocab::card::{CardTypeface, FontTypeface};
use visual_vocab::models::QuizEvent;
use visual_vocab::ui::layout::canvas_raster_width;
use visual_vocab::{
    App, AppState, Config, GeminiClient, draw_compose, draw_generating, draw_quit_confirmation,
    draw_quiz, handle_key, handle_mouse, logger,
};

fn main() -> io::Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let _log_guard = logger::init(&config.log_file);
    tracing::info!("Starting Visual Vocab");

    let client = match GeminiClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to create AI client: {}", e);
            eprintln!("Failed to create AI client: {}", e);
            std::process::exit(1);
        }
    };

    let discovered = FontTypeface::discover(config.card_font.as_deref());
    let typeface: Option<Box<dyn CardTypeface>> = match discovered {
        Ok(typeface) => Some(Box::new(typeface)),
        Err(e) => {
            tracing::warn!("Share cards disabled: {}", e);
            None
        }
    };

    let (job_tx, job_rx) = unbounded();
    let (event_tx, event_rx) = unbounded();
    let _worker = spawn_quiz_worker(Arc::new(client), job_rx, event_tx)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (columns, _) = terminal::size()?;
    let mut app = App::new(
        canvas_raster_width(columns),
        Some(job_tx),
        config.output_dir.clone(),
        typeface,
    );

    let result = run(&mut terminal, &mut app, &event_rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!("Terminal loop failed: {}", e);
    }
    tracing::info!("Exiting Visual Vocab");
    result
}

fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    quiz_events: &Receiver<QuizEvent>,
) -> io::Result<()> {
    loop {
        while let Ok(event) = quiz_events.try_recv() {
            app.process_quiz_event(event);
        }
        app.sync_drawing();

        terminal.draw(|f| match app.state {
            AppState::Compose => draw_compose(f, app),
            AppState::Generating => draw_generating(f, app),
            AppState::Quiz => draw_quiz(f, app),
            AppState::QuitConfirm => draw_quit_confirmation(f),
        })?;

        if app.should_quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => handle_key(app, key),
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                _ => {}
            }
        }
    }
}
