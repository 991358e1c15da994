use crate::ai::plan_image;
use crate::answer::{AnswerVerdict, check_answer};
use crate::card::{self, CardTypeface};
use crate::drawing::{DRAWING_HEIGHT, DrawingSurface, PointerEvent};
use crate::error::GENERIC_FAILURE_MESSAGE;
use crate::image_data::EncodedImage;
use crate::input::TextField;
use crate::models::{
    App, AppState, ComposeField, QuizEvent, QuizJob, QuizMode, QuizRequest, StatusMessage,
};
use crate::samples;
use crossbeam_channel::Sender;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::path::PathBuf;
use std::time::Instant;

impl App {
    pub fn new(
        surface_width: u32,
        job_tx: Option<Sender<QuizJob>>,
        output_dir: PathBuf,
        typeface: Option<Box<dyn CardTypeface>>,
    ) -> Self {
        let (ready_tx, drawing_rx) = crossbeam_channel::unbounded();
        Self {
            state: AppState::Compose,
            state_before_quit: AppState::Compose,
            mode: QuizMode::Submit,
            focus: ComposeField::Word,
            word_input: TextField::new(),
            sentence_input: TextField::new(),
            surface: DrawingSurface::new(surface_width, DRAWING_HEIGHT, ready_tx),
            drawing_rx,
            drawing: None,
            canvas: None,
            result: None,
            result_preview: None,
            guess_input: TextField::new(),
            verdict: None,
            answer_revealed: false,
            status: None,
            pending_request: None,
            next_request_id: 1,
            generation_started: None,
            job_tx,
            output_dir,
            typeface,
            should_quit: false,
        }
    }

    /// Takes the most recent drawing notification from the surface.
    pub fn sync_drawing(&mut self) {
        while let Ok(drawing) = self.drawing_rx.try_recv() {
            self.drawing = drawing;
        }
    }

    pub fn build_request(&self) -> QuizRequest {
        QuizRequest::new(
            self.word_input.value(),
            self.sentence_input.value(),
            self.drawing.clone(),
            self.mode,
        )
    }

    fn focused_input(&mut self) -> &mut TextField {
        match self.focus {
            ComposeField::Word => &mut self.word_input,
            ComposeField::Sentence => &mut self.sentence_input,
        }
    }

    /// Validates the form locally and hands the request to the worker.
    pub fn submit(&mut self) {
        self.sync_drawing();
        let request = self.build_request();
        if let Err(e) = plan_image(&request) {
            self.status = Some(StatusMessage::error(e.user_message()));
            return;
        }

        let Some(job_tx) = &self.job_tx else {
            self.status = Some(StatusMessage::error("The AI service is not available."));
            return;
        };

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        if job_tx
            .send(QuizJob::Generate {
                request_id,
                request,
            })
            .is_err()
        {
            tracing::error!("Quiz worker is gone, request {} dropped", request_id);
            self.status = Some(StatusMessage::error(
                "The background worker stopped. Restart the app.",
            ));
            return;
        }

        tracing::info!("Submitted quiz request {} ({:?})", request_id, self.mode);
        self.pending_request = Some(request_id);
        self.generation_started = Some(Instant::now());
        self.status = None;
        self.state = AppState::Generating;
    }

    /// Stops waiting for the pending request. Its result is ignored on arrival.
    pub fn cancel_generation(&mut self) {
        if let Some(request_id) = self.pending_request.take() {
            tracing::info!("Abandoned quiz request {}", request_id);
        }
        self.generation_started = None;
        self.state = AppState::Compose;
        self.status = Some(StatusMessage::info("Cancelled."));
    }

    pub fn process_quiz_event(&mut self, event: QuizEvent) {
        let request_id = match &event {
            QuizEvent::Ready { request_id, .. } | QuizEvent::Failed { request_id, .. } => {
                *request_id
            }
        };
        if self.pending_request != Some(request_id) {
            tracing::debug!("Ignoring stale quiz event for request {}", request_id);
            return;
        }
        self.pending_request = None;
        self.generation_started = None;

        match event {
            QuizEvent::Ready { result, .. } => {
                let decoded = EncodedImage::new(result.image_url.clone()).decode_image();
                self.result_preview = match decoded {
                    Ok(image) => Some(image.to_rgba8()),
                    Err(e) => {
                        tracing::warn!("Could not decode quiz image for preview: {}", e);
                        None
                    }
                };
                self.result = Some(result);
                self.guess_input.clear();
                self.verdict = None;
                self.answer_revealed = false;
                self.status = None;
                self.state = AppState::Quiz;
            }
            QuizEvent::Failed { error, .. } => {
                let message = if error.trim().is_empty() {
                    GENERIC_FAILURE_MESSAGE.to_string()
                } else {
                    error
                };
                self.status = Some(StatusMessage::error(message));
                self.state = AppState::Compose;
            }
        }
    }

    pub fn check_guess(&mut self) {
        let Some(result) = &self.result else {
            return;
        };
        match check_answer(self.guess_input.value(), &result.target_word) {
            None => {
                self.status = Some(StatusMessage::error("Type a guess first."));
            }
            Some(AnswerVerdict::Correct) => {
                self.status = Some(StatusMessage::info(format!(
                    "Correct! The word was \"{}\".",
                    result.target_word
                )));
                self.verdict = Some(AnswerVerdict::Correct);
            }
            Some(AnswerVerdict::Incorrect) => {
                self.status = Some(StatusMessage::error("Not quite, try again."));
                self.verdict = Some(AnswerVerdict::Incorrect);
            }
        }
    }

    pub fn reveal_answer(&mut self) {
        if let Some(result) = &self.result {
            self.answer_revealed = true;
            self.status = Some(StatusMessage::info(format!(
                "The answer is \"{}\".",
                result.target_word
            )));
        }
    }

    pub fn save_card(&mut self) {
        let Some(result) = &self.result else {
            return;
        };
        self.status = Some(
            match card::save_card(result, &self.output_dir, self.typeface.as_deref()) {
                Ok(saved) if saved.composited => {
                    StatusMessage::info(format!("Saved card to {}", saved.path.display()))
                }
                Ok(saved) => StatusMessage::info(format!(
                    "Saved image to {} (card layout unavailable)",
                    saved.path.display()
                )),
                Err(e) => {
                    tracing::error!("Saving card failed: {}", e);
                    StatusMessage::error(format!("Could not save image: {}", e))
                }
            },
        );
    }

    /// Back to an empty form.
    pub fn reset(&mut self) {
        self.surface.clear();
        self.sync_drawing();
        self.word_input.clear();
        self.sentence_input.clear();
        self.focus = ComposeField::Word;
        self.result = None;
        self.result_preview = None;
        self.guess_input.clear();
        self.verdict = None;
        self.answer_revealed = false;
        self.status = None;
        self.pending_request = None;
        self.generation_started = None;
        self.state = AppState::Compose;
    }

    pub fn fill_random_example(&mut self) {
        let sample = samples::random_sample(&mut rand::thread_rng());
        self.word_input.set(sample.word);
        self.sentence_input.set(sample.sentence);
    }

    fn request_quit(&mut self) {
        self.state_before_quit = self.state;
        self.state = AppState::QuitConfirm;
    }
}

fn edit_field(field: &mut TextField, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => field.insert(c),
        KeyCode::Backspace => field.backspace(),
        KeyCode::Delete => field.delete(),
        KeyCode::Left => field.move_left(),
        KeyCode::Right => field.move_right(),
        KeyCode::Home => field.move_home(),
        KeyCode::End => field.move_end(),
        _ => {}
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.state {
        AppState::Compose => match key.code {
            KeyCode::Esc => app.request_quit(),
            KeyCode::Tab | KeyCode::BackTab => {
                app.focus = match app.focus {
                    ComposeField::Word => ComposeField::Sentence,
                    ComposeField::Sentence => ComposeField::Word,
                };
            }
            KeyCode::Enter => app.submit(),
            KeyCode::Char('t') if ctrl => {
                app.mode = app.mode.toggled();
                app.status = Some(StatusMessage::info(format!("Mode: {}", app.mode.label())));
            }
            KeyCode::Char('l') if ctrl => {
                app.surface.clear();
                app.sync_drawing();
            }
            KeyCode::Char('e') if ctrl => app.fill_random_example(),
            _ => edit_field(app.focused_input(), key),
        },
        AppState::Generating => {
            if key.code == KeyCode::Esc {
                app.cancel_generation();
            }
        }
        AppState::Quiz => match key.code {
            KeyCode::Esc => app.request_quit(),
            KeyCode::Enter => app.check_guess(),
            KeyCode::Char('a') if ctrl => app.reveal_answer(),
            KeyCode::Char('s') if ctrl => app.save_card(),
            KeyCode::Char('r') if ctrl => app.reset(),
            _ => edit_field(&mut app.guess_input, key),
        },
        AppState::QuitConfirm => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.should_quit = true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = app.state_before_quit;
            }
            _ => {}
        },
    }
}

/// Feeds left-button mouse activity on the canvas to the drawing surface.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.state != AppState::Compose {
        return;
    }
    let Some(geometry) = app.canvas else {
        return;
    };
    app.surface.set_origin(geometry.origin());

    let inside = geometry.contains(mouse.column, mouse.row);
    let point = geometry.client_point(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if inside => {
            app.surface.handle(PointerEvent::Press(point));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if inside {
                app.surface.handle(PointerEvent::Move(point));
            } else {
                app.surface.handle(PointerEvent::Leave);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => app.surface.handle(PointerEvent::Release),
        MouseEventKind::Moved if !inside => app.surface.handle(PointerEvent::Leave),
        _ => {}
    }
    app.sync_drawing();
}
