use crate::answer::AnswerVerdict;
use crate::card::CardTypeface;
use crate::drawing::DrawingSurface;
use crate::image_data::EncodedImage;
use crate::input::TextField;
use crate::ui::layout::CanvasGeometry;
use crossbeam_channel::{Receiver, Sender};
use image::RgbaImage;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizMode {
    /// The user's own drawing is the quiz image.
    Submit,
    /// The service illustrates the sketch and/or sentence.
    Generate,
}

impl QuizMode {
    pub fn toggled(self) -> Self {
        match self {
            QuizMode::Submit => QuizMode::Generate,
            QuizMode::Generate => QuizMode::Submit,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuizMode::Submit => "Submit my drawing",
            QuizMode::Generate => "Generate with AI",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    pub word: String,
    /// Empty when the user gave no sentence.
    pub sentence: String,
    pub drawing: Option<EncodedImage>,
    pub mode: QuizMode,
}

impl QuizRequest {
    pub fn new(
        word: impl Into<String>,
        sentence: impl Into<String>,
        drawing: Option<EncodedImage>,
        mode: QuizMode,
    ) -> Self {
        Self {
            word: word.into(),
            sentence: sentence.into(),
            drawing,
            mode,
        }
    }

    pub fn word(&self) -> &str {
        self.word.trim()
    }

    pub fn sentence(&self) -> Option<&str> {
        let sentence = self.sentence.trim();
        if sentence.is_empty() {
            None
        } else {
            Some(sentence)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    /// Data URI (or bare base64) of the illustration.
    pub image_url: String,
    pub original_sentence: String,
    pub blanked_sentence: String,
    pub target_word: String,
}

#[derive(Debug)]
pub enum QuizJob {
    Generate { request_id: u64, request: QuizRequest },
}

#[derive(Debug)]
pub enum QuizEvent {
    Ready { request_id: u64, result: QuizResult },
    Failed { request_id: u64, error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Compose,
    Generating,
    Quiz,
    QuitConfirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeField {
    Word,
    Sentence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

pub struct App {
    pub state: AppState,
    pub state_before_quit: AppState,
    pub mode: QuizMode,
    pub focus: ComposeField,
    pub word_input: TextField,
    pub sentence_input: TextField,
    pub surface: DrawingSurface,
    pub drawing_rx: Receiver<Option<EncodedImage>>,
    /// Latest export from the surface, `None` when the canvas is empty.
    pub drawing: Option<EncodedImage>,
    /// Where the canvas was last rendered, for mouse mapping.
    pub canvas: Option<CanvasGeometry>,
    pub result: Option<QuizResult>,
    pub result_preview: Option<RgbaImage>,
    pub guess_input: TextField,
    pub verdict: Option<AnswerVerdict>,
    pub answer_revealed: bool,
    pub status: Option<StatusMessage>,
    pub pending_request: Option<u64>,
    pub next_request_id: u64,
    pub generation_started: Option<std::time::Instant>,
    pub job_tx: Option<Sender<QuizJob>>,
    pub output_dir: PathBuf,
    pub typeface: Option<Box<dyn CardTypeface>>,
    pub should_quit: bool,
}
