use thiserror::Error;

/// Fallback shown when an unexpected failure carries no useful message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong while creating the quiz.";

/// Errors produced while turning a quiz request into a quiz result.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("a target word is required")]
    MissingWord,

    #[error("drawing required for submit mode")]
    DrawingRequired,

    #[error("sentence or drawing required for generate mode")]
    SentenceOrDrawingRequired,

    #[error("image generation/processing failed")]
    ImageGenerationFailed,

    #[error("sentence generation failed: {0}")]
    SentenceGenerationFailed(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl QuizError {
    /// Input problems detected before any service call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingWord | Self::DrawingRequired | Self::SentenceOrDrawingRequired
        )
    }

    /// Text for the status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Service(inner) => {
                let message = inner.to_string();
                if message.trim().is_empty() {
                    GENERIC_FAILURE_MESSAGE.to_string()
                } else {
                    message
                }
            }
            other => other.to_string(),
        }
    }
}

/// Failures talking to the generative service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no API key configured (set GEMINI_API_KEY or VISUAL_VOCAB_API_KEY)")]
    MissingApiKey,

    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed service response: {0}")]
    Decode(String),
}

/// Failures decoding or encoding an [`crate::image_data::EncodedImage`].
#[derive(Debug, Error)]
pub enum ImageDataError {
    #[error("invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),
}

/// Failures while producing a share card.
#[derive(Debug, Error)]
pub enum CardError {
    #[error(transparent)]
    Image(#[from] ImageDataError),

    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("source image has zero size")]
    EmptyImage,

    #[error("source image {width}x{height} is too tall for a card")]
    ImageTooTall { width: u32, height: u32 },

    #[error("no card font available")]
    FontUnavailable,

    #[error("invalid font data: {0}")]
    InvalidFont(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),
}
