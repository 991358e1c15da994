pub mod ai;
pub mod ai_worker;
pub mod answer;
pub mod card;
pub mod config;
pub mod drawing;
pub mod error;
pub mod image_data;
pub mod input;
pub mod logger;
pub mod models;
pub mod samples;
pub mod session;
pub mod ui;


// Re-exports for convenience
pub use ai::{GeminiClient, GenerativeService, QuizGenerator};
pub use config::Config;
pub use drawing::{DrawingSurface, PointerEvent};
pub use error::{QuizError, ServiceError};
pub use image_data::EncodedImage;
pub use models::{App, AppState, QuizMode, QuizRequest, QuizResult};
pub use session::{handle_key, handle_mouse};
pub use ui::{draw_compose, draw_generating, draw_quit_confirmation, draw_quiz};
