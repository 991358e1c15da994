pub mod client;
pub mod orchestrator;
pub mod prompts;
pub mod sentence;

// Public API exports
pub use client::{ContentPart, ContentResponse, GeminiClient, GenerativeService, InlineImage};
pub use orchestrator::{ImagePlan, ImageSource, QuizGenerator, plan_image};
pub use sentence::{PLACEHOLDER, SentencePair};
