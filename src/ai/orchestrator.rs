//! Turns a [`QuizRequest`] into a [`QuizResult`].
//!
//! Two independent requests go to the generative service at the same time:
//! one for the illustration (skipped in submit mode, where the user's drawing
//! is the illustration) and one for the structured example sentence. Both
//! must settle before the result is assembled; a failure in either fails the
//! whole quiz.

use crate::ai::client::{ContentResponse, GenerativeService, InlineImage};
use crate::ai::prompts;
use crate::ai::sentence::{
    PLACEHOLDER, SentencePair, blank_locally, is_blanked_from, parse_sentence_pair,
    sentence_schema,
};
use crate::error::QuizError;
use crate::image_data::{EncodedImage, to_data_uri};
use crate::models::{QuizMode, QuizRequest, QuizResult};
use std::sync::Arc;

/// Where the illustration comes from, decided before any call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePlan {
    UseDrawing(EncodedImage),
    FromSketch(EncodedImage),
    FromSentence(String),
}

/// An acquired illustration, resolved at merge time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Verbatim(EncodedImage),
    ServiceGenerated(ContentResponse),
}

impl ImageSource {
    /// The image as a string usable for display, `None` when unusable.
    pub fn resolve(self) -> Option<String> {
        match self {
            ImageSource::Verbatim(drawing) => {
                if drawing.is_empty() {
                    None
                } else {
                    Some(drawing.into_string())
                }
            }
            ImageSource::ServiceGenerated(response) => response
                .first_inline_image()
                .filter(|image| !image.data.trim().is_empty())
                .map(|image| to_data_uri(&image.mime_type, &image.data)),
        }
    }
}

/// Checks the mode rules and picks the image branch.
pub fn plan_image(request: &QuizRequest) -> Result<ImagePlan, QuizError> {
    if request.word().is_empty() {
        return Err(QuizError::MissingWord);
    }

    match request.mode {
        QuizMode::Submit => match &request.drawing {
            Some(drawing) => Ok(ImagePlan::UseDrawing(drawing.clone())),
            None => Err(QuizError::DrawingRequired),
        },
        QuizMode::Generate => match (&request.drawing, request.sentence()) {
            (Some(drawing), _) => Ok(ImagePlan::FromSketch(drawing.clone())),
            (None, Some(sentence)) => Ok(ImagePlan::FromSentence(sentence.to_string())),
            (None, None) => Err(QuizError::SentenceOrDrawingRequired),
        },
    }
}

pub struct QuizGenerator {
    service: Arc<dyn GenerativeService>,
}

impl QuizGenerator {
    pub fn new(service: Arc<dyn GenerativeService>) -> Self {
        Self { service }
    }

    pub async fn generate_quiz(&self, request: &QuizRequest) -> Result<QuizResult, QuizError> {
        let plan = plan_image(request)?;
        let word = request.word();
        let sentence = request.sentence();

        tracing::info!(
            "Generating quiz for \"{}\" (mode: {:?}, sentence: {}, drawing: {})",
            word,
            request.mode,
            sentence.is_some(),
            request.drawing.is_some()
        );

        let (image, text) = futures::join!(
            self.acquire_image(word, sentence, plan),
            self.acquire_sentence(word, sentence)
        );
        let image = image?;
        let text = text?;

        let image_url = image.resolve().ok_or(QuizError::ImageGenerationFailed)?;
        let pair = parse_sentence_pair(text.text().as_deref())?;
        let pair = finalize_pair(pair, word, sentence)?;

        tracing::info!("Quiz ready for \"{}\"", word);

        Ok(QuizResult {
            image_url,
            original_sentence: pair.original_sentence,
            blanked_sentence: pair.blanked_sentence,
            target_word: word.to_string(),
        })
    }

    async fn acquire_image(
        &self,
        word: &str,
        sentence: Option<&str>,
        plan: ImagePlan,
    ) -> Result<ImageSource, QuizError> {
        match plan {
            ImagePlan::UseDrawing(drawing) => {
                tracing::debug!("Using submitted drawing as the quiz image");
                Ok(ImageSource::Verbatim(drawing))
            }
            ImagePlan::FromSketch(drawing) => {
                tracing::debug!("Requesting sketch-to-illustration");
                let sketch = InlineImage {
                    mime_type: drawing.mime_type().to_string(),
                    data: drawing.payload().to_string(),
                };
                let prompt = prompts::sketch_to_illustration(word, sentence);
                let response = self.service.generate_image(&prompt, Some(&sketch)).await?;
                Ok(ImageSource::ServiceGenerated(response))
            }
            ImagePlan::FromSentence(sentence) => {
                tracing::debug!("Requesting text-to-illustration");
                let prompt = prompts::text_to_illustration(word, &sentence);
                let response = self.service.generate_image(&prompt, None).await?;
                Ok(ImageSource::ServiceGenerated(response))
            }
        }
    }

    async fn acquire_sentence(
        &self,
        word: &str,
        sentence: Option<&str>,
    ) -> Result<ContentResponse, QuizError> {
        let prompt = match sentence {
            Some(sentence) => prompts::blank_sentence(word, sentence),
            None => prompts::author_sentence(word),
        };
        let response = self
            .service
            .generate_structured(&prompt, &sentence_schema())
            .await?;
        tracing::debug!("Raw sentence response: {:?}", response.text());
        Ok(response)
    }
}

/// Trims the pair and makes sure the blanked sentence is the original with
/// only the target replaced. A user-supplied sentence is kept as written.
fn finalize_pair(
    mut pair: SentencePair,
    word: &str,
    sentence: Option<&str>,
) -> Result<SentencePair, QuizError> {
    pair.original_sentence = match sentence {
        Some(sentence) => {
            if pair.original_sentence.trim() != sentence {
                tracing::warn!("Service rewrote the supplied sentence, keeping the original");
            }
            sentence.to_string()
        }
        None => pair.original_sentence.trim().to_string(),
    };
    pair.blanked_sentence = pair.blanked_sentence.trim().to_string();

    if pair.original_sentence.is_empty() || pair.blanked_sentence.is_empty() {
        return Err(QuizError::SentenceGenerationFailed(
            "the service returned an incomplete sentence".to_string(),
        ));
    }

    if !is_blanked_from(&pair.blanked_sentence, &pair.original_sentence) {
        tracing::warn!(
            "Blanked sentence does not match the original, blanking \"{}\" locally",
            word
        );
        pair.blanked_sentence = blank_locally(&pair.original_sentence, word);
        if !pair.blanked_sentence.contains(PLACEHOLDER) {
            return Err(QuizError::SentenceGenerationFailed(format!(
                "the sentence does not contain \"{}\"",
                word
            )));
        }
    }

    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::client::{MockCall, MockService};
    use crate::ai::sentence::count_placeholders;

    const DRAWING: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUg==";

    fn request(
        word: &str,
        sentence: &str,
        drawing: Option<&str>,
        mode: QuizMode,
    ) -> QuizRequest {
        QuizRequest::new(word, sentence, drawing.map(EncodedImage::new), mode)
    }

    fn generator(service: &Arc<MockService>) -> QuizGenerator {
        QuizGenerator::new(service.clone())
    }

    #[test]
    fn test_plan_submit_requires_drawing() {
        let err =
            plan_image(&request("improve", "A sentence.", None, QuizMode::Submit)).unwrap_err();
        assert!(matches!(err, QuizError::DrawingRequired));
    }

    #[test]
    fn test_plan_generate_requires_sentence_or_drawing() {
        let err = plan_image(&request("launch", "", None, QuizMode::Generate)).unwrap_err();
        assert!(matches!(err, QuizError::SentenceOrDrawingRequired));

        let err = plan_image(&request("launch", "   ", None, QuizMode::Generate)).unwrap_err();
        assert!(matches!(err, QuizError::SentenceOrDrawingRequired));
    }

    #[test]
    fn test_plan_requires_word() {
        let err = plan_image(&request("  ", "x", Some(DRAWING), QuizMode::Submit)).unwrap_err();
        assert!(matches!(err, QuizError::MissingWord));
    }

    #[test]
    fn test_plan_branches() {
        assert_eq!(
            plan_image(&request("w", "", Some(DRAWING), QuizMode::Submit)).unwrap(),
            ImagePlan::UseDrawing(EncodedImage::new(DRAWING))
        );
        assert_eq!(
            plan_image(&request("w", "s w.", Some(DRAWING), QuizMode::Generate)).unwrap(),
            ImagePlan::FromSketch(EncodedImage::new(DRAWING))
        );
        assert_eq!(
            plan_image(&request("w", " s w. ", None, QuizMode::Generate)).unwrap(),
            ImagePlan::FromSentence("s w.".to_string())
        );
    }

    #[test]
    fn test_resolve_verbatim_keeps_bytes() {
        let source = ImageSource::Verbatim(EncodedImage::new(DRAWING));
        assert_eq!(source.resolve().as_deref(), Some(DRAWING));
    }

    #[test]
    fn test_resolve_service_uses_first_inline_image() {
        let response = ContentResponse {
            parts: vec![
                crate::ai::client::ContentPart::Text("caption".to_string()),
                crate::ai::client::ContentPart::InlineImage(InlineImage {
                    mime_type: "image/jpeg".to_string(),
                    data: "Rklyc3Q=".to_string(),
                }),
                crate::ai::client::ContentPart::InlineImage(InlineImage {
                    mime_type: "image/png".to_string(),
                    data: "U2Vjb25k".to_string(),
                }),
            ],
        };
        assert_eq!(
            ImageSource::ServiceGenerated(response).resolve().as_deref(),
            Some("data:image/jpeg;base64,Rklyc3Q=")
        );
    }

    #[test]
    fn test_resolve_without_image_is_none() {
        let source = ImageSource::ServiceGenerated(ContentResponse::from_text("no image today"));
        assert!(source.resolve().is_none());
        let empty =
            ImageSource::ServiceGenerated(ContentResponse::from_inline_image("image/png", " "));
        assert!(empty.resolve().is_none());
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_call() {
        let service = Arc::new(MockService::with_sentences("x", "_____"));
        let generator = generator(&service);

        let err = generator
            .generate_quiz(&request("improve", "She improves.", None, QuizMode::Submit))
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::DrawingRequired));

        let err = generator
            .generate_quiz(&request("launch", "", None, QuizMode::Generate))
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::SentenceOrDrawingRequired));

        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_never_generates_image() {
        let original = "She worked hard to improve the design.";
        let blanked = "She worked hard to _____ the design.";
        let service = Arc::new(MockService::with_sentences(original, blanked));

        let result = generator(&service)
            .generate_quiz(&request("improve", original, Some(DRAWING), QuizMode::Submit))
            .await
            .unwrap();

        assert_eq!(service.image_calls(), 0);
        assert_eq!(service.structured_calls(), 1);
        assert_eq!(result.image_url, DRAWING);
        assert_eq!(result.target_word, "improve");
        assert_eq!(result.original_sentence, original);
        assert_eq!(count_placeholders(&result.blanked_sentence), 1);
    }

    #[tokio::test]
    async fn test_generate_from_sketch_strips_header() {
        let service = Arc::new(MockService::with_sentences(
            "They launch rockets.",
            "They _____ rockets.",
        ));

        let result = generator(&service)
            .generate_quiz(&request(
                "launch",
                "They launch rockets.",
                Some(DRAWING),
                QuizMode::Generate,
            ))
            .await
            .unwrap();

        let image_call = service
            .calls()
            .into_iter()
            .find(|c| matches!(c, MockCall::Image { .. }))
            .unwrap();
        match image_call {
            MockCall::Image { prompt, sketch } => {
                let sketch = sketch.unwrap();
                assert_eq!(sketch.data, "iVBORw0KGgoAAAANSUhEUg==");
                assert_eq!(sketch.mime_type, "image/png");
                assert!(prompt.contains("\"launch\""));
                assert!(prompt.contains("They launch rockets."));
            }
            MockCall::Structured { .. } => unreachable!(),
        }
        assert_eq!(result.image_url, "data:image/png;base64,iVBORw0KGgo=");
    }

    #[tokio::test]
    async fn test_generate_from_sentence_sends_no_sketch() {
        let service = Arc::new(MockService::with_sentences(
            "They launch rockets.",
            "They _____ rockets.",
        ));

        generator(&service)
            .generate_quiz(&request("launch", "They launch rockets.", None, QuizMode::Generate))
            .await
            .unwrap();

        assert!(service.calls().iter().any(|c| matches!(
            c,
            MockCall::Image { sketch: None, prompt } if prompt.contains("\"They launch rockets.\"")
        )));
    }

    #[tokio::test]
    async fn test_missing_sentence_asks_service_to_author_one() {
        let service = Arc::new(MockService::with_sentences(
            "Engineers launch satellites.",
            "Engineers _____ satellites.",
        ));

        let result = generator(&service)
            .generate_quiz(&request("launch", "", Some(DRAWING), QuizMode::Submit))
            .await
            .unwrap();

        let authored = service.calls().into_iter().any(|c| match c {
            MockCall::Structured { prompt } => prompt.contains("Write one short"),
            MockCall::Image { .. } => false,
        });
        assert!(authored);
        assert_eq!(result.original_sentence, "Engineers launch satellites.");
    }

    #[tokio::test]
    async fn test_missing_image_fails() {
        let service = Arc::new(MockService::new(
            ContentResponse::from_text("I cannot draw that."),
            ContentResponse::from_text(
                r#"{"originalSentence":"They launch.","blankedSentence":"They _____."}"#,
            ),
        ));

        let err = generator(&service)
            .generate_quiz(&request("launch", "They launch.", None, QuizMode::Generate))
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::ImageGenerationFailed));
        assert_eq!(err.user_message(), "image generation/processing failed");
    }

    #[tokio::test]
    async fn test_image_failure_still_waits_for_sentence() {
        let service = Arc::new(
            MockService::with_sentences("They launch.", "They _____.").failing_image("boom"),
        );

        let err = generator(&service)
            .generate_quiz(&request("launch", "They launch.", None, QuizMode::Generate))
            .await
            .unwrap_err();

        assert!(matches!(err, QuizError::Service(_)));
        assert_eq!(service.image_calls(), 1);
        assert_eq!(service.structured_calls(), 1);
    }

    #[tokio::test]
    async fn test_sentence_failure_fails_quiz() {
        let service = Arc::new(
            MockService::with_sentences("They launch.", "They _____.").failing_structured("down"),
        );

        let err = generator(&service)
            .generate_quiz(&request("launch", "They launch.", Some(DRAWING), QuizMode::Submit))
            .await
            .unwrap_err();
        assert!(err.user_message().contains("down"));
    }

    #[tokio::test]
    async fn test_empty_structured_payload_is_rejected() {
        let service = Arc::new(MockService::new(
            ContentResponse::from_inline_image("image/png", "QUJD"),
            ContentResponse::default(),
        ));

        let err = generator(&service)
            .generate_quiz(&request("launch", "They launch.", None, QuizMode::Generate))
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::SentenceGenerationFailed(_)));
    }

    #[tokio::test]
    async fn test_missing_placeholder_is_blanked_locally() {
        let service = Arc::new(MockService::with_sentences(
            "She improved the draft.",
            "She improved the draft.",
        ));

        let result = generator(&service)
            .generate_quiz(&request(
                "improve",
                "She improved the draft.",
                Some(DRAWING),
                QuizMode::Submit,
            ))
            .await
            .unwrap();
        assert_eq!(result.blanked_sentence, "She _____ the draft.");
    }

    #[tokio::test]
    async fn test_paraphrased_sentence_is_replaced_by_the_supplied_one() {
        let service = Arc::new(MockService::with_sentences(
            "She tried to improve the plan.",
            "She tried to _____ the plan.",
        ));

        let result = generator(&service)
            .generate_quiz(&request(
                "improve",
                "She worked hard to improve the design.",
                Some(DRAWING),
                QuizMode::Submit,
            ))
            .await
            .unwrap();

        assert_eq!(result.original_sentence, "She worked hard to improve the design.");
        assert_eq!(result.blanked_sentence, "She worked hard to _____ the design.");
    }

    #[tokio::test]
    async fn test_blanked_sentence_dropping_words_is_redone_locally() {
        let original = "She worked hard to improve the design.";
        let service = Arc::new(MockService::with_sentences(original, "She _____ the design."));

        let result = generator(&service)
            .generate_quiz(&request("improve", original, Some(DRAWING), QuizMode::Submit))
            .await
            .unwrap();
        assert_eq!(result.blanked_sentence, "She worked hard to _____ the design.");
    }

    #[tokio::test]
    async fn test_word_is_trimmed() {
        let service = Arc::new(MockService::with_sentences("We launch.", "We _____."));
        let result = generator(&service)
            .generate_quiz(&request("  launch ", "We launch.", Some(DRAWING), QuizMode::Submit))
            .await
            .unwrap();
        assert_eq!(result.target_word, "launch");
    }
}
