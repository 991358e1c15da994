use crate::ai::sentence::PLACEHOLDER;

const NO_TEXT_RULE: &str =
    "Do not include any text, letters, numbers, or captions anywhere in the image.";

/// Prompt for turning the user's sketch into an illustration.
pub fn sketch_to_illustration(word: &str, sentence: Option<&str>) -> String {
    let mut prompt = format!(
        "Transform this rough sketch into a clear, colorful illustration that depicts \
         the word \"{}\". Keep the composition of the sketch.",
        word
    );
    if let Some(sentence) = sentence {
        prompt.push_str(&format!(
            " The illustration should capture the meaning of this sentence: \"{}\".",
            sentence
        ));
    }
    prompt.push(' ');
    prompt.push_str(NO_TEXT_RULE);
    prompt
}

/// Prompt for illustrating a sentence without a sketch.
pub fn text_to_illustration(word: &str, sentence: &str) -> String {
    format!(
        "Create a clear, colorful illustration of the following sentence: \"{}\". \
         The visual focus should be the meaning of the word \"{}\". {}",
        sentence, word, NO_TEXT_RULE
    )
}

/// Prompt for blanking the word in a user-supplied sentence.
pub fn blank_sentence(word: &str, sentence: &str) -> String {
    format!(
        "Here is a sentence: \"{}\"\n\
         Return \"originalSentence\" as the sentence exactly as given, and \"blankedSentence\" \
         as the same sentence with the word \"{}\" and any of its morphological variants \
         (plural, tense, participle, comparative) replaced by \"{}\". Change nothing else: \
         keep punctuation, spacing and every other word.",
        sentence, word, PLACEHOLDER
    )
}

/// Prompt for authoring a new example sentence and its blanked form.
pub fn author_sentence(word: &str) -> String {
    format!(
        "Write one short, natural, educational example sentence that uses the word \"{}\" \
         so its meaning is clear from context. Return it as \"originalSentence\", and return \
         \"blankedSentence\" as the same sentence with \"{}\" (or the variant you used) \
         replaced by \"{}\".",
        word, word, PLACEHOLDER
    )
}
