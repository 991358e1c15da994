#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerVerdict {
    Correct,
    Incorrect,
}

fn normalize(word: &str) -> String {
    word.trim()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// Compares a guess with the target word, ignoring case and surrounding
/// punctuation. Blank guesses yield `None`.
pub fn check_answer(guess: &str, target: &str) -> Option<AnswerVerdict> {
    let guess = normalize(guess);
    if guess.is_empty() {
        return None;
    }
    if guess == normalize(target) {
        Some(AnswerVerdict::Correct)
    } else {
        Some(AnswerVerdict::Incorrect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert_eq!(check_answer("improve", "improve"), Some(AnswerVerdict::Correct));
    }

    #[test]
    fn test_case_and_punctuation_ignored() {
        assert_eq!(check_answer("  Improve! ", "improve"), Some(AnswerVerdict::Correct));
    }

    #[test]
    fn test_wrong_answer() {
        assert_eq!(check_answer("enhance", "improve"), Some(AnswerVerdict::Incorrect));
    }

    #[test]
    fn test_blank_guess() {
        assert_eq!(check_answer("  ", "improve"), None);
        assert_eq!(check_answer("?!", "improve"), None);
    }

    #[test]
    fn test_multi_word_target() {
        assert_eq!(check_answer("Take off", "take off"), Some(AnswerVerdict::Correct));
    }
}
