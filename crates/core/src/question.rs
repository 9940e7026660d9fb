use crate::menu::ANSWER_LETTERS;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Reasons a question record is rejected while loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuestionError {
    #[error("question has no options")]
    NoOptions,
    #[error("'{0}' is not an answer letter (expected A, B, C or D)")]
    InvalidLetter(String),
    #[error("option '{0}' is listed more than once")]
    DuplicateOption(String),
    #[error("option '{0}' must be a string")]
    NonTextOption(String),
    #[error("correct option '{0}' is not one of the options")]
    UnknownCorrectOption(String),
}

/// One labelled choice of a question, e.g. `B` → "Mitochondria".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    pub letter: String,
    pub text: String,
}

/// A multiple-choice question as stored in the bank.
///
/// Options keep the order they were written in, and the correct option is
/// guaranteed to be one of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawQuestion")]
pub struct Question {
    prompt: String,
    options: Vec<AnswerOption>,
    correct_option: String,
}

#[derive(Deserialize)]
struct RawQuestion {
    question: String,
    options: Map<String, Value>,
    correct_option: String,
}

impl TryFrom<RawQuestion> for Question {
    type Error = QuestionError;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        let options = raw
            .options
            .into_iter()
            .map(|(letter, text)| match text {
                Value::String(text) => Ok((letter, text)),
                _ => Err(QuestionError::NonTextOption(letter)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Question::new(raw.question, options, raw.correct_option)
    }
}

impl Question {
    pub fn new<L, T>(
        prompt: impl Into<String>,
        options: impl IntoIterator<Item = (L, T)>,
        correct_option: impl Into<String>,
    ) -> Result<Self, QuestionError>
    where
        L: Into<String>,
        T: Into<String>,
    {
        let mut collected: Vec<AnswerOption> = Vec::new();
        for (letter, text) in options {
            let letter = letter.into();
            if !is_answer_letter(&letter) {
                return Err(QuestionError::InvalidLetter(letter));
            }
            if collected.iter().any(|option| option.letter == letter) {
                return Err(QuestionError::DuplicateOption(letter));
            }
            collected.push(AnswerOption {
                letter,
                text: text.into(),
            });
        }
        if collected.is_empty() {
            return Err(QuestionError::NoOptions);
        }

        let correct_option = correct_option.into();
        if !is_answer_letter(&correct_option) {
            return Err(QuestionError::InvalidLetter(correct_option));
        }
        if !collected.iter().any(|option| option.letter == correct_option) {
            return Err(QuestionError::UnknownCorrectOption(correct_option));
        }

        Ok(Self {
            prompt: prompt.into(),
            options: collected,
            correct_option,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    pub fn letters(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|option| option.letter.as_str())
    }

    pub fn correct_option(&self) -> &str {
        &self.correct_option
    }

    pub fn option_text(&self, letter: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.letter == letter)
            .map(|option| option.text.as_str())
    }

    /// Letters that are not among the options are simply wrong.
    pub fn is_correct(&self, letter: &str) -> bool {
        letter == self.correct_option
    }

    /// The correct answer as shown to users, e.g. `B. Mitochondria`.
    pub fn correct_answer(&self) -> String {
        format!(
            "{}. {}",
            self.correct_option,
            self.option_text(&self.correct_option).unwrap_or_default()
        )
    }
}

fn is_answer_letter(letter: &str) -> bool {
    let mut chars = letter.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if ANSWER_LETTERS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_keep_file_order() {
        let json = r#"{
            "question": "Which is largest?",
            "options": { "D": "Jupiter", "A": "Mars", "C": "Earth", "B": "Venus" },
            "correct_option": "D"
        }"#;
        let question: Question = serde_json::from_str(json).unwrap();

        assert_eq!(question.prompt(), "Which is largest?");
        assert_eq!(question.letters().collect::<Vec<_>>(), vec!["D", "A", "C", "B"]);
        assert_eq!(question.correct_answer(), "D. Jupiter");
    }

    #[test]
    fn test_correct_option_must_be_listed() {
        let json = r#"{
            "question": "2 + 2?",
            "options": { "A": "3", "B": "4" },
            "correct_option": "C"
        }"#;
        let err = serde_json::from_str::<Question>(json).unwrap_err();
        assert!(err.to_string().contains("correct option 'C'"));
    }

    #[test]
    fn test_option_text_must_be_string() {
        let json = r#"{
            "question": "2 + 2?",
            "options": { "A": 3, "B": "4" },
            "correct_option": "B"
        }"#;
        let err = serde_json::from_str::<Question>(json).unwrap_err();
        assert!(err.to_string().contains("option 'A' must be a string"));
    }

    #[test]
    fn test_new_rejects_duplicates_and_empty() {
        assert_eq!(
            Question::new("q", [("A", "x"), ("A", "y")], "A").unwrap_err(),
            QuestionError::DuplicateOption("A".to_string())
        );
        assert_eq!(
            Question::new("q", Vec::<(&str, &str)>::new(), "A").unwrap_err(),
            QuestionError::NoOptions
        );
    }

    #[test]
    fn test_letters_must_be_a_to_d() {
        assert_eq!(
            Question::new("q", [("A", "x"), ("E", "five")], "A").unwrap_err(),
            QuestionError::InvalidLetter("E".to_string())
        );
        assert_eq!(
            Question::new("q", [("A", "x"), ("a", "lower")], "A").unwrap_err(),
            QuestionError::InvalidLetter("a".to_string())
        );
        assert_eq!(
            Question::new("q", [("A", "x"), ("B", "y")], "E").unwrap_err(),
            QuestionError::InvalidLetter("E".to_string())
        );
        assert_eq!(
            Question::new("q", [("AB", "x")], "AB").unwrap_err(),
            QuestionError::InvalidLetter("AB".to_string())
        );
        assert!(Question::new("q", [("D", "x"), ("C", "y")], "C").is_ok());
    }

    #[test]
    fn test_unlisted_letter_is_incorrect() {
        let question = Question::new("q", [("A", "x"), ("B", "y")], "B").unwrap();
        assert!(question.is_correct("B"));
        assert!(!question.is_correct("A"));
        assert!(!question.is_correct("D"));
        assert_eq!(question.option_text("D"), None);
    }
}
