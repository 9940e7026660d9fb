//! Question Bank
//!
//! This module resolves a (grade, subject, unit) triple to its ordered list of
//! questions. The bank is read-only from the bot's point of view. Loading can
//! fail in distinct ways (missing, malformed, empty, unreadable) and each
//! failure carries the user-facing warning the bot replies with.

use crate::{
    menu::{Grade, Subject},
    question::Question,
};
use async_trait::async_trait;
use serde::{Deserialize, de::Error as _};
use serde_json::Value;
use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

/// Addresses one partition of the bank, displayed as `grade{G}/{subject}/unit{U}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitKey {
    pub grade: Grade,
    pub subject: Subject,
    pub unit: u32,
}

impl UnitKey {
    pub fn new(grade: Grade, subject: Subject, unit: u32) -> Self {
        Self {
            grade,
            subject,
            unit,
        }
    }

    /// The file backing this unit, relative to the bank root.
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::from(format!("grade{}", self.grade));
        for segment in self.subject.path().split('/') {
            path.push(segment);
        }
        path.push(format!("unit{}.json", self.unit));
        path
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grade{}/{}/unit{}", self.grade, self.subject, self.unit)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("no question file for {0}")]
    NotFound(UnitKey),
    #[error("question file for {key} is malformed: {source}")]
    Malformed {
        key: UnitKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("question file for {0} has no questions")]
    Empty(UnitKey),
    #[error("failed to read question file for {key}: {source}")]
    Unreadable {
        key: UnitKey,
        #[source]
        source: std::io::Error,
    },
}

impl BankError {
    /// The warning shown to the user, who stays on the unit menu.
    pub fn user_message(&self) -> &'static str {
        match self {
            BankError::NotFound(_) => "⚠ No questions found for this unit.",
            BankError::Malformed { .. } => {
                "⚠ The questions for this unit could not be read. Please choose another unit."
            }
            BankError::Empty(_) => "⚠ This unit has no questions.",
            BankError::Unreadable { .. } => {
                "⚠ Questions for this unit are unavailable right now. Please try again later."
            }
        }
    }
}

/// Defines the contract for any store that can serve unit questions.
///
/// An `Ok` result is never empty; an empty unit is reported as
/// `BankError::Empty`.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    async fn load_unit(&self, key: &UnitKey) -> Result<Vec<Question>, BankError>;
}

/// A bank backed by one JSON file per unit under a root directory.
pub struct FileQuestionBank {
    root: PathBuf,
}

impl FileQuestionBank {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl QuestionBank for FileQuestionBank {
    async fn load_unit(&self, key: &UnitKey) -> Result<Vec<Question>, BankError> {
        let path = self.root.join(key.relative_path());
        let bytes = tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                BankError::NotFound(key.clone())
            } else {
                BankError::Unreadable {
                    key: key.clone(),
                    source,
                }
            }
        })?;
        tracing::debug!(unit = %key, path = %path.display(), bytes = bytes.len(), "Read unit file");
        parse_unit(key, &bytes)
    }
}

#[derive(Deserialize)]
struct UnitRecord {
    #[serde(default)]
    questions: Option<Vec<Question>>,
}

/// Decodes a unit file.
///
/// The file is either an array whose first element is the unit record, or
/// the record itself. A missing or null `questions` field counts as empty.
pub fn parse_unit(key: &UnitKey, bytes: &[u8]) -> Result<Vec<Question>, BankError> {
    let malformed = |source| BankError::Malformed {
        key: key.clone(),
        source,
    };

    let record = match serde_json::from_slice::<Value>(bytes).map_err(malformed)? {
        Value::Array(records) => match records.into_iter().next() {
            Some(Value::Null) | None => return Err(BankError::Empty(key.clone())),
            Some(first) => first,
        },
        record @ Value::Object(_) => record,
        _ => {
            return Err(malformed(serde_json::Error::custom(
                "expected a unit record or an array of unit records",
            )));
        }
    };

    let record: UnitRecord = serde_json::from_value(record).map_err(malformed)?;
    match record.questions {
        Some(questions) if !questions.is_empty() => Ok(questions),
        _ => Err(BankError::Empty(key.clone())),
    }
}

/// An in-memory bank for development and tests.
#[derive(Default)]
pub struct StaticQuestionBank {
    units: HashMap<UnitKey, Vec<Question>>,
}

impl StaticQuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, key: UnitKey, questions: Vec<Question>) -> Self {
        self.units.insert(key, questions);
        self
    }
}

#[async_trait]
impl QuestionBank for StaticQuestionBank {
    async fn load_unit(&self, key: &UnitKey) -> Result<Vec<Question>, BankError> {
        match self.units.get(key) {
            None => Err(BankError::NotFound(key.clone())),
            Some(questions) if questions.is_empty() => Err(BankError::Empty(key.clone())),
            Some(questions) => Ok(questions.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::SocialSubject;
    use tempfile::TempDir;

    const ONE_QUESTION: &str = r#"[{
        "questions": [
            {
                "question": "What is 3 x 4?",
                "options": { "A": "7", "B": "12", "C": "34", "D": "1" },
                "correct_option": "B"
            }
        ]
    }]"#;

    fn math_unit(unit: u32) -> UnitKey {
        UnitKey::new(Grade::Ten, Subject::Math, unit)
    }

    fn write_unit(dir: &TempDir, key: &UnitKey, contents: &str) {
        let path = dir.path().join(key.relative_path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_unit_key_paths() {
        let key = UnitKey::new(Grade::Nine, Subject::Social(SocialSubject::History), 4);
        assert_eq!(key.to_string(), "grade9/social/history/unit4");
        assert_eq!(
            key.relative_path(),
            PathBuf::from("grade9").join("social").join("history").join("unit4.json")
        );
    }

    #[tokio::test]
    async fn test_file_bank_loads_questions() {
        let dir = TempDir::new().unwrap();
        let key = math_unit(2);
        write_unit(&dir, &key, ONE_QUESTION);

        let bank = FileQuestionBank::new(dir.path());
        let questions = bank.load_unit(&key).await.unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].prompt(), "What is 3 x 4?");
        assert_eq!(questions[0].correct_option(), "B");
    }

    #[tokio::test]
    async fn test_file_bank_accepts_bare_record() {
        let dir = TempDir::new().unwrap();
        let key = math_unit(1);
        let bare = ONE_QUESTION.trim().trim_start_matches('[').trim_end_matches(']');
        write_unit(&dir, &key, bare);

        let questions = FileQuestionBank::new(dir.path()).load_unit(&key).await.unwrap();
        assert_eq!(questions.len(), 1);
    }

    #[tokio::test]
    async fn test_file_bank_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = FileQuestionBank::new(dir.path())
            .load_unit(&math_unit(3))
            .await
            .unwrap_err();
        assert!(matches!(err, BankError::NotFound(_)));
        assert_eq!(err.user_message(), "⚠ No questions found for this unit.");
    }

    #[tokio::test]
    async fn test_file_bank_malformed_json() {
        let dir = TempDir::new().unwrap();
        let key = math_unit(1);
        write_unit(&dir, &key, "{ not json");

        let err = FileQuestionBank::new(dir.path()).load_unit(&key).await.unwrap_err();
        assert!(matches!(err, BankError::Malformed { .. }));
    }

    #[test]
    fn test_parse_unit_shapes() {
        let key = math_unit(1);

        for empty in [r#"[]"#, r#"[null]"#, r#"[{}]"#, r#"[{"questions": []}]"#, r#"{"questions": null}"#] {
            let err = parse_unit(&key, empty.as_bytes()).unwrap_err();
            assert!(matches!(err, BankError::Empty(_)), "{empty} should be empty");
        }

        for malformed in [
            r#""just a string""#,
            r#"[{"questions": "nope"}]"#,
            r#"[{"questions": [{"question": "q", "options": {"A": "x"}, "correct_option": "B"}]}]"#,
            r#"[{"questions": [{"question": "q", "options": {"A": "x", "E": "y"}, "correct_option": "A"}]}]"#,
            r#"[{"questions": [{"question": "q", "options": {"a": "x", "b": "y"}, "correct_option": "a"}]}]"#,
        ] {
            let err = parse_unit(&key, malformed.as_bytes()).unwrap_err();
            assert!(
                matches!(err, BankError::Malformed { .. }),
                "{malformed} should be malformed"
            );
        }
    }

    #[tokio::test]
    async fn test_static_bank() {
        let question = Question::new("q", [("A", "x")], "A").unwrap();
        let bank = StaticQuestionBank::new()
            .with_unit(math_unit(1), vec![question])
            .with_unit(math_unit(2), vec![]);

        assert_eq!(bank.load_unit(&math_unit(1)).await.unwrap().len(), 1);
        assert!(matches!(
            bank.load_unit(&math_unit(2)).await,
            Err(BankError::Empty(_))
        ));
        assert!(matches!(
            bank.load_unit(&math_unit(3)).await,
            Err(BankError::NotFound(_))
        ));
    }
}
