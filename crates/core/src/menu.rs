//! Button labels, input parsing and keyboard layouts.
//!
//! Every label a user can press is defined here once. The same tables are
//! used to render keyboards and to turn incoming text back into an `Input`,
//! so a renamed button can never drift away from its handler.

use crate::{Keyboard, question::Question};
use std::fmt;

pub const START_COMMAND: &str = "/start";
pub const BACK: &str = "Back";
pub const EXIT: &str = "Exit";
pub const NEXT: &str = "Next";
pub const SHOW_ANSWER: &str = "Show Answer";
pub const SOCIAL: &str = "Social";

/// Units offered on the unit keyboard. Larger numbers are still accepted
/// when typed, the bank decides whether they exist.
pub const UNIT_COUNT: u32 = 5;

/// Letters accepted as an answer to the current question.
pub const ANSWER_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grade {
    Nine,
    Ten,
    Eleven,
    Twelve,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Nine, Grade::Ten, Grade::Eleven, Grade::Twelve];

    pub fn number(self) -> u8 {
        match self {
            Grade::Nine => 9,
            Grade::Ten => 10,
            Grade::Eleven => 11,
            Grade::Twelve => 12,
        }
    }

    pub fn label(self) -> String {
        format!("Grade {}", self.number())
    }

    fn from_number(number: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|grade| grade.number().to_string() == number)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// The subjects under the "Social" sub-menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocialSubject {
    History,
    Geography,
    Civics,
    Economics,
}

impl SocialSubject {
    pub const ALL: [SocialSubject; 4] = [
        SocialSubject::History,
        SocialSubject::Geography,
        SocialSubject::Civics,
        SocialSubject::Economics,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SocialSubject::History => "History",
            SocialSubject::Geography => "Geography",
            SocialSubject::Civics => "Civics",
            SocialSubject::Economics => "Economics",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Math,
    Biology,
    Chemistry,
    Physics,
    English,
    Social(SocialSubject),
}

impl Subject {
    /// Subjects listed directly on the subject keyboard, in display order.
    pub const TOP_LEVEL: [Subject; 5] = [
        Subject::Math,
        Subject::Biology,
        Subject::Chemistry,
        Subject::Physics,
        Subject::English,
    ];

    /// Every subject a user can end up with, including the social ones.
    pub fn all() -> impl Iterator<Item = Subject> {
        Self::TOP_LEVEL
            .into_iter()
            .chain(SocialSubject::ALL.into_iter().map(Subject::Social))
    }

    pub fn label(self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::Biology => "Biology",
            Subject::Chemistry => "Chemistry",
            Subject::Physics => "Physics",
            Subject::English => "English",
            Subject::Social(social) => social.label(),
        }
    }

    /// The storage segment for this subject, e.g. `math` or `social/history`.
    pub fn path(self) -> String {
        match self {
            Subject::Social(social) => format!("social/{}", social.label().to_lowercase()),
            other => other.label().to_lowercase(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// A recognized user input. Anything that does not parse is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Start,
    Grade(Grade),
    Subject(Subject),
    SocialMenu,
    Unit(u32),
    ShowAnswer,
    Next,
    Exit,
    Back,
    Answer(char),
}

impl Input {
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if is_start_command(text) {
            return Some(Input::Start);
        }

        match text {
            BACK => return Some(Input::Back),
            EXIT => return Some(Input::Exit),
            NEXT => return Some(Input::Next),
            SHOW_ANSWER => return Some(Input::ShowAnswer),
            SOCIAL => return Some(Input::SocialMenu),
            _ => {}
        }

        if let Some(grade) = text.strip_prefix("Grade ").and_then(Grade::from_number) {
            return Some(Input::Grade(grade));
        }

        if let Some(subject) = Subject::all().find(|subject| subject.label() == text) {
            return Some(Input::Subject(subject));
        }

        if let Some(unit) = text.strip_prefix("Unit ").and_then(parse_unit_number) {
            return Some(Input::Unit(unit));
        }

        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) if ANSWER_LETTERS.contains(&letter) => Some(Input::Answer(letter)),
            _ => None,
        }
    }
}

/// Accepts `/start`, `/start@SomeBot` and `/start <payload>`.
fn is_start_command(text: &str) -> bool {
    match text.strip_prefix(START_COMMAND) {
        Some(rest) => rest.is_empty() || rest.starts_with('@') || rest.starts_with(' '),
        None => false,
    }
}

/// Numbers too large for `u32` saturate; no bank holds such a unit, so the
/// user gets the usual not-found warning.
fn parse_unit_number(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse().unwrap_or(u32::MAX))
}

fn in_pairs(labels: Vec<String>) -> Keyboard {
    labels.chunks(2).map(<[String]>::to_vec).collect()
}

pub fn grade_keyboard() -> Keyboard {
    in_pairs(Grade::ALL.into_iter().map(Grade::label).collect())
}

pub fn subject_keyboard() -> Keyboard {
    let mut rows = in_pairs(
        Subject::TOP_LEVEL
            .into_iter()
            .map(|subject| subject.label().to_string())
            .chain(std::iter::once(SOCIAL.to_string()))
            .collect(),
    );
    rows.push(vec![BACK.to_string()]);
    rows
}

pub fn social_keyboard() -> Keyboard {
    let mut rows = in_pairs(
        SocialSubject::ALL
            .into_iter()
            .map(|social| social.label().to_string())
            .collect(),
    );
    rows.push(vec![BACK.to_string()]);
    rows
}

pub fn unit_keyboard() -> Keyboard {
    in_pairs(
        (1..=UNIT_COUNT)
            .map(|unit| format!("Unit {unit}"))
            .chain(std::iter::once(BACK.to_string()))
            .collect(),
    )
}

/// The keyboard shown under a question: its option letters, then the quiz
/// controls.
pub fn quiz_keyboard(question: &Question) -> Keyboard {
    vec![
        question.letters().map(str::to_string).collect(),
        vec![SHOW_ANSWER.to_string(), NEXT.to_string()],
        vec![BACK.to_string(), EXIT.to_string()],
    ]
}
