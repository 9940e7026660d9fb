//! Per-user session state and the store that owns it.

use crate::{
    bank::UnitKey,
    menu::{Grade, Subject},
    question::Question,
};
use std::{collections::HashMap, fmt, sync::Arc};
use tokio::sync::Mutex;

/// Identifies whose session a message belongs to: the sender within a chat.
///
/// Members of a group chat each get their own session. `user` is `None` only
/// for messages without a sender, which then share the chat's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId {
    pub chat: i64,
    pub user: Option<u64>,
}

impl UserId {
    pub const fn new(chat: i64, user: Option<u64>) -> Self {
        Self { chat, user }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.user {
            Some(user) => write!(f, "{}:{}", self.chat, user),
            None => write!(f, "{}", self.chat),
        }
    }
}

/// The menu (or quiz) a user is currently looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    Grade,
    Subject,
    Social,
    Unit,
    Quiz,
}

impl Step {
    /// Where "Back" leads from this step. The grade menu has no parent.
    pub fn previous(self) -> Option<Step> {
        match self {
            Step::Grade => None,
            Step::Subject => Some(Step::Grade),
            Step::Social | Step::Unit => Some(Step::Subject),
            Step::Quiz => Some(Step::Unit),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Grade => "grade",
            Step::Subject => "subject",
            Step::Social => "social",
            Step::Unit => "unit",
            Step::Quiz => "quiz",
        };
        f.write_str(name)
    }
}

/// The questions of a running quiz and the position within them.
///
/// `index` always points at an existing question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizProgress {
    questions: Vec<Question>,
    index: usize,
}

impl QuizProgress {
    /// Returns `None` for an empty question list.
    pub fn new(questions: Vec<Question>) -> Option<Self> {
        if questions.is_empty() {
            None
        } else {
            Some(Self {
                questions,
                index: 0,
            })
        }
    }

    pub fn current(&self) -> &Question {
        &self.questions[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Moves to the next question. Returns `false` when the current question
    /// was the last one, leaving the position unchanged.
    pub fn advance(&mut self) -> bool {
        if self.index + 1 < self.questions.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }
}

/// Everything the bot remembers about one user between messages.
///
/// `quiz` is present exactly when `step` is `Step::Quiz`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    step: Step,
    grade: Option<Grade>,
    subject: Option<Subject>,
    quiz: Option<QuizProgress>,
}

impl Session {
    pub fn step(&self) -> Step {
        self.step
    }

    pub fn grade(&self) -> Option<Grade> {
        self.grade
    }

    pub fn subject(&self) -> Option<Subject> {
        self.subject
    }

    pub fn quiz(&self) -> Option<&QuizProgress> {
        self.quiz.as_ref()
    }

    pub(crate) fn quiz_mut(&mut self) -> Option<&mut QuizProgress> {
        self.quiz.as_mut()
    }

    /// Back to a blank session on the grade menu.
    pub fn reset(&mut self) {
        *self = Session::default();
    }

    pub(crate) fn select_grade(&mut self, grade: Grade) {
        self.grade = Some(grade);
        self.quiz = None;
        self.step = Step::Subject;
    }

    pub(crate) fn open_social(&mut self) {
        self.quiz = None;
        self.step = Step::Social;
    }

    pub(crate) fn select_subject(&mut self, subject: Subject) {
        self.subject = Some(subject);
        self.quiz = None;
        self.step = Step::Unit;
    }

    pub(crate) fn start_quiz(&mut self, progress: QuizProgress) {
        self.quiz = Some(progress);
        self.step = Step::Quiz;
    }

    /// Steps back one menu, returning the new step, or `None` on the grade
    /// menu where there is nothing to go back to.
    pub(crate) fn back(&mut self) -> Option<Step> {
        let previous = self.step.previous()?;
        self.quiz = None;
        self.step = previous;
        Some(previous)
    }

    /// The bank key for `unit`, once both grade and subject are chosen.
    pub fn unit_key(&self, unit: u32) -> Option<UnitKey> {
        Some(UnitKey::new(self.grade?, self.subject?, unit))
    }
}

/// Maps each user to their session.
///
/// Every user gets their own lock, so one user's slow bank lookup never
/// blocks another user. The map lock is only held to find or create an
/// entry.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<UserId, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's session, creating a blank one on first contact.
    pub async fn session(&self, user: UserId) -> Arc<Mutex<Session>> {
        self.sessions
            .lock()
            .await
            .entry(user)
            .or_default()
            .clone()
    }

    /// A copy of the user's current session, if they have one.
    pub async fn snapshot(&self, user: UserId) -> Option<Session> {
        let session = self.sessions.lock().await.get(&user).cloned()?;
        let snapshot = session.lock().await.clone();
        Some(snapshot)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
