//! Quiz State Machine
//!
//! This module turns one recognized input plus the user's session into at
//! most one reply. Menu labels move the user between the grade, subject,
//! social and unit menus; picking a unit loads its questions from the bank
//! and starts the quiz. Input that is not recognized, or that makes no sense
//! in the current step, is silently ignored.

use crate::{
    Reply,
    bank::{BankError, QuestionBank},
    menu::{self, Input},
    session::{QuizProgress, Session, SessionStore, Step, UserId},
};
use std::{fmt::Write as _, sync::Arc};
use tracing::{debug, instrument, warn};

const WELCOME: &str = "👋 Welcome student!\nChoose your grade:";
const CHOOSE_GRADE: &str = "Choose your grade:";
const CHOOSE_SUBJECT: &str = "📘 Choose a subject:";
const CHOOSE_SOCIAL: &str = "Choose Social subject:";
const CHOOSE_UNIT: &str = "📂 Choose a unit:";
const UNIT_COMPLETED: &str = "🎉 Unit completed!\nChoose your grade:";
const EXITED: &str = "❌ Exited.\nChoose your grade:";
const CORRECT: &str = "✅ Correct!";

/// Why a unit could not be started. The user stays on the unit menu.
#[derive(Debug, thiserror::Error)]
pub enum UnitSelectError {
    #[error("grade and subject must be chosen before a unit")]
    MissingPrerequisite,
    #[error(transparent)]
    Bank(#[from] BankError),
}

impl UnitSelectError {
    pub fn user_message(&self) -> &'static str {
        match self {
            UnitSelectError::MissingPrerequisite => "⚠ Please select grade and subject first.",
            UnitSelectError::Bank(err) => err.user_message(),
        }
    }
}

/// Owns the session store and the question bank, and routes each user's
/// text through the state machine.
pub struct QuizEngine {
    bank: Arc<dyn QuestionBank>,
    sessions: SessionStore,
}

impl QuizEngine {
    pub fn new(bank: Arc<dyn QuestionBank>) -> Self {
        Self {
            bank,
            sessions: SessionStore::new(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handles one message from `user`. Returns the reply to send, if any.
    #[instrument(name = "quiz_input", skip_all, fields(%user))]
    pub async fn handle(&self, user: UserId, text: &str) -> Option<Reply> {
        let Some(input) = Input::parse(text) else {
            debug!("Ignoring unrecognized input.");
            return None;
        };

        let session = self.sessions.session(user).await;
        let mut session = session.lock().await;
        let from = session.step();
        let reply = transition(&mut session, input, self.bank.as_ref()).await;
        debug!(?input, %from, to = %session.step(), replied = reply.is_some(), "Input handled");
        reply
    }
}

/// Applies `input` to `session`. This is the whole state machine; `None`
/// means the input is ignored and the session is left untouched.
pub async fn transition(
    session: &mut Session,
    input: Input,
    bank: &dyn QuestionBank,
) -> Option<Reply> {
    match input {
        Input::Start => {
            session.reset();
            Some(Reply::with_keyboard(WELCOME, menu::grade_keyboard()))
        }
        Input::Grade(grade) => {
            session.select_grade(grade);
            Some(Reply::with_keyboard(CHOOSE_SUBJECT, menu::subject_keyboard()))
        }
        Input::SocialMenu => {
            session.open_social();
            Some(Reply::with_keyboard(CHOOSE_SOCIAL, menu::social_keyboard()))
        }
        Input::Subject(subject) => {
            session.select_subject(subject);
            Some(Reply::with_keyboard(CHOOSE_UNIT, menu::unit_keyboard()))
        }
        Input::Unit(unit) => match load_quiz(session, unit, bank).await {
            Ok(progress) => {
                let reply = question_reply(&progress);
                session.start_quiz(progress);
                Some(reply)
            }
            Err(err) => {
                warn!(unit, error = %err, "Could not start unit");
                Some(Reply::text(err.user_message()))
            }
        },
        Input::ShowAnswer => {
            let question = session.quiz()?.current();
            Some(Reply::text(format!("✅ Answer: {}", question.correct_answer())))
        }
        Input::Answer(letter) => {
            let question = session.quiz()?.current();
            let text = if question.is_correct(letter.encode_utf8(&mut [0; 4])) {
                CORRECT.to_string()
            } else {
                format!("❌ Wrong.\nCorrect: {}", question.correct_answer())
            };
            Some(Reply::text(text))
        }
        Input::Next => {
            let progress = session.quiz_mut()?;
            if progress.advance() {
                Some(question_reply(progress))
            } else {
                session.reset();
                Some(Reply::with_keyboard(UNIT_COMPLETED, menu::grade_keyboard()))
            }
        }
        Input::Exit => {
            session.reset();
            Some(Reply::with_keyboard(EXITED, menu::grade_keyboard()))
        }
        Input::Back => {
            let step = session.back()?;
            Some(menu_reply(step))
        }
    }
}

async fn load_quiz(
    session: &Session,
    unit: u32,
    bank: &dyn QuestionBank,
) -> Result<QuizProgress, UnitSelectError> {
    let key = session
        .unit_key(unit)
        .ok_or(UnitSelectError::MissingPrerequisite)?;
    let questions = bank.load_unit(&key).await?;
    debug!(%key, count = questions.len(), "Loaded unit");
    QuizProgress::new(questions).ok_or_else(|| BankError::Empty(key).into())
}

/// The prompt shown when arriving at `step` through "Back".
fn menu_reply(step: Step) -> Reply {
    match step {
        Step::Grade => Reply::with_keyboard(CHOOSE_GRADE, menu::grade_keyboard()),
        Step::Subject => Reply::with_keyboard(CHOOSE_SUBJECT, menu::subject_keyboard()),
        Step::Social => Reply::with_keyboard(CHOOSE_SOCIAL, menu::social_keyboard()),
        Step::Unit | Step::Quiz => Reply::with_keyboard(CHOOSE_UNIT, menu::unit_keyboard()),
    }
}

fn question_reply(progress: &QuizProgress) -> Reply {
    let question = progress.current();
    let mut text = format!("📝 Q{}: {}\n\n", progress.index() + 1, question.prompt());
    for option in question.options() {
        let _ = writeln!(text, "{}. {}", option.letter, option.text);
    }
    Reply::with_keyboard(text, menu::quiz_keyboard(question))
}
