//! Quiz Core Library Crate
//!
//! This crate holds everything the quiz bot decides on its own: the menu
//! labels, the question model, the question bank seam, the per-user session
//! store, and the state machine that ties them together. It knows nothing
//! about Telegram; a transport feeds it text and sends back the `Reply`.

pub mod bank;
pub mod engine;
pub mod menu;
pub mod question;
pub mod session;

pub use engine::QuizEngine;

/// Rows of button labels offered to the user alongside a reply.
pub type Keyboard = Vec<Vec<String>>;

/// A single outgoing message produced by the state machine.
///
/// This is the only thing the core hands back to a transport. When
/// `keyboard` is `None` the transport should leave whatever keyboard the
/// user already has in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    /// A plain text reply that keeps the current keyboard.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    /// A reply that replaces the user's keyboard.
    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}
