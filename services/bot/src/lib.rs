//! Quiz Bot Library Crate
//!
//! This library contains the service side of the quiz bot: configuration
//! loading, the Telegram transport, and the question bank audit. The
//! `quiz-bot` binary is a thin wrapper around it.

pub mod audit;
pub mod config;
pub mod telegram;
