//! Telegram transport.
//!
//! Turns incoming text messages into `QuizEngine::handle` calls and sends the
//! resulting replies back, rendering keyboards as resized reply keyboards.
//! Sessions are keyed by chat and sender, so members of a group chat each
//! run their own quiz.

use quiz_core::{Keyboard, QuizEngine, Reply, session::UserId};
use std::{error::Error, sync::Arc};
use teloxide::{
    RequestError,
    dispatching::UpdateHandler,
    dptree,
    payloads::SendMessageSetters,
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup},
};
use tracing::{debug, info, instrument, warn};

pub type HandlerError = Box<dyn Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;

/// Renders label rows as a reply keyboard sized to fit its buttons.
pub fn keyboard_markup(keyboard: &Keyboard) -> KeyboardMarkup {
    KeyboardMarkup::new(
        keyboard
            .iter()
            .map(|row| row.iter().map(|label| KeyboardButton::new(label.clone()))),
    )
    .resize_keyboard()
}

/// The session key for a message from `sender` in `chat`.
pub fn session_key(chat: ChatId, sender: Option<teloxide::types::UserId>) -> UserId {
    UserId::new(chat.0, sender.map(|sender| sender.0))
}

/// The update handler tree: every message goes to `handle_message`.
pub fn schema() -> UpdateHandler<HandlerError> {
    Update::filter_message().endpoint(handle_message)
}

#[instrument(name = "telegram_message", skip_all, fields(chat = msg.chat.id.0))]
async fn handle_message(bot: Bot, msg: Message, engine: Arc<QuizEngine>) -> HandlerResult {
    let Some(text) = msg.text() else {
        debug!("Ignoring non-text message.");
        return Ok(());
    };

    let key = session_key(msg.chat.id, msg.from.as_ref().map(|user| user.id));
    if let Some(reply) = engine.handle(key, text).await {
        send_reply(&bot, msg.chat.id, reply).await?;
    }
    Ok(())
}

/// Sends one reply. Without a keyboard the user's current one stays up.
pub async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> Result<(), RequestError> {
    let request = bot.send_message(chat_id, reply.text);
    match reply.keyboard {
        Some(keyboard) => request.reply_markup(keyboard_markup(&keyboard)).await?,
        None => request.await?,
    };
    Ok(())
}

/// Polls Telegram for updates until `shutdown` resolves.
pub async fn run<S>(bot: Bot, engine: Arc<QuizEngine>, shutdown: S)
where
    S: Future<Output = ()> + Send + 'static,
{
    let mut dispatcher = Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![engine])
        .build();

    let token = dispatcher.shutdown_token();
    tokio::spawn(async move {
        shutdown.await;
        match token.shutdown() {
            Ok(stopped) => {
                stopped.await;
                info!("Polling stopped.");
            }
            Err(_) => warn!("Shutdown requested before the dispatcher was running."),
        }
    });

    dispatcher.dispatch().await;
}
