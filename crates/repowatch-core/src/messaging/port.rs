use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::OutgoingMessage,
    Result,
};

/// Cross-messenger port.
///
/// Telegram is the only implementation; handlers and the poller only ever talk
/// to this trait so they can be exercised with an in-memory fake.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_message(&self, chat_id: ChatId, msg: &OutgoingMessage) -> Result<MessageRef>;
    async fn edit_message(&self, target: MessageRef, msg: &OutgoingMessage) -> Result<()>;

    /// Acknowledge a button press so the client stops its loading indicator.
    async fn answer_callback_query(&self, callback_id: &str) -> Result<()>;
}
