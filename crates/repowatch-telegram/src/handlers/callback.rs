use std::sync::Arc;

use teloxide::prelude::*;

use repowatch_core::{
    domain::{ChatId, MessageId, MessageRef},
    messaging::types::{CallbackQuery as CoreCallback, IncomingUpdate},
};

use crate::router::AppState;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    let message = q.message.as_ref().map(|m| MessageRef {
        chat_id: ChatId(m.chat.id.0),
        message_id: MessageId(m.id.0),
    });

    tracing::debug!(
        user_id = q.from.id.0,
        data = q.data.as_deref().unwrap_or(""),
        "callback query"
    );

    state
        .interactions
        .handle(IncomingUpdate::Callback(CoreCallback {
            callback_id: q.id.clone(),
            data: q.data.clone().unwrap_or_default(),
            message,
        }))
        .await;

    Ok(())
}
