//! Telegram adapter (teloxide).
//!
//! This crate implements the `repowatch-core` MessagingPort over the Telegram
//! Bot API and translates incoming updates into core `IncomingUpdate`s.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
    ApiError, RequestError,
};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use repowatch_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{ButtonAction, InlineKeyboard, OutgoingMessage},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

/// Convert a core keyboard into Telegram markup.
///
/// Buttons whose URL does not parse are dropped (Telegram would reject the
/// whole message otherwise); rows left empty are removed.
pub fn to_markup(keyboard: &InlineKeyboard) -> Option<InlineKeyboardMarkup> {
    let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|b| match &b.action {
                    ButtonAction::Callback(data) => {
                        Some(InlineKeyboardButton::callback(b.label.clone(), data.clone()))
                    }
                    ButtonAction::Url(url) => match reqwest::Url::parse(url) {
                        Ok(u) => Some(InlineKeyboardButton::url(b.label.clone(), u)),
                        Err(e) => {
                            tracing::warn!(
                                label = %b.label,
                                url = %url,
                                "dropping button with invalid url: {e}"
                            );
                            None
                        }
                    },
                })
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect();

    if rows.is_empty() {
        None
    } else {
        Some(InlineKeyboardMarkup::new(rows))
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_message(&self, chat_id: ChatId, msg: &OutgoingMessage) -> Result<MessageRef> {
        let markup = msg.keyboard.as_ref().and_then(to_markup);
        let sent = self
            .with_retry(|| {
                let mut req = self
                    .bot
                    .send_message(Self::tg_chat(chat_id), msg.html.clone())
                    .parse_mode(ParseMode::Html)
                    .disable_web_page_preview(!msg.link_preview);
                if let Some(m) = &markup {
                    req = req.reply_markup(m.clone());
                }
                req
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(sent.id.0),
        })
    }

    async fn edit_message(&self, target: MessageRef, msg: &OutgoingMessage) -> Result<()> {
        let markup = msg.keyboard.as_ref().and_then(to_markup);
        self.with_retry(|| {
            let mut req = self
                .bot
                .edit_message_text(
                    Self::tg_chat(target.chat_id),
                    Self::tg_msg_id(target.message_id),
                    msg.html.clone(),
                )
                .parse_mode(ParseMode::Html)
                .disable_web_page_preview(!msg.link_preview);
            if let Some(m) = &markup {
                req = req.reply_markup(m.clone());
            }
            async move {
                match req.await {
                    // Pressing the same button twice re-renders identical content.
                    Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
                    other => other.map(|_| ()),
                }
            }
        })
        .await
    }

    async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        self.with_retry(|| self.bot.answer_callback_query(callback_id.to_string())).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repowatch_core::messaging::types::InlineButton;
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn converts_url_and_callback_buttons_row_by_row() {
        let kb = InlineKeyboard::new(vec![
            vec![InlineButton::url("GitHub", "https://github.com/octocat")],
            vec![InlineButton::callback("➡ Next page", "repos_2")],
        ]);

        let markup = to_markup(&kb).unwrap();
        assert_eq!(markup.inline_keyboard.len(), 2);

        let first = &markup.inline_keyboard[0][0];
        assert_eq!(first.text, "GitHub");
        assert!(matches!(
            &first.kind,
            InlineKeyboardButtonKind::Url(u) if u.as_str() == "https://github.com/octocat"
        ));

        let second = &markup.inline_keyboard[1][0];
        assert!(matches!(
            &second.kind,
            InlineKeyboardButtonKind::CallbackData(d) if d == "repos_2"
        ));
    }

    #[test]
    fn drops_buttons_with_invalid_urls() {
        let kb = InlineKeyboard::new(vec![
            vec![InlineButton::url("Broken", "not a url")],
            vec![InlineButton::url("Ok", "https://t.me/example")],
        ]);
        let markup = to_markup(&kb).unwrap();
        assert_eq!(markup.inline_keyboard.len(), 1);
        assert_eq!(markup.inline_keyboard[0][0].text, "Ok");

        let only_broken = InlineKeyboard::one_per_row(vec![InlineButton::url("Broken", "::")]);
        assert!(to_markup(&only_broken).is_none());
    }
}
