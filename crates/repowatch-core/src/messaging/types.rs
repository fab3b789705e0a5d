use crate::domain::{ChatId, MessageRef};

/// Cross-messenger incoming update model.
///
/// Telegram-specific fields live in the Telegram adapter.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    MembersJoined(MembersJoined),
    Command(Command),
    Callback(CallbackQuery),
}

#[derive(Clone, Debug)]
pub struct MembersJoined {
    pub chat_id: ChatId,
    pub chat_title: Option<String>,
    pub members: Vec<NewMember>,
}

#[derive(Clone, Debug)]
pub struct NewMember {
    pub first_name: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    /// Lowercased command name without the leading `/` or `@botname` suffix.
    pub name: String,
    pub args: String,
}

#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub callback_id: String,
    pub data: String,
    pub message: Option<MessageRef>,
}

/// A rendered outbound message: HTML body plus optional inline keyboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub html: String,
    pub keyboard: Option<InlineKeyboard>,
    pub link_preview: bool,
}

impl OutgoingMessage {
    /// HTML body, no buttons, messenger-default link previews.
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            keyboard: None,
            link_preview: true,
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        if !keyboard.is_empty() {
            self.keyboard = Some(keyboard);
        }
        self
    }
}

/// Inline keyboard: rows of buttons.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub action: ButtonAction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    /// Opens an external URL.
    Url(String),
    /// Sends a callback query carrying this payload back to the bot.
    Callback(String),
}

impl InlineButton {
    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Url(url.into()),
        }
    }

    pub fn callback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    /// Convenience for "one button per row" layouts.
    pub fn one_per_row(buttons: Vec<InlineButton>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.is_empty())
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}
