//! Outbound pacing for the Telegram Bot API.
//!
//! A poll that finds several repositories sends them back to back into the
//! group, which would trip Telegram's per-group flood limit. Every call goes
//! through one [`SendPacer`] that hands out time slots; a chat's slot is only
//! remembered while it still lies in the future, so chats that talk to the
//! bot once do not accumulate state.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::{
    domain::{ChatId, MessageRef},
    messaging::{port::MessagingPort, types::OutgoingMessage},
    Result,
};

#[derive(Clone, Copy, Debug)]
pub struct ThrottleConfig {
    /// Spacing between any two API calls.
    pub global_min_interval: Duration,
    /// Spacing between two calls into the same chat.
    pub per_chat_min_interval: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            global_min_interval: Duration::from_millis(40),
            // Groups accept roughly 20 messages per minute.
            per_chat_min_interval: Duration::from_secs(3),
        }
    }
}

/// Slot bookkeeping shared by all outbound calls.
#[derive(Debug)]
struct SendPacer {
    cfg: ThrottleConfig,
    global_next: Instant,
    chat_next: HashMap<ChatId, Instant>,
}

impl SendPacer {
    fn new(cfg: ThrottleConfig) -> Self {
        Self {
            cfg,
            global_next: Instant::now(),
            chat_next: HashMap::new(),
        }
    }

    /// Book the earliest slot allowed for a call into `chat` (or a chat-less
    /// call such as a callback answer) and return how long to wait for it.
    fn reserve(&mut self, chat: Option<ChatId>) -> Duration {
        let now = Instant::now();
        self.chat_next.retain(|_, next| *next > now);

        let mut start = now.max(self.global_next);
        if let Some(chat) = chat {
            if let Some(next) = self.chat_next.get(&chat) {
                start = start.max(*next);
            }
            self.chat_next
                .insert(chat, start + self.cfg.per_chat_min_interval);
        }
        self.global_next = start + self.cfg.global_min_interval;

        start - now
    }

    #[cfg(test)]
    fn tracked_chats(&self) -> usize {
        self.chat_next.len()
    }
}

/// MessagingPort decorator that paces outbound calls.
pub struct ThrottledMessenger {
    inner: Arc<dyn MessagingPort>,
    pacer: Mutex<SendPacer>,
}

impl ThrottledMessenger {
    pub fn new(inner: Arc<dyn MessagingPort>, cfg: ThrottleConfig) -> Self {
        Self {
            inner,
            pacer: Mutex::new(SendPacer::new(cfg)),
        }
    }

    async fn wait_for_slot(&self, chat: Option<ChatId>) {
        let wait = self.pacer.lock().await.reserve(chat);
        if !wait.is_zero() {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "pacing outbound call");
            sleep(wait).await;
        }
    }
}

#[async_trait::async_trait]
impl MessagingPort for ThrottledMessenger {
    async fn send_message(&self, chat_id: ChatId, msg: &OutgoingMessage) -> Result<MessageRef> {
        self.wait_for_slot(Some(chat_id)).await;
        self.inner.send_message(chat_id, msg).await
    }

    async fn edit_message(&self, target: MessageRef, msg: &OutgoingMessage) -> Result<()> {
        self.wait_for_slot(Some(target.chat_id)).await;
        self.inner.edit_message(target, msg).await
    }

    async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        self.wait_for_slot(None).await;
        self.inner.answer_callback_query(callback_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeMessenger;

    fn cfg() -> ThrottleConfig {
        ThrottleConfig {
            global_min_interval: Duration::from_millis(40),
            per_chat_min_interval: Duration::from_secs(3),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn same_chat_is_spaced_by_per_chat_interval() {
        let mut pacer = SendPacer::new(cfg());
        let group = Some(ChatId(-100));

        assert!(pacer.reserve(group).is_zero());
        assert_eq!(pacer.reserve(group), Duration::from_secs(3));
        assert_eq!(pacer.reserve(group), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn other_chats_only_wait_for_the_global_slot() {
        let mut pacer = SendPacer::new(cfg());

        assert!(pacer.reserve(Some(ChatId(1))).is_zero());
        assert_eq!(pacer.reserve(Some(ChatId(2))), Duration::from_millis(40));
        assert_eq!(pacer.reserve(None), Duration::from_millis(80));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_chats_are_forgotten() {
        let mut pacer = SendPacer::new(cfg());
        for id in 0..5000 {
            pacer.reserve(Some(ChatId(id)));
        }
        assert_eq!(pacer.tracked_chats(), 5000);

        // The last global slot is 200s out; past it every chat slot has expired.
        tokio::time::advance(Duration::from_secs(300)).await;
        assert!(pacer.reserve(Some(ChatId(-100))).is_zero());
        assert_eq!(pacer.tracked_chats(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_into_the_group_is_delayed() {
        let inner = Arc::new(FakeMessenger::default());
        let messenger = ThrottledMessenger::new(inner.clone(), cfg());
        let msg = OutgoingMessage::html("hi");

        let start = Instant::now();
        for _ in 0..3 {
            messenger.send_message(ChatId(-100), &msg).await.unwrap();
        }

        assert_eq!(inner.sent().len(), 3);
        assert!(start.elapsed() >= Duration::from_secs(6));
        assert_eq!(messenger.pacer.lock().await.tracked_chats(), 1);
    }
}
