//! In-memory fakes of the ports, shared by the unit tests of this crate.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::{
    config::{Config, ExternalLink},
    domain::{ChatId, MessageId, MessageRef, RepoId, RepositoryRecord},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::OutgoingMessage,
    },
    ports::RepoSource,
    Result,
};

pub(crate) fn test_config() -> Config {
    Config {
        telegram_bot_token: "x".to_string(),
        group_chat: ChatId(-100),
        github_user: "octocat".to_string(),
        github_token: None,
        github_api_url: "http://127.0.0.1:1".to_string(),
        github_timeout: Duration::from_secs(1),
        poll_interval: Duration::from_secs(300),
        community_url: "https://facebook.com/groups/example".to_string(),
        extra_links: vec![ExternalLink {
            label: "Telegram".to_string(),
            url: "https://t.me/example".to_string(),
        }],
        port: 3000,
    }
}

/// Repository with a distinct name and a creation time that decreases with `id`.
pub(crate) fn repo(id: u64) -> RepositoryRecord {
    RepositoryRecord {
        id: RepoId(id),
        name: format!("repo-{id}"),
        html_url: format!("https://github.com/octocat/repo-{id}"),
        stargazers_count: id,
        description: None,
        created_at: Utc.timestamp_opt(1_700_000_000 - id as i64, 0).unwrap(),
    }
}

pub(crate) fn repos(ids: &[u64]) -> Vec<RepositoryRecord> {
    ids.iter().copied().map(repo).collect()
}

/// Replays scripted fetch results; an exhausted script behaves like a failed fetch.
#[derive(Default)]
pub(crate) struct FakeSource {
    responses: Mutex<VecDeque<Vec<RepositoryRecord>>>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub(crate) fn scripted(responses: Vec<Vec<RepositoryRecord>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepoSource for FakeSource {
    async fn list_repositories(&self) -> Vec<RepositoryRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default()
    }
}

/// Same listing on every call.
pub(crate) struct StaticSource(pub(crate) Vec<RepositoryRecord>);

#[async_trait]
impl RepoSource for StaticSource {
    async fn list_repositories(&self) -> Vec<RepositoryRecord> {
        self.0.clone()
    }
}

#[derive(Default)]
pub(crate) struct FakeMessenger {
    next_id: Mutex<i32>,
    fail_sends: bool,
    pub(crate) sends: Mutex<Vec<(ChatId, OutgoingMessage)>>,
    pub(crate) edits: Mutex<Vec<(MessageRef, OutgoingMessage)>>,
    pub(crate) answers: Mutex<Vec<String>>,
}

impl FakeMessenger {
    /// Records every send attempt but reports each one as failed.
    pub(crate) fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Default::default()
        }
    }

    fn alloc(&self, chat_id: ChatId) -> MessageRef {
        let mut guard = self.next_id.lock().unwrap();
        *guard += 1;
        MessageRef {
            chat_id,
            message_id: MessageId(*guard),
        }
    }

    pub(crate) fn sent(&self) -> Vec<(ChatId, OutgoingMessage)> {
        self.sends.lock().unwrap().clone()
    }

    pub(crate) fn edited(&self) -> Vec<(MessageRef, OutgoingMessage)> {
        self.edits.lock().unwrap().clone()
    }

    pub(crate) fn answered(&self) -> Vec<String> {
        self.answers.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_message(&self, chat_id: ChatId, msg: &OutgoingMessage) -> Result<MessageRef> {
        self.sends.lock().unwrap().push((chat_id, msg.clone()));
        if self.fail_sends {
            return Err(Error::External("telegram error: flood".to_string()));
        }
        Ok(self.alloc(chat_id))
    }

    async fn edit_message(&self, target: MessageRef, msg: &OutgoingMessage) -> Result<()> {
        self.edits.lock().unwrap().push((target, msg.clone()));
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        self.answers.lock().unwrap().push(callback_id.to_string());
        Ok(())
    }
}
