//! Chat interaction dispatch: welcomes, slash commands and button callbacks.
//!
//! Stateless per update. The only collaborator shared with the poller is the
//! repository source; the KnownSet is never read here.

use std::sync::Arc;

use crate::{
    config::Config,
    domain::ChatId,
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, Command, IncomingUpdate, MembersJoined, OutgoingMessage},
    },
    pagination::{paginate, parse_page},
    ports::RepoSource,
    render::{self, REPOS_CALLBACK_PREFIX},
};

#[derive(Clone)]
pub struct ChatInteractions {
    cfg: Arc<Config>,
    source: Arc<dyn RepoSource>,
    messenger: Arc<dyn MessagingPort>,
}

impl ChatInteractions {
    pub fn new(
        cfg: Arc<Config>,
        source: Arc<dyn RepoSource>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            cfg,
            source,
            messenger,
        }
    }

    pub async fn handle(&self, update: IncomingUpdate) {
        match update {
            IncomingUpdate::MembersJoined(ev) => self.welcome(ev).await,
            IncomingUpdate::Command(cmd) => self.command(cmd).await,
            IncomingUpdate::Callback(q) => self.callback(q).await,
        }
    }

    /// Render `page` of the account's current repository listing.
    ///
    /// Both `/repos <page>` and the `repos_<page>` button go through here.
    pub async fn repo_page(&self, page: u32) -> OutgoingMessage {
        let repos = self.source.list_repositories().await;
        render::repo_page(&self.cfg.github_user, &paginate(&repos, page))
    }

    async fn welcome(&self, ev: MembersJoined) {
        for member in &ev.members {
            let msg = render::welcome(
                &self.cfg,
                member.first_name.as_deref(),
                ev.chat_title.as_deref(),
            );
            self.send(ev.chat_id, &msg).await;
        }
    }

    async fn command(&self, cmd: Command) {
        let msg = match cmd.name.as_str() {
            "repos" => {
                let arg = cmd.args.split_whitespace().next();
                self.repo_page(parse_page(arg)).await
            }
            "help" => render::help(&self.cfg),
            "info" => render::info(&self.cfg),
            "links" => render::links(&self.cfg),
            other => {
                tracing::debug!(command = other, "ignoring unknown command");
                return;
            }
        };
        self.send(cmd.chat_id, &msg).await;
    }

    async fn callback(&self, q: CallbackQuery) {
        let page = q
            .data
            .strip_prefix(REPOS_CALLBACK_PREFIX)
            .map(|p| parse_page(Some(p)));

        // Always answer so the client stops its loading spinner.
        if let Err(e) = self.messenger.answer_callback_query(&q.callback_id).await {
            tracing::warn!("failed to answer callback query: {e}");
        }

        let Some(page) = page else {
            tracing::debug!(data = %q.data, "ignoring unknown callback payload");
            return;
        };
        let Some(target) = q.message else {
            tracing::debug!("callback without originating message");
            return;
        };

        let msg = self.repo_page(page).await;
        if let Err(e) = self.messenger.edit_message(target, &msg).await {
            tracing::warn!(chat_id = target.chat_id.0, "failed to edit listing: {e}");
        }
    }

    async fn send(&self, chat_id: ChatId, msg: &OutgoingMessage) {
        if let Err(e) = self.messenger.send_message(chat_id, msg).await {
            tracing::warn!(chat_id = chat_id.0, "failed to send message: {e}");
        }
    }
}
