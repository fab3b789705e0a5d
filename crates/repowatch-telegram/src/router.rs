use std::sync::Arc;

use anyhow::Context;
use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tokio_util::sync::CancellationToken;

use repowatch_core::{
    config::Config,
    interactions::ChatInteractions,
    messaging::{
        port::MessagingPort,
        throttled::{ThrottleConfig, ThrottledMessenger},
    },
    poller::RepoPoller,
    ports::RepoSource,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    /// Our own `@username`, used to ignore commands addressed to other bots.
    pub bot_username: Option<String>,
    pub interactions: ChatInteractions,
}

/// Connect to Telegram, start the repository poller and dispatch updates
/// until the process is interrupted.
pub async fn run_polling(cfg: Arc<Config>, source: Arc<dyn RepoSource>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    let me = bot
        .get_me()
        .await
        .context("failed to reach the Telegram Bot API")?;
    let bot_username = me.user.username.clone();
    tracing::info!(
        username = bot_username.as_deref().unwrap_or("?"),
        account = %cfg.github_user,
        group_chat = cfg.group_chat.0,
        "telegram bot connected"
    );

    // Wrap the raw Telegram messenger with a throttling decorator: a poll that finds many
    // repositories would otherwise burst into the group. RetryAfter is still retried once
    // at the Telegram adapter layer.
    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> = Arc::new(ThrottledMessenger::new(
        raw_messenger,
        ThrottleConfig::default(),
    ));

    let cancel = CancellationToken::new();
    let poller = RepoPoller::new(
        source.clone(),
        messenger.clone(),
        cfg.group_chat,
        cfg.poll_interval,
    )
    .spawn(cancel.clone());

    let state = Arc::new(AppState {
        cfg: cfg.clone(),
        bot_username,
        interactions: ChatInteractions::new(cfg, source, messenger),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    cancel.cancel();
    if let Err(e) = poller.await {
        tracing::warn!("poller task ended abnormally: {e}");
    }
    tracing::info!("telegram dispatcher stopped");

    Ok(())
}
