use std::sync::Arc;

use repowatch_core::{config::Config, ports::RepoSource};
use repowatch_github::GithubClient;

mod health;

#[tokio::main]
async fn main() -> Result<(), repowatch_core::Error> {
    repowatch_core::logging::init("repowatch")?;

    let cfg = Arc::new(Config::load()?);
    tracing::info!(
        account = %cfg.github_user,
        poll_interval_secs = cfg.poll_interval.as_secs(),
        authenticated = cfg.github_token.is_some(),
        "starting repowatch"
    );

    let listener = health::bind(cfg.port).await?;
    tokio::spawn(async move {
        if let Err(e) = health::serve(listener).await {
            tracing::error!("health endpoint stopped: {e}");
        }
    });

    let source: Arc<dyn RepoSource> = Arc::new(GithubClient::from_config(&cfg)?);

    repowatch_telegram::router::run_polling(cfg, source)
        .await
        .map_err(|e| repowatch_core::Error::External(format!("telegram bot failed: {e:#}")))?;

    Ok(())
}
