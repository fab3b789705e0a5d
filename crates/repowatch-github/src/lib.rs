//! GitHub adapter (repository listing).
//!
//! Uses the REST `users/{user}/repos` endpoint sorted by creation date, newest
//! first.

use std::time::Duration;

use async_trait::async_trait;

use repowatch_core::{
    config::Config, domain::RepositoryRecord, errors::Error, ports::RepoSource, Result,
};

/// Upper bound of repositories returned per fetch (one API page).
pub const PER_PAGE: u32 = 100;

const USER_AGENT: &str = concat!("repowatch/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct GithubClient {
    pub account: String,
    api_base: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl GithubClient {
    pub fn new(
        api_base: impl Into<String>,
        account: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::External(format!("github client build error: {e}")))?;
        Ok(Self {
            account: account.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            cfg.github_api_url.clone(),
            cfg.github_user.clone(),
            cfg.github_token.clone(),
            cfg.github_timeout,
        )
    }

    fn repos_url(&self) -> String {
        format!("{}/users/{}/repos", self.api_base, self.account)
    }

    /// Fetch the listing, surfacing every failure as an error.
    pub async fn try_list_repositories(&self) -> Result<Vec<RepositoryRecord>> {
        let per_page = PER_PAGE.to_string();
        let mut req = self
            .http
            .get(self.repos_url())
            .query(&[("sort", "created"), ("per_page", per_page.as_str())])
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::External(format!("github request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::External(format!(
                "github listing failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        resp.json::<Vec<RepositoryRecord>>()
            .await
            .map_err(|e| Error::External(format!("github json error: {e}")))
    }
}

#[async_trait]
impl RepoSource for GithubClient {
    async fn list_repositories(&self) -> Vec<RepositoryRecord> {
        match self.try_list_repositories().await {
            Ok(repos) => {
                tracing::debug!(
                    account = %self.account,
                    count = repos.len(),
                    "fetched repositories"
                );
                repos
            }
            Err(e) => {
                tracing::warn!(account = %self.account, "repository fetch failed: {e}");
                Vec::new()
            }
        }
    }
}
