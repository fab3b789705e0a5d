use std::{env, fs, path::Path, time::Duration};

use crate::{domain::ChatId, errors::Error, Result};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// A labelled URL shown by `/links`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalLink {
    pub label: String,
    pub url: String,
}

/// Typed process configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub group_chat: ChatId,

    // GitHub
    pub github_user: String,
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub github_timeout: Duration,
    pub poll_interval: Duration,

    // Community
    pub community_url: String,
    pub extra_links: Vec<ExternalLink>,

    // Health endpoint
    pub port: u16,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN")
            .or_else(|| env_str("TOKEN"))
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
            })?;

        let github_user = env_str("GITHUB_USER").and_then(non_empty).ok_or_else(|| {
            Error::Config("GITHUB_USER environment variable is required".to_string())
        })?;

        let group_chat = env_str("GROUP_CHAT")
            .and_then(non_empty)
            .ok_or_else(|| Error::Config("GROUP_CHAT environment variable is required".to_string()))
            .and_then(|raw| parse_chat_id(&raw))?;

        let community_url = env_str("FACEBOOK_GROUP")
            .or_else(|| env_str("COMMUNITY_URL"))
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("FACEBOOK_GROUP environment variable is required".to_string())
            })?;

        let github_token = env_str("GITHUB_TOKEN").and_then(non_empty);
        let github_api_url = env_str("GITHUB_API_URL")
            .and_then(non_empty)
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());
        let github_timeout = Duration::from_secs(env_u64("GITHUB_TIMEOUT_SECS").unwrap_or(30));

        let poll_interval = Duration::from_secs(env_u64("POLL_INTERVAL_SECS").unwrap_or(300));
        if poll_interval.is_zero() {
            return Err(Error::Config(
                "POLL_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        let extra_links = parse_links(env_str("EXTRA_LINKS"));
        let port = env_u16("PORT").unwrap_or(3000);

        Ok(Self {
            telegram_bot_token,
            group_chat,
            github_user,
            github_token,
            github_api_url,
            github_timeout,
            poll_interval,
            community_url,
            extra_links,
            port,
        })
    }

    /// Public profile page of the watched account.
    pub fn github_profile_url(&self) -> String {
        format!("https://github.com/{}", self.github_user)
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u16(key: &str) -> Option<u16> {
    env_str(key).and_then(|s| s.trim().parse::<u16>().ok())
}

fn parse_chat_id(raw: &str) -> Result<ChatId> {
    raw.trim()
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| Error::Config(format!("GROUP_CHAT must be a numeric chat id, got {raw:?}")))
}

/// Parse `Label=url,Other=url` pairs. Malformed entries are skipped.
fn parse_links(v: Option<String>) -> Vec<ExternalLink> {
    v.unwrap_or_default()
        .split(',')
        .filter_map(|entry| {
            let (label, url) = entry.split_once('=')?;
            let label = label.trim();
            let url = url.trim();
            if label.is_empty() || url.is_empty() {
                return None;
            }
            Some(ExternalLink {
                label: label.to_string(),
                url: url.to_string(),
            })
        })
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_extra_links_and_skips_malformed_entries() {
        let links = parse_links(Some(
            "Telegram group=https://t.me/example, broken ,=https://x.y,Streamlit = https://share.streamlit.io/user/me"
                .to_string(),
        ));
        assert_eq!(
            links,
            vec![
                ExternalLink {
                    label: "Telegram group".to_string(),
                    url: "https://t.me/example".to_string(),
                },
                ExternalLink {
                    label: "Streamlit".to_string(),
                    url: "https://share.streamlit.io/user/me".to_string(),
                },
            ]
        );
        assert!(parse_links(None).is_empty());
    }

    #[test]
    fn parses_negative_group_chat_ids() {
        assert_eq!(
            parse_chat_id(" -1001234567890 ").unwrap(),
            ChatId(-1001234567890)
        );
        assert!(matches!(parse_chat_id("@mygroup"), Err(Error::Config(_))));
    }

    #[test]
    fn dotenv_parser_strips_quotes_and_comments() {
        let parsed = parse_dotenv(
            "# comment\nGITHUB_USER=\"octocat\"\n\nPORT = 8080\nnot a pair\nTOKEN='abc=def'\n",
        );
        assert_eq!(
            parsed,
            vec![
                ("GITHUB_USER".to_string(), "octocat".to_string()),
                ("PORT".to_string(), "8080".to_string()),
                ("TOKEN".to_string(), "abc=def".to_string()),
            ]
        );
    }
}
