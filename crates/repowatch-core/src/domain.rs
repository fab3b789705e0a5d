use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// GitHub repository id. Stable across renames and fetches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct RepoId(pub u64);

/// Snapshot of one remote repository at fetch time.
///
/// Field names follow the GitHub REST payload so the adapter can decode the
/// listing response directly.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RepositoryRecord {
    pub id: RepoId,
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_github_repo_payload_ignoring_extra_fields() {
        let raw = r#"{
            "id": 123456,
            "node_id": "R_kgDO",
            "name": "hello-world",
            "full_name": "octocat/hello-world",
            "html_url": "https://github.com/octocat/hello-world",
            "description": null,
            "stargazers_count": 42,
            "created_at": "2024-03-01T12:30:00Z"
        }"#;
        let repo: RepositoryRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(repo.id, RepoId(123456));
        assert_eq!(repo.name, "hello-world");
        assert_eq!(repo.stargazers_count, 42);
        assert!(repo.description.is_none());
        assert_eq!(repo.created_at.to_rfc3339(), "2024-03-01T12:30:00+00:00");
    }
}
