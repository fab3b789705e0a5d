use async_trait::async_trait;

use crate::domain::RepositoryRecord;

/// Hexagonal port for the repository listing backend (GitHub today).
///
/// Implementations never fail: transport, authorization and decode errors are
/// logged and reported as an empty list. Callers must read an empty result as
/// "no new information", not as "the account has no repositories".
#[async_trait]
pub trait RepoSource: Send + Sync {
    /// Repositories of the configured account, newest first.
    async fn list_repositories(&self) -> Vec<RepositoryRecord>;
}
