//! Message templates. Everything here is pure: data in, `OutgoingMessage` out.

use crate::{
    config::Config,
    domain::RepositoryRecord,
    formatting::{escape_html, format_timestamp, html_link},
    messaging::types::{InlineButton, InlineKeyboard, OutgoingMessage},
    pagination::RepoPage,
};

pub const NO_DESCRIPTION: &str = "No description";
pub const REPOS_CALLBACK_PREFIX: &str = "repos_";

/// Payload of the one notification sent per newly detected repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoAnnouncement {
    pub name: String,
    pub url: String,
    pub stars: u64,
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&RepositoryRecord> for RepoAnnouncement {
    fn from(repo: &RepositoryRecord) -> Self {
        let description = repo
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(NO_DESCRIPTION)
            .to_string();
        Self {
            name: repo.name.clone(),
            url: repo.html_url.clone(),
            stars: repo.stargazers_count,
            description,
            created_at: repo.created_at,
        }
    }
}

pub fn announcement(a: &RepoAnnouncement) -> OutgoingMessage {
    let html = format!(
        "🚀 <b>New GitHub repository detected!</b>\n\n\
• {} - ⭐ {}\n\
Description: {}\n\
Created: {}",
        html_link(&a.url, &a.name),
        a.stars,
        escape_html(&a.description),
        format_timestamp(&a.created_at),
    );
    OutgoingMessage::html(html)
}

/// Callback payload that requests `page` of the listing.
pub fn repos_callback_data(page: u32) -> String {
    format!("{REPOS_CALLBACK_PREFIX}{page}")
}

pub fn repo_page(account: &str, page: &RepoPage<'_>) -> OutgoingMessage {
    if page.items.is_empty() {
        return OutgoingMessage::html("No repositories on this page.");
    }

    let mut html = format!(
        "📦 GitHub repositories of <b>{}</b> (page {}):\n\n",
        escape_html(account),
        page.page
    );
    for repo in page.items {
        html.push_str(&format!(
            "• {} - ⭐ {}\n",
            html_link(&repo.html_url, &repo.name),
            repo.stargazers_count
        ));
    }

    let mut msg = OutgoingMessage::html(html);
    if page.has_next {
        let next_page = repos_callback_data(page.page.saturating_add(1));
        let button = InlineButton::callback("➡ Next page", next_page);
        msg = msg.with_keyboard(InlineKeyboard::one_per_row(vec![button]));
    }
    msg
}

fn community_keyboard(cfg: &Config) -> InlineKeyboard {
    InlineKeyboard::one_per_row(vec![
        InlineButton::url("GitHub repositories", cfg.github_profile_url()),
        InlineButton::url("Community group", cfg.community_url.clone()),
    ])
}

pub fn welcome(
    cfg: &Config,
    member_name: Option<&str>,
    chat_title: Option<&str>,
) -> OutgoingMessage {
    let name = member_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("New member");
    let title = chat_title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("the group");

    let html = format!(
        "👋 Hi {}! Welcome to <b>{}</b>!\n\n\
💻 Here we share:\n\
- Ethical hacking tips 🔒\n\
- Development &amp; scripts 💾\n\
- Challenges and open-source projects 🚀\n\n\
📌 Quick tip: introduce yourself and explore our resources!",
        escape_html(name),
        escape_html(title),
    );
    OutgoingMessage::html(html).with_keyboard(community_keyboard(cfg))
}

pub fn help(cfg: &Config) -> OutgoingMessage {
    let html = "💡 <b>Available commands:</b>\n\
/repos [page] - Browse the GitHub repositories\n\
/help - Show this message\n\
/info - About the group and the bot\n\
/links - Useful links";
    OutgoingMessage::html(html).with_keyboard(community_keyboard(cfg))
}

pub fn info(cfg: &Config) -> OutgoingMessage {
    let html = "🤖 <b>This bot automates:</b>\n\
- Welcome messages with buttons\n\
- Instant notification of new GitHub repositories\n\
- Interactive commands with pagination\n\
- Tips for new members";
    OutgoingMessage::html(html).with_keyboard(community_keyboard(cfg))
}

pub fn links(cfg: &Config) -> OutgoingMessage {
    let mut entries = vec![
        ("Community group".to_string(), cfg.community_url.clone()),
        ("GitHub".to_string(), cfg.github_profile_url()),
    ];
    for link in &cfg.extra_links {
        entries.push((link.label.clone(), link.url.clone()));
    }

    let mut html = "🔗 <b>Useful links:</b>\n\n".to_string();
    for (label, url) in &entries {
        html.push_str(&format!("• {}\n", html_link(url, label)));
    }

    let buttons = entries
        .into_iter()
        .map(|(label, url)| InlineButton::url(label, url))
        .collect();

    OutgoingMessage::html(html).with_keyboard(InlineKeyboard::one_per_row(buttons))
}
