use std::sync::Arc;

use teloxide::prelude::*;

use repowatch_core::{
    domain::ChatId,
    messaging::types::{Command, IncomingUpdate},
};

use crate::router::AppState;

/// A slash command split into its parts.
#[derive(Debug, PartialEq, Eq)]
struct ParsedCommand {
    name: String,
    /// `botname` from `/cmd@botname`, if present.
    target: Option<String>,
    args: String,
}

fn parse_command(text: &str) -> ParsedCommand {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let args = parts.next().unwrap_or("").trim().to_string();

    let mut head = first.trim_start_matches('/').splitn(2, '@');
    let name = head.next().unwrap_or("").to_lowercase();
    let target = head
        .next()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    ParsedCommand { name, target, args }
}

fn is_addressed_to_us(target: Option<&str>, bot_username: Option<&str>) -> bool {
    match (target, bot_username) {
        (Some(t), Some(me)) => t.eq_ignore_ascii_case(me),
        _ => true,
    }
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let parsed = parse_command(text);
    if parsed.name.is_empty()
        || !is_addressed_to_us(parsed.target.as_deref(), state.bot_username.as_deref())
    {
        return Ok(());
    }

    tracing::debug!(
        chat_id = msg.chat.id.0,
        command = %parsed.name,
        args = %parsed.args,
        "command received"
    );

    state
        .interactions
        .handle(IncomingUpdate::Command(Command {
            chat_id: ChatId(msg.chat.id.0),
            name: parsed.name,
            args: parsed.args,
        }))
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_command_with_argument() {
        assert_eq!(
            parse_command("/repos 2"),
            ParsedCommand {
                name: "repos".to_string(),
                target: None,
                args: "2".to_string(),
            }
        );
    }

    #[test]
    fn parses_bot_suffix_and_lowercases() {
        let p = parse_command("  /Repos@RepoWatchBot   3  ");
        assert_eq!(p.name, "repos");
        assert_eq!(p.target.as_deref(), Some("RepoWatchBot"));
        assert_eq!(p.args, "3");
    }

    #[test]
    fn bare_command_has_empty_args() {
        let p = parse_command("/help");
        assert_eq!(p.name, "help");
        assert!(p.target.is_none());
        assert!(p.args.is_empty());
    }

    #[test]
    fn commands_for_other_bots_are_not_ours() {
        let me = Some("repowatch_bot");
        assert!(is_addressed_to_us(None, me));
        assert!(is_addressed_to_us(Some("RepoWatch_Bot"), me));
        assert!(!is_addressed_to_us(Some("other_bot"), me));
        assert!(is_addressed_to_us(Some("other_bot"), None));
    }
}
