use std::sync::Arc;

use teloxide::{prelude::*, types::User};

use repowatch_core::{
    domain::ChatId,
    messaging::types::{IncomingUpdate, MembersJoined, NewMember},
};

use crate::router::AppState;

/// Everyone listed in a `new_chat_members` update gets a welcome, bots included.
fn joined_members(users: &[User]) -> Vec<NewMember> {
    users
        .iter()
        .map(|u| NewMember {
            first_name: Some(u.first_name.clone()),
        })
        .collect()
}

pub async fn handle_new_members(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(users) = msg.new_chat_members() else {
        return Ok(());
    };

    let members = joined_members(users);
    if members.is_empty() {
        return Ok(());
    }

    tracing::info!(
        chat_id = msg.chat.id.0,
        count = members.len(),
        "welcoming new members"
    );

    state
        .interactions
        .handle(IncomingUpdate::MembersJoined(MembersJoined {
            chat_id: ChatId(msg.chat.id.0),
            chat_title: msg.chat.title().map(str::to_string),
            members,
        }))
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, first_name: &str, is_bot: bool) -> User {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "is_bot": is_bot,
            "first_name": first_name,
        }))
        .unwrap()
    }

    #[test]
    fn every_joining_member_is_welcomed_including_bots() {
        let users = vec![
            user(1, "Ada", false),
            user(2, "HelperBot", true),
            user(3, "Linus", false),
        ];

        let names: Vec<_> = joined_members(&users)
            .into_iter()
            .map(|m| m.first_name.unwrap())
            .collect();
        assert_eq!(names, vec!["Ada", "HelperBot", "Linus"]);
    }

    #[test]
    fn bot_only_join_still_produces_a_welcome() {
        let members = joined_members(&[user(9, "OtherBot", true)]);
        assert_eq!(members.len(), 1);
    }
}
