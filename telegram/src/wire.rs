//! Bot API wire types and their mapping onto gateway types.
//!
//! Only the fields the bot reads are modelled; serde ignores the rest.

use joinvote_gateway::{
    ButtonAction, Chat, GatewayError, InboundEvent, InlineKeyboard, MemberStatus, MessageRef,
    User,
};
use joinvote_types::{ChatId, UserId, VoteCounts};
use serde::{Deserialize, Serialize};

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> Result<T, GatewayError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(GatewayError::InvalidResponse(
                "ok response without result".into(),
            )),
            (false, _) => Err(GatewayError::Api {
                code: self.error_code.unwrap_or(0),
                description: self.description.unwrap_or_default(),
            }),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl From<TgUser> for User {
    fn from(u: TgUser) -> Self {
        User {
            id: UserId(u.id),
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TgChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl From<TgChat> for Chat {
    fn from(c: TgChat) -> Self {
        Chat {
            id: ChatId(c.id),
            title: c.title,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TgPollOption {
    pub text: String,
    pub voter_count: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TgPoll {
    pub id: String,
    pub options: Vec<TgPollOption>,
}

impl TgPoll {
    /// Option 0 is "yes", option 1 is "no".
    pub fn counts(&self) -> Result<VoteCounts, GatewayError> {
        match self.options.as_slice() {
            [yes, no, ..] => Ok(VoteCounts::new(yes.voter_count, no.voter_count)),
            _ => Err(GatewayError::InvalidResponse(format!(
                "poll {} has {} options",
                self.id,
                self.options.len()
            ))),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
    pub chat: TgChat,
    #[serde(default)]
    pub from: Option<TgUser>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub poll: Option<TgPoll>,
    #[serde(default)]
    pub pinned_message: Option<serde_json::Value>,
}

impl TgMessage {
    pub fn message_ref(&self) -> MessageRef {
        MessageRef::new(ChatId(self.chat.id), self.message_id)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TgCallbackQuery {
    pub id: String,
    pub from: TgUser,
    #[serde(default)]
    pub message: Option<TgMessage>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TgChatJoinRequest {
    pub chat: TgChat,
    pub from: TgUser,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TgChatMember {
    pub status: String,
    #[serde(default)]
    pub can_invite_users: Option<bool>,
    #[serde(default)]
    pub is_member: Option<bool>,
}

impl TgChatMember {
    pub fn status(&self) -> Result<MemberStatus, GatewayError> {
        Ok(match self.status.as_str() {
            "creator" => MemberStatus::Creator,
            "administrator" => MemberStatus::Administrator {
                can_invite_users: self.can_invite_users.unwrap_or(false),
            },
            "member" => MemberStatus::Member,
            "restricted" => MemberStatus::Restricted {
                is_member: self.is_member.unwrap_or(false),
            },
            "left" => MemberStatus::Left,
            "kicked" => MemberStatus::Kicked,
            other => {
                return Err(GatewayError::InvalidResponse(format!(
                    "unknown member status {other}"
                )))
            }
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TgMessage>,
    #[serde(default)]
    pub callback_query: Option<TgCallbackQuery>,
    #[serde(default)]
    pub chat_join_request: Option<TgChatJoinRequest>,
}

impl Update {
    /// The event this update carries, if the bot handles it.
    pub fn into_event(self) -> Option<InboundEvent> {
        if let Some(request) = self.chat_join_request {
            return Some(InboundEvent::JoinRequest {
                chat: request.chat.into(),
                user: request.from.into(),
            });
        }
        if let Some(query) = self.callback_query {
            let data = query.data?;
            return Some(InboundEvent::Callback {
                id: query.id,
                from: query.from.into(),
                message: query.message.as_ref().map(TgMessage::message_ref),
                data,
            });
        }
        let message = self.message?;
        if message.pinned_message.is_some() {
            return Some(InboundEvent::PinnedService {
                message: message.message_ref(),
                from: message.from.map(User::from),
            });
        }
        let (command, args) = parse_command(message.text.as_deref()?)?;
        let from = message.from.clone()?;
        Some(InboundEvent::Command {
            message: message.message_ref(),
            from: from.into(),
            private: message.chat.kind == "private",
            command,
            args,
        })
    }
}

/// Split `/cmd@bot rest of line` into `("cmd", Some("rest of line"))`.
pub fn parse_command(text: &str) -> Option<(String, Option<String>)> {
    let rest = text.strip_prefix('/')?;
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, Some(args.trim().to_string()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };
    let command = head.split('@').next().unwrap_or(head);
    if command.is_empty() {
        return None;
    }
    Some((command.to_lowercase(), args))
}

// ── Outbound parameter types ────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TgInlineButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TgInlineKeyboard {
    pub inline_keyboard: Vec<Vec<TgInlineButton>>,
}

impl From<&InlineKeyboard> for TgInlineKeyboard {
    fn from(kb: &InlineKeyboard) -> Self {
        TgInlineKeyboard {
            inline_keyboard: kb
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| match &b.action {
                            ButtonAction::Callback(data) => TgInlineButton {
                                text: b.text.clone(),
                                callback_data: Some(data.clone()),
                                url: None,
                            },
                            ButtonAction::Url(url) => TgInlineButton {
                                text: b.text.clone(),
                                callback_data: None,
                                url: Some(url.clone()),
                            },
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReplyParameters {
    pub message_id: i64,
    pub allow_sending_without_reply: bool,
}

impl ReplyParameters {
    pub fn to(message_id: Option<i64>) -> Option<Self> {
        message_id.map(|message_id| ReplyParameters {
            message_id,
            allow_sending_without_reply: true,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct LinkPreviewOptions {
    pub is_disabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use joinvote_gateway::InlineButton;

    fn update(json: &str) -> Update {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn join_request_update_maps_to_event() {
        let event = update(
            r#"{"update_id":1,"chat_join_request":{
                "chat":{"id":-100,"type":"supergroup","title":"Rustaceans"},
                "from":{"id":7,"is_bot":false,"first_name":"Ferris","username":"ferris"},
                "date":0}}"#,
        )
        .into_event();
        match event {
            Some(InboundEvent::JoinRequest { chat, user }) => {
                assert_eq!(chat.id, ChatId(-100));
                assert_eq!(chat.title.as_deref(), Some("Rustaceans"));
                assert_eq!(user.id, UserId(7));
                assert_eq!(user.username.as_deref(), Some("ferris"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn callback_without_data_is_ignored() {
        let event = update(
            r#"{"update_id":2,"callback_query":{"id":"q","from":{"id":1,"first_name":"A"}}}"#,
        )
        .into_event();
        assert!(event.is_none());
    }

    #[test]
    fn pinned_service_message_is_recognised() {
        let event = update(
            r#"{"update_id":3,"message":{"message_id":9,"chat":{"id":-1,"type":"group"},
                "from":{"id":999,"is_bot":true,"first_name":"bot"},
                "pinned_message":{"message_id":8}}}"#,
        )
        .into_event();
        assert!(matches!(event, Some(InboundEvent::PinnedService { .. })));
    }

    #[test]
    fn start_command_carries_argument() {
        let event = update(
            r#"{"update_id":4,"message":{"message_id":1,"chat":{"id":5,"type":"private"},
                "from":{"id":5,"first_name":"A"},"text":"/start r1_abc"}}"#,
        )
        .into_event();
        match event {
            Some(InboundEvent::Command {
                command,
                args,
                private,
                ..
            }) => {
                assert_eq!(command, "start");
                assert_eq!(args.as_deref(), Some("r1_abc"));
                assert!(private);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn parse_command_strips_bot_mention() {
        assert_eq!(parse_command("/help@joinvote_bot"), Some(("help".into(), None)));
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command("/"), None);
    }

    #[test]
    fn error_envelope_maps_to_api_error() {
        let resp: ApiResponse<bool> = serde_json::from_str(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: message can't be deleted"}"#,
        )
        .unwrap();
        match resp.into_result() {
            Err(GatewayError::Api { code, description }) => {
                assert_eq!(code, 400);
                assert!(description.contains("can't be deleted"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn member_status_parsing() {
        let admin: TgChatMember =
            serde_json::from_str(r#"{"status":"administrator","can_invite_users":true}"#).unwrap();
        assert_eq!(
            admin.status().unwrap(),
            MemberStatus::Administrator { can_invite_users: true }
        );
        let left: TgChatMember = serde_json::from_str(r#"{"status":"left"}"#).unwrap();
        assert!(!left.status().unwrap().is_member());
    }

    #[test]
    fn poll_counts_read_first_two_options() {
        let poll: TgPoll = serde_json::from_str(
            r#"{"id":"p","options":[{"text":"Yes","voter_count":3},{"text":"No","voter_count":1}]}"#,
        )
        .unwrap();
        assert_eq!(poll.counts().unwrap(), VoteCounts::new(3, 1));
    }

    #[test]
    fn keyboard_serializes_callback_and_url_buttons() {
        let kb = InlineKeyboard::new().row(vec![
            InlineButton::callback("Yes", "v1:v:x:yes"),
            InlineButton::url("Live", "https://t.me/b?start=r1_x"),
        ]);
        let json = serde_json::to_value(TgInlineKeyboard::from(&kb)).unwrap();
        assert_eq!(json["inline_keyboard"][0][0]["callback_data"], "v1:v:x:yes");
        assert_eq!(json["inline_keyboard"][0][1]["url"], "https://t.me/b?start=r1_x");
        assert!(json["inline_keyboard"][0][1].get("callback_data").is_none());
    }
}
