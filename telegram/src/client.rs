//! HTTPS client for the Telegram Bot API.

use std::time::Duration;

use async_trait::async_trait;
use joinvote_gateway::{
    BotIdentity, Gateway, GatewayError, InlineKeyboard, MemberStatus, MessageRef,
    OutgoingMessage, PollHandle, PollRequest,
};
use joinvote_types::{ChatId, UserId, VoteCounts};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tokio::sync::OnceCell;

use crate::wire::{
    ApiResponse, LinkPreviewOptions, ReplyParameters, TgChatMember, TgInlineKeyboard, TgMessage,
    TgPoll, TgUser, Update,
};

/// Default timeout for ordinary API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Public Bot API server.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Update kinds the poller asks for.
const ALLOWED_UPDATES: [&str; 3] = ["message", "callback_query", "chat_join_request"];

/// Client for one bot token.
///
/// Calls `POST {api_url}/bot{token}/{method}` with a JSON body. The token is
/// never logged.
pub struct TelegramClient {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
    api_url: String,
    token: String,
    identity: OnceCell<BotIdentity>,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>, api_url: &str) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.into(),
            identity: OnceCell::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, GatewayError>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned + Send,
    {
        self.call_with_timeout(method, params, None).await
    }

    async fn call_with_timeout<P, R>(
        &self,
        method: &str,
        params: &P,
        timeout: Option<Duration>,
    ) -> Result<R, GatewayError>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned + Send,
    {
        let mut request = self.http_client.post(self.method_url(method)).json(params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            // Strip the URL: it embeds the token.
            let e = e.without_url();
            if e.is_timeout() {
                GatewayError::Transport(format!("{method} timed out: {e}"))
            } else if e.is_connect() {
                GatewayError::Transport(format!("{method} connection failed: {e}"))
            } else {
                GatewayError::Transport(format!("{method}: {e}"))
            }
        })?;

        // Error replies carry a JSON envelope too, so parse regardless of status.
        let status = response.status();
        let body: ApiResponse<R> = response.json().await.map_err(|e| {
            GatewayError::InvalidResponse(format!(
                "{method} returned HTTP {status} with unparseable body: {}",
                e.without_url()
            ))
        })?;
        let result = body.into_result();
        if let Err(e) = &result {
            tracing::debug!(method, error = %e, "bot API call failed");
        }
        result
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, GatewayError> {
        let params = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ALLOWED_UPDATES,
        });
        // The HTTP timeout must outlast the server-side long-poll.
        let http_timeout = Duration::from_secs(timeout_secs) + DEFAULT_TIMEOUT;
        self.call_with_timeout("getUpdates", &params, Some(http_timeout))
            .await
    }
}

#[async_trait]
impl Gateway for TelegramClient {
    async fn send_message(&self, message: &OutgoingMessage) -> Result<MessageRef, GatewayError> {
        let preview = LinkPreviewOptions {
            is_disabled: message.disable_preview,
        };
        let params = json!({
            "chat_id": message.chat.as_i64(),
            "text": message.text,
            "parse_mode": "HTML",
            "message_thread_id": message.thread_id,
            "reply_parameters": ReplyParameters::to(message.reply_to),
            "reply_markup": message.keyboard.as_ref().map(TgInlineKeyboard::from),
            "protect_content": message.protect_content,
            "link_preview_options": preview,
        });
        let sent: TgMessage = self.call("sendMessage", &strip_nulls(params)).await?;
        Ok(sent.message_ref())
    }

    async fn edit_message_text(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), GatewayError> {
        let preview = LinkPreviewOptions { is_disabled: true };
        let params = json!({
            "chat_id": message.chat.as_i64(),
            "message_id": message.message_id,
            "text": text,
            "parse_mode": "HTML",
            "link_preview_options": preview,
            "reply_markup": keyboard.map(TgInlineKeyboard::from),
        });
        // Returns the edited message, or `true` for inline messages.
        let _: serde_json::Value = self.call("editMessageText", &strip_nulls(params)).await?;
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), GatewayError> {
        let params = json!({
            "chat_id": message.chat.as_i64(),
            "message_id": message.message_id,
        });
        let _: bool = self.call("deleteMessage", &params).await?;
        Ok(())
    }

    async fn send_poll(&self, poll: &PollRequest) -> Result<PollHandle, GatewayError> {
        let params = json!({
            "chat_id": poll.chat.as_i64(),
            "question": poll.question,
            "options": [{ "text": poll.yes_option }, { "text": poll.no_option }],
            "is_anonymous": poll.anonymous,
            "allows_multiple_answers": false,
            "protect_content": true,
            "reply_parameters": ReplyParameters::to(poll.reply_to),
        });
        let sent: TgMessage = self.call("sendPoll", &strip_nulls(params)).await?;
        let message = sent.message_ref();
        let tg_poll = sent
            .poll
            .ok_or_else(|| GatewayError::InvalidResponse("sendPoll returned no poll".into()))?;
        Ok(PollHandle {
            message,
            snapshot: tg_poll.counts()?,
            poll_id: tg_poll.id,
        })
    }

    async fn stop_poll(&self, message: MessageRef) -> Result<VoteCounts, GatewayError> {
        let params = json!({
            "chat_id": message.chat.as_i64(),
            "message_id": message.message_id,
        });
        let poll: TgPoll = self.call("stopPoll", &params).await?;
        poll.counts()
    }

    async fn pin_message(&self, message: MessageRef, silent: bool) -> Result<(), GatewayError> {
        let params = json!({
            "chat_id": message.chat.as_i64(),
            "message_id": message.message_id,
            "disable_notification": silent,
        });
        let _: bool = self.call("pinChatMessage", &params).await?;
        Ok(())
    }

    async fn get_member(&self, chat: ChatId, user: UserId) -> Result<MemberStatus, GatewayError> {
        let params = json!({ "chat_id": chat.as_i64(), "user_id": user.as_i64() });
        let member: TgChatMember = self.call("getChatMember", &params).await?;
        member.status()
    }

    async fn approve_join_request(&self, chat: ChatId, user: UserId) -> Result<(), GatewayError> {
        let params = json!({ "chat_id": chat.as_i64(), "user_id": user.as_i64() });
        let _: bool = self.call("approveChatJoinRequest", &params).await?;
        Ok(())
    }

    async fn decline_join_request(&self, chat: ChatId, user: UserId) -> Result<(), GatewayError> {
        let params = json!({ "chat_id": chat.as_i64(), "user_id": user.as_i64() });
        let _: bool = self.call("declineChatJoinRequest", &params).await?;
        Ok(())
    }

    async fn ban_member(&self, chat: ChatId, user: UserId) -> Result<(), GatewayError> {
        let params = json!({ "chat_id": chat.as_i64(), "user_id": user.as_i64() });
        let _: bool = self.call("banChatMember", &params).await?;
        Ok(())
    }

    async fn answer_interaction(
        &self,
        interaction_id: &str,
        text: &str,
        alert: bool,
    ) -> Result<(), GatewayError> {
        let params = json!({
            "callback_query_id": interaction_id,
            "text": text,
            "show_alert": alert,
        });
        let _: bool = self.call("answerCallbackQuery", &params).await?;
        Ok(())
    }

    async fn bot_identity(&self) -> Result<BotIdentity, GatewayError> {
        self.identity
            .get_or_try_init(|| async {
                let me: TgUser = self.call("getMe", &json!({})).await?;
                let username = me.username.ok_or_else(|| {
                    GatewayError::InvalidResponse("getMe returned no username".into())
                })?;
                Ok::<_, GatewayError>(BotIdentity {
                    id: UserId(me.id),
                    username,
                })
            })
            .await
            .cloned()
    }
}

/// Drop top-level `null`s so optional parameters are simply absent.
fn strip_nulls(mut value: serde_json::Value) -> serde_json::Value {
    if let serde_json::Value::Object(map) = &mut value {
        map.retain(|_, v| !v.is_null());
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_url_trims_trailing_slash() {
        let client = TelegramClient::new("123:abc", "https://api.example.org/");
        assert_eq!(
            client.method_url("getMe"),
            "https://api.example.org/bot123:abc/getMe"
        );
    }

    #[test]
    fn strip_nulls_removes_absent_optionals() {
        let value = strip_nulls(json!({ "chat_id": 1, "reply_parameters": null }));
        assert_eq!(value, json!({ "chat_id": 1 }));
    }
}
