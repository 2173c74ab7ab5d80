//! Chat events as seen by the command router.

use twitch_irc::message::PrivmsgMessage;

/// `msg-id` tag Twitch sets on "Highlight My Message" channel-point redemptions.
pub const HIGHLIGHTED_MESSAGE: &str = "highlighted-message";

/// A chat message with the metadata the router needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    /// Channel login without `#`.
    pub channel: String,
    pub sender_login: String,
    /// Display name, used in log lines.
    pub sender_name: String,
    pub text: String,
    /// Value of the `msg-id` tag, if any.
    pub msg_id: Option<String>,
    /// Value of the `custom-reward-id` tag, if any.
    pub reward_id: Option<String>,
    /// True when the bot itself sent this message.
    pub is_self: bool,
}

impl ChatEvent {
    /// Build an event from a Twitch PRIVMSG, flagging messages sent by `bot_login`.
    pub fn from_privmsg(msg: &PrivmsgMessage, bot_login: &str) -> Self {
        let tag = |key: &str| {
            msg.source
                .tags
                .0
                .get(key)
                .and_then(|v| v.as_deref())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            channel: msg.channel_login.clone(),
            sender_login: msg.sender.login.clone(),
            sender_name: msg.sender.name.clone(),
            text: msg.message_text.clone(),
            msg_id: tag("msg-id"),
            reward_id: tag("custom-reward-id"),
            is_self: !bot_login.is_empty() && msg.sender.login.eq_ignore_ascii_case(bot_login),
        }
    }

    pub fn is_highlighted(&self) -> bool {
        self.msg_id.as_deref() == Some(HIGHLIGHTED_MESSAGE)
    }
}
