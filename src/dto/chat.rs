//! Chat webhook payloads.
//!
//! The transport forwards one update per request: a text message, a change of the bot's own
//! membership in a chat, or a change of another user's membership.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::member::{GroupId, MemberId};

/// Single inbound chat update.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatUpdate {
    /// Chat the update happened in.
    pub chat: ChatInfo,
    /// User who caused the update.
    pub from: ChatUser,
    /// What happened.
    pub event: ChatEvent,
}

/// What happened in the chat.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Plain text message, possibly a command.
    Message {
        /// Raw message text.
        text: String,
    },
    /// The bot itself was added to or removed from the chat.
    BotMembership {
        /// Whether the bot was in the chat before.
        was_member: bool,
        /// Whether the bot is in the chat now.
        is_member: bool,
    },
    /// Another user joined or left the chat.
    MemberMembership {
        /// User whose membership changed.
        member: ChatUser,
        /// Whether they were in the chat before.
        was_member: bool,
        /// Whether they are in the chat now.
        is_member: bool,
    },
}

/// Chat the update belongs to.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatInfo {
    /// Transport identifier of the chat.
    #[schema(value_type = String)]
    pub id: GroupId,
    /// Group title; doubles as the team name. Absent for private chats.
    #[serde(default)]
    pub title: Option<String>,
    /// Kind of chat.
    pub kind: ChatKind,
}

/// Kind of chat, mirroring what chat platforms report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    /// One-to-one chat with the bot.
    Private,
    /// Small group.
    Group,
    /// Large group.
    Supergroup,
    /// Broadcast channel.
    Channel,
}

impl ChatKind {
    /// Whether teams can live in this kind of chat.
    pub fn is_group(self) -> bool {
        matches!(self, ChatKind::Group | ChatKind::Supergroup)
    }
}

/// Chat user as reported by the transport.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatUser {
    /// Transport identifier of the user.
    #[schema(value_type = String)]
    pub id: MemberId,
    /// Handle, when the user has one.
    #[serde(default)]
    pub username: Option<String>,
    /// Full name as shown by the transport.
    #[serde(default)]
    pub full_name: String,
}

impl ChatUser {
    /// Name used in replies and on leaderboards: handle first, then full name, then id.
    pub fn display_name(&self) -> String {
        [self.username.as_deref(), Some(self.full_name.as_str())]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// Text the transport should post back, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChatReply {
    /// Message to post; `null` when the update needs no answer.
    pub reply: Option<String>,
}

impl ChatReply {
    /// Reply with `text`.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
        }
    }

    /// Stay silent.
    pub fn none() -> Self {
        Self { reply: None }
    }
}
