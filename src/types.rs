//! Discord API types.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Discord user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: String,

    /// Username
    pub username: String,

    /// Discriminator (legacy)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,

    /// Global display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,

    /// Avatar hash
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Whether this is a bot
    #[serde(default)]
    pub bot: bool,
}

/// Discord guild (server).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guild {
    /// Guild ID
    pub id: String,

    /// Guild name
    pub name: String,

    /// Icon hash
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Owner ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

/// Discord guild member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildMember {
    /// The member's user, absent in some gateway payloads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    /// Guild-specific nickname
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,

    /// Role IDs
    #[serde(default)]
    pub roles: Vec<String>,

    /// When the member joined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<String>,
}

/// Discord channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    /// Channel ID
    pub id: String,

    /// Channel type
    #[serde(rename = "type")]
    pub channel_type: i32,

    /// Guild ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,

    /// Channel name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Topic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

/// Discord message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message ID
    pub id: String,

    /// Channel ID
    pub channel_id: String,

    /// Author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,

    /// Message content
    #[serde(default)]
    pub content: String,

    /// Timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Attachments
    #[serde(default)]
    pub attachments: Vec<Attachment>,

    /// Embeds
    #[serde(default)]
    pub embeds: Vec<Embed>,

    /// Guild ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
}

/// Discord attachment as it appears on a fetched message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment ID
    pub id: String,

    /// Filename
    pub filename: String,

    /// File size
    pub size: u64,

    /// URL
    pub url: String,

    /// Content type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Discord embed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Embed {
    /// Title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,

    /// Fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,

    /// Footer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,

    /// Image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,

    /// Thumbnail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,

    /// Author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,

    /// Timestamp, RFC 3339
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Embed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    /// Field name
    pub name: String,

    /// Field value
    pub value: String,

    /// Inline display
    #[serde(default)]
    pub inline: bool,
}

/// Embed footer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedFooter {
    /// Footer text
    pub text: String,

    /// Icon URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Embed image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedImage {
    /// Image URL
    pub url: String,
}

/// Embed thumbnail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedThumbnail {
    /// Thumbnail URL
    pub url: String,
}

/// Embed author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedAuthor {
    /// Author name
    pub name: String,

    /// Icon URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Patch body for updating the current bot user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModifyCurrentUser {
    /// New username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// New avatar as a data URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Presence update sent over the event feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Presence {
    /// Unix time (ms) the client went idle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<u64>,

    /// Activity shown under the bot's name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<Activity>,

    /// Status string (online, idle, dnd, invisible)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Whether the client is AFK
    #[serde(default)]
    pub afk: bool,
}

/// Activity carried in a presence update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Activity name
    pub name: String,

    /// Activity type
    #[serde(rename = "type", default)]
    pub kind: i32,
}

/// Gateway opcodes shared with event-feed implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum GatewayOpcode {
    /// Receive: an event was dispatched.
    Dispatch = 0,
    /// Send/Receive: fired periodically to keep the connection alive.
    Heartbeat = 1,
    /// Send: starts a new session.
    Identify = 2,
    /// Send: update presence.
    PresenceUpdate = 3,
    /// Send: resume a previous session.
    Resume = 6,
    /// Receive: reconnect to the gateway.
    Reconnect = 7,
    /// Receive: session invalidated.
    InvalidSession = 9,
    /// Receive: sent after connecting.
    Hello = 10,
    /// Receive: heartbeat acknowledged.
    HeartbeatAck = 11,
}

impl TryFrom<i32> for GatewayOpcode {
    type Error = ();

    fn try_from(value: i32) -> std::result::Result<Self, ()> {
        match value {
            0 => Ok(Self::Dispatch),
            1 => Ok(Self::Heartbeat),
            2 => Ok(Self::Identify),
            3 => Ok(Self::PresenceUpdate),
            6 => Ok(Self::Resume),
            7 => Ok(Self::Reconnect),
            9 => Ok(Self::InvalidSession),
            10 => Ok(Self::Hello),
            11 => Ok(Self::HeartbeatAck),
            _ => Err(()),
        }
    }
}

/// Gateway event payload shared with event-feed implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayload {
    /// Opcode
    pub op: i32,

    /// Event data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<serde_json::Value>,

    /// Sequence number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayPayload {
    /// Build a presence-update payload.
    ///
    /// # Errors
    /// Returns `Error::Json` if the presence fails to serialize.
    pub fn presence(presence: &Presence) -> Result<Self> {
        Ok(Self {
            op: GatewayOpcode::PresenceUpdate as i32,
            d: Some(serde_json::to_value(presence)?),
            s: None,
            t: None,
        })
    }
}
