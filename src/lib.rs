//! Minimal Discord bot client.
//!
//! Authenticates a bot session, consumes a persistent event feed, and
//! issues authenticated REST calls. The centerpiece is message creation:
//! text, rich embeds, and binary file attachments are folded into one
//! multipart request whose `payload_json` part carries the serialized
//! description and whose remaining parts carry the file bytes.
//!
//! - [`Client`] owns the credential and the [`EventFeed`] collaborator and
//!   exposes `login`, `logout`, `set_presence`, `send_message`, and the
//!   resource getters.
//! - [`EmbedBuilder`] assembles one validated rich embed.
//! - [`RestClient`] is the generic authenticated JSON dispatcher the
//!   getters build on.
//!
//! The gateway protocol state machine is not implemented here; implement
//! [`EventFeed`] over your transport of choice and hand it to the client.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod client;
mod config;
mod embed;
mod error;
mod feed;
mod message;
mod rest;
pub mod types;

pub use client::{Client, ClientEvent};
pub use config::Config;
pub use embed::EmbedBuilder;
pub use error::{Error, Result};
pub use feed::{EventFeed, FeedEvent};
pub use message::{CreateMessage, EmbedSource, FileUpload};
pub use rest::RestClient;
pub use types::{Embed, GatewayPayload, Message, Presence, User};
