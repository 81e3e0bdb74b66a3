//! Authenticated REST dispatch.

use reqwest::multipart::Form;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{Channel, Guild, GuildMember, Message, ModifyCurrentUser, User};

/// Generic authenticated JSON REST primitive.
///
/// Strictly the JSON-body dispatcher used by the simple resource calls; the
/// multipart message upload bypasses it through [`RestClient::send_multipart`]
/// because that body is multipart, not JSON. The credential is never stored
/// here: the owning [`crate::Client`] passes it into every call.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
}

impl RestClient {
    /// Create a REST client from configuration.
    ///
    /// # Errors
    /// Returns `Error::Http` if the underlying HTTP client fails to build.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("minicord/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Point the client at a different base URL (for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Dispatch one authenticated JSON request.
    ///
    /// Attaches `Authorization: Bot {token}` and, when a body is present,
    /// serializes it as JSON with the matching content type. One attempt
    /// only; transport errors propagate unmodified and non-success statuses
    /// surface as [`Error::Api`] carrying the platform's error body.
    ///
    /// # Errors
    /// `Error::Http` on transport failure, `Error::Api` on a non-2xx
    /// response, `Error::Json` if the success body fails to decode.
    #[instrument(skip(self, token, body))]
    pub async fn request<T, B>(
        &self,
        token: &str,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, path, "dispatching API request");

        let mut req = self
            .http
            .request(method, &url)
            .header("Authorization", format!("Bot {token}"));
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await?;
        Self::decode(response).await
    }

    /// POST a multipart message-creation request.
    ///
    /// The form supplies its own multipart content type; only the bearer
    /// header is added here, never `application/json`.
    ///
    /// # Errors
    /// Same failure modes as [`RestClient::request`].
    #[instrument(skip(self, token, form))]
    pub async fn send_multipart(
        &self,
        token: &str,
        channel_id: &str,
        form: Form,
    ) -> Result<Message> {
        let url = format!("{}/channels/{channel_id}/messages", self.base_url);
        debug!(channel_id, "dispatching multipart message creation");

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bot {token}"))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(Error::from);
        }

        #[derive(Deserialize)]
        struct ApiError {
            code: Option<i32>,
            message: Option<String>,
        }

        let error: ApiError = serde_json::from_slice(&bytes).unwrap_or(ApiError {
            code: Some(i32::from(status.as_u16())),
            message: Some(String::from_utf8_lossy(&bytes).into_owned()),
        });

        Err(Error::Api {
            code: error.code.unwrap_or_else(|| i32::from(status.as_u16())),
            message: error.message.unwrap_or_else(|| "unknown error".into()),
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // User endpoints
    // ─────────────────────────────────────────────────────────────────────

    /// Fetch the current bot user.
    ///
    /// # Errors
    /// See [`RestClient::request`].
    pub async fn get_current_user(&self, token: &str) -> Result<User> {
        self.request(token, Method::GET, "/users/@me", None::<&()>)
            .await
    }

    /// Fetch a user by ID.
    ///
    /// # Errors
    /// See [`RestClient::request`].
    pub async fn get_user(&self, token: &str, user_id: &str) -> Result<User> {
        self.request(token, Method::GET, &format!("/users/{user_id}"), None::<&()>)
            .await
    }

    /// Update the current bot user.
    ///
    /// # Errors
    /// See [`RestClient::request`].
    pub async fn modify_current_user(
        &self,
        token: &str,
        patch: &ModifyCurrentUser,
    ) -> Result<User> {
        self.request(token, Method::PATCH, "/users/@me", Some(patch))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Channel endpoints
    // ─────────────────────────────────────────────────────────────────────

    /// Fetch a channel by ID.
    ///
    /// # Errors
    /// See [`RestClient::request`].
    pub async fn get_channel(&self, token: &str, channel_id: &str) -> Result<Channel> {
        self.request(
            token,
            Method::GET,
            &format!("/channels/{channel_id}"),
            None::<&()>,
        )
        .await
    }

    /// List a user's DM channels.
    ///
    /// # Errors
    /// See [`RestClient::request`].
    pub async fn get_channels(&self, token: &str, user_id: &str) -> Result<Vec<Channel>> {
        self.request(
            token,
            Method::GET,
            &format!("/users/{user_id}/channels"),
            None::<&()>,
        )
        .await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Guild endpoints
    // ─────────────────────────────────────────────────────────────────────

    /// Fetch a guild by ID.
    ///
    /// # Errors
    /// See [`RestClient::request`].
    pub async fn get_guild(&self, token: &str, guild_id: &str) -> Result<Guild> {
        self.request(
            token,
            Method::GET,
            &format!("/guilds/{guild_id}"),
            None::<&()>,
        )
        .await
    }

    /// List a user's guilds.
    ///
    /// # Errors
    /// See [`RestClient::request`].
    pub async fn get_guilds(&self, token: &str, user_id: &str) -> Result<Vec<Guild>> {
        self.request(
            token,
            Method::GET,
            &format!("/users/{user_id}/guilds"),
            None::<&()>,
        )
        .await
    }

    /// List a guild's members.
    ///
    /// # Errors
    /// See [`RestClient::request`].
    pub async fn get_guild_members(&self, token: &str, guild_id: &str) -> Result<Vec<GuildMember>> {
        self.request(
            token,
            Method::GET,
            &format!("/guilds/{guild_id}/members"),
            None::<&()>,
        )
        .await
    }

    /// Fetch one guild member.
    ///
    /// # Errors
    /// See [`RestClient::request`].
    pub async fn get_guild_member(
        &self,
        token: &str,
        guild_id: &str,
        user_id: &str,
    ) -> Result<GuildMember> {
        self.request(
            token,
            Method::GET,
            &format!("/guilds/{guild_id}/members/{user_id}"),
            None::<&()>,
        )
        .await
    }
}
