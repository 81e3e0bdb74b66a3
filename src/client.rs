//! The session facade.

use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::feed::{EventFeed, FeedEvent};
use crate::message::CreateMessage;
use crate::rest::RestClient;
use crate::types::{
    Channel, GatewayPayload, Guild, GuildMember, Message, ModifyCurrentUser, Presence, User,
};

/// Events re-emitted to callers after [`Client::login`].
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Session established; carries the bot user.
    Ready(User),
    /// A message was created.
    Message(Message),
}

/// The bot session: owns the credential, the event-feed collaborator, and
/// the REST dispatcher.
///
/// Concurrent REST calls are independent; each one captures the credential
/// at call time, so a request started just before `login` replaces the
/// token may still complete under the old one.
pub struct Client {
    token: Option<String>,
    rest: RestClient,
    feed: Box<dyn EventFeed>,
    user: Arc<RwLock<Option<User>>>,
}

impl Client {
    /// Create a client with default configuration.
    ///
    /// # Errors
    /// Returns `Error::Http` if the underlying HTTP client fails to build.
    pub fn new(feed: impl EventFeed + 'static) -> Result<Self> {
        Self::with_config(feed, &Config::default())
    }

    /// Create a client with explicit configuration.
    ///
    /// # Errors
    /// Returns `Error::Http` if the underlying HTTP client fails to build.
    pub fn with_config(feed: impl EventFeed + 'static, config: &Config) -> Result<Self> {
        Ok(Self {
            token: None,
            rest: RestClient::new(config)?,
            feed: Box::new(feed),
            user: Arc::new(RwLock::new(None)),
        })
    }

    /// Point REST calls at a different base URL (for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.rest = self.rest.with_base_url(url);
        self
    }

    // The token is retained across `logout`; only `login` replaces it.
    fn credential(&self) -> Result<&str> {
        self.token.as_deref().ok_or(Error::Auth)
    }

    /// The bot user captured from the feed's Ready event, if seen yet.
    pub async fn user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    /// Store the credential and connect the event feed. Feed events are
    /// forwarded to the returned receiver; the Ready user is also recorded
    /// on the client.
    ///
    /// # Errors
    /// Returns `Error::Feed` if the feed cannot connect.
    pub async fn login(&mut self, token: impl Into<String>) -> Result<mpsc::Receiver<ClientEvent>> {
        let token = token.into();
        let mut feed_rx = self.feed.connect(&token).await?;
        self.token = Some(token);

        let (tx, rx) = mpsc::channel(256);
        let user = Arc::clone(&self.user);
        tokio::spawn(async move {
            while let Some(event) = feed_rx.recv().await {
                let event = match event {
                    FeedEvent::Ready(ready) => {
                        info!(username = %ready.username, "session ready");
                        *user.write().await = Some(ready.clone());
                        ClientEvent::Ready(ready)
                    }
                    FeedEvent::Message(message) => ClientEvent::Message(message),
                };
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }

    /// Disconnect the event feed. The credential is retained, so REST calls
    /// keep working until the next `login` replaces it.
    ///
    /// # Errors
    /// Returns `Error::Feed` if the feed fails to shut down cleanly.
    pub async fn logout(&mut self) -> Result<()> {
        self.feed.disconnect().await
    }

    /// Update the bot presence over the event feed.
    ///
    /// # Errors
    /// Returns `Error::Json` if the presence fails to serialize or
    /// `Error::Feed` if the feed send fails.
    pub async fn set_presence(&mut self, presence: &Presence) -> Result<()> {
        self.feed.send(GatewayPayload::presence(presence)?).await
    }

    /// Create a message in a channel.
    ///
    /// Text, embeds, and file attachments are folded into one multipart
    /// request: one named part per file plus a `payload_json` part with the
    /// rest of the description. A missing credential or empty channel id
    /// fails before any network activity.
    ///
    /// # Errors
    /// `Error::Auth` without a credential, `Error::Validation` on an empty
    /// channel id, otherwise the transport or API error unmodified.
    #[instrument(skip(self, message))]
    pub async fn send_message(&self, channel_id: &str, message: CreateMessage) -> Result<Message> {
        let token = self.credential()?;
        if channel_id.is_empty() {
            return Err(Error::Validation("channel id must not be empty".into()));
        }

        let form = message.into_form()?;
        self.rest.send_multipart(token, channel_id, form).await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Resource getters, delegating to the REST dispatcher
    // ─────────────────────────────────────────────────────────────────────

    /// Fetch the current bot user from the API.
    ///
    /// # Errors
    /// `Error::Auth` without a credential, otherwise see [`RestClient::request`].
    pub async fn current_user(&self) -> Result<User> {
        self.rest.get_current_user(self.credential()?).await
    }

    /// Fetch a user by ID.
    ///
    /// # Errors
    /// `Error::Auth` without a credential, otherwise see [`RestClient::request`].
    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.rest.get_user(self.credential()?, user_id).await
    }

    /// Update the current bot user.
    ///
    /// # Errors
    /// `Error::Auth` without a credential, otherwise see [`RestClient::request`].
    pub async fn modify_current_user(&self, patch: &ModifyCurrentUser) -> Result<User> {
        self.rest
            .modify_current_user(self.credential()?, patch)
            .await
    }

    /// Fetch a channel by ID.
    ///
    /// # Errors
    /// `Error::Auth` without a credential, otherwise see [`RestClient::request`].
    pub async fn get_channel(&self, channel_id: &str) -> Result<Channel> {
        self.rest.get_channel(self.credential()?, channel_id).await
    }

    /// List a user's DM channels.
    ///
    /// # Errors
    /// `Error::Auth` without a credential, otherwise see [`RestClient::request`].
    pub async fn get_channels(&self, user_id: &str) -> Result<Vec<Channel>> {
        self.rest.get_channels(self.credential()?, user_id).await
    }

    /// Fetch a guild by ID.
    ///
    /// # Errors
    /// `Error::Auth` without a credential, otherwise see [`RestClient::request`].
    pub async fn get_guild(&self, guild_id: &str) -> Result<Guild> {
        self.rest.get_guild(self.credential()?, guild_id).await
    }

    /// List a user's guilds.
    ///
    /// # Errors
    /// `Error::Auth` without a credential, otherwise see [`RestClient::request`].
    pub async fn get_guilds(&self, user_id: &str) -> Result<Vec<Guild>> {
        self.rest.get_guilds(self.credential()?, user_id).await
    }

    /// List a guild's members.
    ///
    /// # Errors
    /// `Error::Auth` without a credential, otherwise see [`RestClient::request`].
    pub async fn get_guild_members(&self, guild_id: &str) -> Result<Vec<GuildMember>> {
        self.rest
            .get_guild_members(self.credential()?, guild_id)
            .await
    }

    /// Fetch one guild member.
    ///
    /// # Errors
    /// `Error::Auth` without a credential, otherwise see [`RestClient::request`].
    pub async fn get_guild_member(&self, guild_id: &str, user_id: &str) -> Result<GuildMember> {
        self.rest
            .get_guild_member(self.credential()?, guild_id, user_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::EmbedBuilder;
    use crate::message::FileUpload;
    use async_trait::async_trait;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// A feed that connects successfully and emits a scripted event list.
    struct ScriptedFeed {
        events: Vec<FeedEvent>,
        sent: Arc<std::sync::Mutex<Vec<GatewayPayload>>>,
        connected: bool,
    }

    impl ScriptedFeed {
        fn new(events: Vec<FeedEvent>) -> Self {
            Self {
                events,
                sent: Arc::new(std::sync::Mutex::new(Vec::new())),
                connected: false,
            }
        }

        fn empty() -> Self {
            Self::new(Vec::new())
        }

        fn sent_handle(&self) -> Arc<std::sync::Mutex<Vec<GatewayPayload>>> {
            Arc::clone(&self.sent)
        }
    }

    #[async_trait]
    impl EventFeed for ScriptedFeed {
        async fn connect(&mut self, _token: &str) -> Result<mpsc::Receiver<FeedEvent>> {
            self.connected = true;
            let (tx, rx) = mpsc::channel(16);
            let events = std::mem::take(&mut self.events);
            tokio::spawn(async move {
                for event in events {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
            });
            Ok(rx)
        }

        async fn disconnect(&mut self) -> Result<()> {
            self.connected = false;
            Ok(())
        }

        async fn send(&mut self, payload: GatewayPayload) -> Result<()> {
            if !self.connected {
                return Err(Error::Feed("not connected".into()));
            }
            self.sent.lock().unwrap().push(payload);
            Ok(())
        }
    }

    fn bot_user() -> User {
        User {
            id: "1".into(),
            username: "testbot".into(),
            discriminator: Some("0001".into()),
            global_name: None,
            avatar: None,
            bot: true,
        }
    }

    fn message_json() -> serde_json::Value {
        serde_json::json!({
            "id": "999",
            "channel_id": "123",
            "content": "hi",
            "timestamp": "2020-01-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn send_message_without_credential_fails_before_network() {
        let server = MockServer::start().await;
        // Any request reaching the server would trip this expectation.
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_json()))
            .expect(0)
            .mount(&server)
            .await;

        let client = Client::new(ScriptedFeed::empty())
            .unwrap()
            .with_base_url(server.uri());

        let err = client
            .send_message("123", CreateMessage::new().content("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth));
    }

    #[tokio::test]
    async fn send_message_with_empty_channel_id_fails_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_json()))
            .expect(0)
            .mount(&server)
            .await;

        let mut client = Client::new(ScriptedFeed::empty())
            .unwrap()
            .with_base_url(server.uri());
        client.login("tok").await.unwrap();

        let err = client
            .send_message("", CreateMessage::new().content("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn content_only_message_posts_multipart_with_single_payload_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/123/messages"))
            .and(header("Authorization", "Bot tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_json()))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = Client::new(ScriptedFeed::empty())
            .unwrap()
            .with_base_url(server.uri());
        client.login("tok").await.unwrap();

        let sent = client
            .send_message("123", CreateMessage::new().content("hi"))
            .await
            .unwrap();
        assert_eq!(sent.id, "999");

        let requests = server.received_requests().await.unwrap();
        let request = &requests[0];
        let content_type = request.headers.get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data"));

        let body = String::from_utf8_lossy(&request.body);
        assert!(body.contains(r#"name="payload_json""#));
        assert!(body.contains(r#"{"content":"hi"}"#));
        // No file parts for a text-only message.
        assert!(!body.contains("filename="));
    }

    #[tokio::test]
    async fn files_become_named_parts_and_are_stripped_from_payload_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/123/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_json()))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = Client::new(ScriptedFeed::empty())
            .unwrap()
            .with_base_url(server.uri());
        client.login("tok").await.unwrap();

        let message = CreateMessage::new()
            .add_file(FileUpload::new("a.png", b"alpha-bytes".to_vec()))
            .add_file(FileUpload::new("b.png", b"bravo-bytes".to_vec()));
        client.send_message("123", message).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);

        // The upload name doubles as both part name and filename.
        assert!(body.contains(r#"name="a.png"; filename="a.png""#));
        assert!(body.contains(r#"name="b.png"; filename="b.png""#));
        assert!(body.contains("alpha-bytes"));
        assert!(body.contains("bravo-bytes"));
        assert!(body.contains(r#"name="payload_json""#));
        assert!(!body.contains(r#""files""#));
    }

    #[tokio::test]
    async fn builder_embed_reaches_payload_as_plain_structure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/123/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_json()))
            .mount(&server)
            .await;

        let mut client = Client::new(ScriptedFeed::empty())
            .unwrap()
            .with_base_url(server.uri());
        client.login("tok").await.unwrap();

        let embed = EmbedBuilder::new()
            .title("T")
            .unwrap()
            .description("D")
            .unwrap();
        client
            .send_message("123", CreateMessage::new().embed(embed))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains(r#""embed":{"title":"T","description":"D"}"#));
    }

    #[tokio::test]
    async fn empty_message_still_posts_a_payload_json_part() {
        // Rejecting an empty message is the server's job, not the client's.
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/123/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": 50006,
                "message": "Cannot send an empty message"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = Client::new(ScriptedFeed::empty())
            .unwrap()
            .with_base_url(server.uri());
        client.login("tok").await.unwrap();

        let err = client
            .send_message("123", CreateMessage::new())
            .await
            .unwrap_err();
        match err {
            Error::Api { code, .. } => assert_eq!(code, 50006),
            other => panic!("expected Error::Api, got {other:?}"),
        }

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains(r#"name="payload_json""#));
        assert!(body.contains("{}"));
    }

    #[tokio::test]
    async fn transport_failure_rejects_with_original_error() {
        let mut client = Client::new(ScriptedFeed::empty())
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        client.login("tok").await.unwrap();

        let err = client
            .send_message("123", CreateMessage::new().content("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[tokio::test]
    async fn login_records_ready_user_and_forwards_events() {
        let feed = ScriptedFeed::new(vec![FeedEvent::Ready(bot_user())]);
        let mut client = Client::new(feed).unwrap();
        let mut events = client.login("tok").await.unwrap();

        match events.recv().await.unwrap() {
            ClientEvent::Ready(user) => assert_eq!(user.username, "testbot"),
            other => panic!("expected Ready, got {other:?}"),
        }
        assert_eq!(client.user().await.unwrap().id, "1");
    }

    #[tokio::test]
    async fn message_events_are_forwarded() {
        let incoming: Message = serde_json::from_value(message_json()).unwrap();
        let feed = ScriptedFeed::new(vec![
            FeedEvent::Ready(bot_user()),
            FeedEvent::Message(incoming),
        ]);
        let mut client = Client::new(feed).unwrap();
        let mut events = client.login("tok").await.unwrap();

        events.recv().await.unwrap(); // Ready
        match events.recv().await.unwrap() {
            ClientEvent::Message(message) => assert_eq!(message.content, "hi"),
            other => panic!("expected Message, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn set_presence_sends_opcode_3_through_the_feed() {
        let feed = ScriptedFeed::empty();
        let sent = feed.sent_handle();
        let mut client = Client::new(feed).unwrap();

        // Before login the feed is not connected.
        let err = client.set_presence(&Presence::default()).await.unwrap_err();
        assert!(matches!(err, Error::Feed(_)));

        client.login("tok").await.unwrap();
        client.set_presence(&Presence::default()).await.unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].op, 3);
    }

    #[tokio::test]
    async fn logout_retains_credential_for_rest_calls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .and(header("Authorization", "Bot tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "1",
                "username": "testbot",
                "bot": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = Client::new(ScriptedFeed::empty())
            .unwrap()
            .with_base_url(server.uri());
        client.login("tok").await.unwrap();
        client.logout().await.unwrap();

        // REST still authenticated after logout.
        client.current_user().await.unwrap();
    }

    #[tokio::test]
    async fn getters_without_credential_fail_fast() {
        let client = Client::new(ScriptedFeed::empty()).unwrap();
        assert!(matches!(client.current_user().await, Err(Error::Auth)));
        assert!(matches!(client.get_guilds("@me").await, Err(Error::Auth)));
        assert!(matches!(client.get_channel("1").await, Err(Error::Auth)));
    }
}
