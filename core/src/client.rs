//! Entry point for the messaging API.
//!
//! # Design
//! `Client` holds configuration and a shared transport and carries no
//! mutable state between calls. Each operation returns an inert `Call` bound
//! to a fixed endpoint; nothing touches the network until `Call::execute`.
//! Every request carries the bearer token and user agent; POST requests add
//! the JSON content type.

use std::fmt;
use std::sync::Arc;

use crate::call::Call;
use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::http::{HttpMethod, ReqwestTransport, Transport};
use crate::message::Message;
use crate::response::{BasicResponse, Decode, MessageContentResponse, UserProfileResponse};

pub const ENDPOINT_PUSH: &str = "/v2/bot/message/push";
pub const ENDPOINT_REPLY: &str = "/v2/bot/message/reply";

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=UTF-8";

pub fn profile_path(user_id: &str) -> String {
    format!("/v2/bot/profile/{user_id}")
}

pub fn message_content_path(message_id: &str) -> String {
    format!("/v2/bot/message/{message_id}/content")
}

#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl Client {
    pub fn new(channel_token: &str) -> Result<Self, Error> {
        Self::from_config(ClientConfig::new(channel_token))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, Error> {
        let transport = ReqwestTransport::new()?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send messages to a user, group or room.
    pub fn push(&self, to: &str, messages: impl IntoIterator<Item = Message>) -> Call<BasicResponse> {
        self.post(ENDPOINT_PUSH, Envelope::push(to, messages))
    }

    /// Answer an event through its reply token.
    pub fn reply(&self, reply_token: &str, messages: impl IntoIterator<Item = Message>) -> Call<BasicResponse> {
        self.post(ENDPOINT_REPLY, Envelope::reply(reply_token, messages))
    }

    pub fn get_profile(&self, user_id: &str) -> Call<UserProfileResponse> {
        self.get(&profile_path(user_id))
    }

    /// Fetch the binary content (image, video, audio) attached to a message.
    pub fn get_message_content(&self, message_id: &str) -> Call<MessageContentResponse> {
        self.get(&message_content_path(message_id))
    }

    fn post<T: Decode>(&self, path: &str, envelope: Envelope) -> Call<T> {
        let mut headers = self.base_headers();
        headers.push(("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string()));
        Call::new(
            Arc::clone(&self.transport),
            HttpMethod::Post,
            self.url(path),
            headers,
            Some(envelope),
        )
    }

    fn get<T: Decode>(&self, path: &str) -> Call<T> {
        Call::new(
            Arc::clone(&self.transport),
            HttpMethod::Get,
            self.url(path),
            self.base_headers(),
            None,
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.endpoint_base)
    }

    fn base_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Authorization".to_string(), format!("Bearer {}", self.config.channel_token)),
            ("User-Agent".to_string(), self.config.user_agent.clone()),
        ]
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::TransportError;
    use crate::http::{HttpRequest, HttpResponse};

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            Err(TransportError::Other("connection refused".to_string()))
        }
    }

    fn client() -> Client {
        let config = ClientConfig::new("test-token").endpoint_base("http://localhost:3000/");
        Client::with_transport(config, Arc::new(Unreachable)).unwrap()
    }

    #[test]
    fn push_produces_correct_request() {
        let req = client()
            .push("U0cc15697597f61dd8b01cea8b027050e", [Message::text("Hello, world")])
            .request()
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/v2/bot/message/push");
        assert_eq!(req.header("authorization"), Some("Bearer test-token"));
        assert_eq!(req.header("content-type"), Some(CONTENT_TYPE_JSON));
        assert_eq!(
            req.body.as_deref(),
            Some(&b"{\"to\":\"U0cc15697597f61dd8b01cea8b027050e\",\"messages\":[{\"type\":\"text\",\"text\":\"Hello, world\"}]}\n"[..])
        );
    }

    #[test]
    fn reply_produces_correct_request() {
        let req = client()
            .reply("nHuyWiB7yP5Zw52FIkcQobQuGDXCTA", vec![Message::text("a"), Message::text("b")])
            .request()
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/v2/bot/message/reply");
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["replyToken"], "nHuyWiB7yP5Zw52FIkcQobQuGDXCTA");
        assert_eq!(body["messages"][1]["text"], "b");
    }

    #[test]
    fn push_and_reply_use_different_endpoints() {
        assert_ne!(ENDPOINT_PUSH, ENDPOINT_REPLY);
    }

    #[test]
    fn profile_request_has_no_body() {
        let req = client().get_profile("U4af4980629").request().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/v2/bot/profile/U4af4980629");
        assert!(req.body.is_none());
        assert!(req.header("content-type").is_none());
        assert!(req.header("user-agent").is_some());
    }

    #[test]
    fn content_request_targets_message() {
        let req = client().get_message_content("325708").request().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/v2/bot/message/325708/content");
    }

    #[test]
    fn empty_token_is_a_config_error() {
        let err = Client::with_transport(ClientConfig::new(""), Arc::new(Unreachable)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn transport_failure_is_returned_verbatim() {
        let err = client().push("U1", [Message::text("hi")]).execute().await.unwrap_err();
        assert!(matches!(err, Error::Transport(TransportError::Other(ref msg)) if msg == "connection refused"));
    }
}
