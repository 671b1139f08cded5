//! Request envelopes for the push and reply endpoints.
//!
//! # Design
//! An envelope is a target selector plus the caller's messages. The selector
//! is written first (`to` or `replyToken`), then `messages` in the order the
//! caller supplied them. The body ends with a newline, matching a streaming
//! JSON encoder that emits one value per line.

use serde::Serialize;

use crate::message::Message;

/// JSON body of a push or reply request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Push {
        to: String,
        messages: Vec<Message>,
    },
    Reply {
        #[serde(rename = "replyToken")]
        reply_token: String,
        messages: Vec<Message>,
    },
}

impl Envelope {
    pub fn push(to: impl Into<String>, messages: impl IntoIterator<Item = Message>) -> Self {
        Envelope::Push {
            to: to.into(),
            messages: messages.into_iter().collect(),
        }
    }

    pub fn reply(reply_token: impl Into<String>, messages: impl IntoIterator<Item = Message>) -> Self {
        Envelope::Reply {
            reply_token: reply_token.into(),
            messages: messages.into_iter().collect(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        match self {
            Envelope::Push { messages, .. } | Envelope::Reply { messages, .. } => messages,
        }
    }

    /// Encode the envelope as the HTTP request body, newline-terminated.
    pub fn to_body(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut body = serde_json::to_vec(self)?;
        body.push(b'\n');
        Ok(body)
    }
}
