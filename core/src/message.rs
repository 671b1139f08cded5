//! Message kinds accepted in push and reply envelopes.
//!
//! # Design
//! `Message` is a closed enum. Serde's internal tagging writes the `type`
//! discriminator before the variant's own fields, and the fields follow in
//! declaration order. The platform compares that layout byte-for-byte, so
//! field order inside each variant is part of the wire contract.
//!
//! Constructors never validate. An empty text is sent as `""` and the
//! platform answers with a structured error.

use serde::{Deserialize, Serialize};

/// A single message in a push or reply envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Message {
    Text {
        text: String,
    },
    Image {
        original_content_url: String,
        preview_image_url: String,
    },
    Video {
        original_content_url: String,
        preview_image_url: String,
    },
    /// `duration` is in milliseconds.
    Audio {
        original_content_url: String,
        duration: i64,
    },
    Location {
        title: String,
        address: String,
        latitude: f64,
        longitude: f64,
    },
    Sticker {
        package_id: String,
        sticker_id: String,
    },
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Message::Text { text: text.into() }
    }

    pub fn image(original_content_url: impl Into<String>, preview_image_url: impl Into<String>) -> Self {
        Message::Image {
            original_content_url: original_content_url.into(),
            preview_image_url: preview_image_url.into(),
        }
    }

    pub fn video(original_content_url: impl Into<String>, preview_image_url: impl Into<String>) -> Self {
        Message::Video {
            original_content_url: original_content_url.into(),
            preview_image_url: preview_image_url.into(),
        }
    }

    pub fn audio(original_content_url: impl Into<String>, duration: i64) -> Self {
        Message::Audio {
            original_content_url: original_content_url.into(),
            duration,
        }
    }

    pub fn location(title: impl Into<String>, address: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Message::Location {
            title: title.into(),
            address: address.into(),
            latitude,
            longitude,
        }
    }

    pub fn sticker(package_id: impl Into<String>, sticker_id: impl Into<String>) -> Self {
        Message::Sticker {
            package_id: package_id.into(),
            sticker_id: sticker_id.into(),
        }
    }

    /// The `type` discriminator written on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Text { .. } => "text",
            Message::Image { .. } => "image",
            Message::Video { .. } => "video",
            Message::Audio { .. } => "audio",
            Message::Location { .. } => "location",
            Message::Sticker { .. } => "sticker",
        }
    }
}
