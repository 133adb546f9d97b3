//! Conversation
//!
//! Append-only turn history for one continuation invocation. Only the seed
//! turn may carry an image.

use std::path::Path;

use base64::Engine;
use stackdraft_llm::Message;

use crate::utils::error::{AppError, AppResult};

/// Image embedded in the seed turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub media_type: String,
    /// Base64 (standard alphabet) encoded bytes
    pub data: String,
}

impl ImageAttachment {
    pub fn from_bytes(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            media_type: media_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Media type for a supported image file extension
    pub fn media_type_for(path: &Path) -> Option<&'static str> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some("image/png"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            "gif" => Some("image/gif"),
            "webp" => Some("image/webp"),
            _ => None,
        }
    }

    /// Read and encode an image file
    pub async fn load(path: &Path) -> AppResult<Self> {
        let media_type = Self::media_type_for(path).ok_or_else(|| {
            AppError::validation(format!(
                "unsupported image type: {} (expected png, jpeg, gif or webp)",
                path.display()
            ))
        })?;
        let bytes = tokio::fs::read(path).await?;
        if bytes.is_empty() {
            return Err(AppError::validation(format!(
                "image file is empty: {}",
                path.display()
            )));
        }
        Ok(Self::from_bytes(media_type, &bytes))
    }
}

/// Opening instruction of a continuation invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInstruction {
    pub text: String,
    pub image: Option<ImageAttachment>,
}

impl SeedInstruction {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image(text: impl Into<String>, image: ImageAttachment) -> Self {
        Self {
            text: text.into(),
            image: Some(image),
        }
    }
}

/// One exchange step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    User {
        text: String,
        image: Option<ImageAttachment>,
    },
    Model {
        text: String,
    },
}

#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Start a conversation with the seed as its first user turn
    pub fn start(seed: SeedInstruction) -> Self {
        Self {
            turns: vec![Turn::User {
                text: seed.text,
                image: seed.image,
            }],
        }
    }

    pub fn push_model(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::Model { text: text.into() });
    }

    /// Append a text-only user turn
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::User {
            text: text.into(),
            image: None,
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn has_image(&self) -> bool {
        self.turns
            .iter()
            .any(|t| matches!(t, Turn::User { image: Some(_), .. }))
    }

    /// Provider messages, oldest first
    pub fn to_messages(&self) -> Vec<Message> {
        self.turns
            .iter()
            .map(|turn| match turn {
                Turn::User {
                    text,
                    image: Some(image),
                } => Message::user_with_image(
                    text.as_str(),
                    image.media_type.as_str(),
                    image.data.as_str(),
                ),
                Turn::User { text, image: None } => Message::user(text.as_str()),
                Turn::Model { text } => Message::assistant(text.as_str()),
            })
            .collect()
    }
}
