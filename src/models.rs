//! Data models and structures
//!
//! Defines the HTTP contract shapes shared by the server and the chat client,
//! plus process-wide configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body of `POST /chat` and `POST /generate-image`.
///
/// `prompt` is optional on the wire so a missing field is reported as invalid
/// input rather than a JSON decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
}

/// Returned once the image provider has accepted a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageJobAccepted {
    pub generation_id: String,
    pub message: String,
}

/// Status of a generation as currently reported by the image provider.
///
/// Serializes as `{"status":"PENDING"}` or `{"status":"COMPLETE","url":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum JobStatus {
    Pending,
    Complete { url: String },
}

/// A generation job observed through the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    pub id: String,
    pub status: JobStatus,
}

impl ImageJob {
    pub fn result_url(&self) -> Option<&str> {
        match &self.status {
            JobStatus::Complete { url } => Some(url),
            JobStatus::Pending => None,
        }
    }
}

/// Error envelope returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// A chat line as rendered by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub text: String,
    #[serde(default)]
    pub is_image: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            is_image: false,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
            is_image: false,
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: url.into(),
            is_image: true,
        }
    }
}

// Configuration
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CHAT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_IMAGE_MODEL_ID: &str = "7b592283-e8a7-4c5a-9ba6-d18c31f258b9";
pub const DEFAULT_IMAGE_SIZE: u32 = 512;
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub leonardo_api_key: String,
    pub port: u16,
    pub chat_model: String,
    pub image_model_id: String,
    pub image_width: u32,
    pub image_height: u32,
    /// Per-request limit on each provider call.
    pub upstream_timeout: Duration,
    pub gemini_base_url: Option<String>,
    pub leonardo_base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| {
            non_blank(key).ok_or_else(|| crate::Error::Config(format!("{} not set", key)))
        };

        let timeout_secs: u64 = parse_or(
            &lookup,
            "UPSTREAM_TIMEOUT_SECS",
            DEFAULT_UPSTREAM_TIMEOUT.as_secs(),
        )?;
        if timeout_secs == 0 {
            return Err(crate::Error::Config(
                "UPSTREAM_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            gemini_api_key: required("GEMINI_API_KEY")?,
            leonardo_api_key: required("LEONARDO_API_KEY")?,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            chat_model: non_blank("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            image_model_id: non_blank("LEONARDO_MODEL_ID")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL_ID.to_string()),
            image_width: parse_or(&lookup, "IMAGE_WIDTH", DEFAULT_IMAGE_SIZE)?,
            image_height: parse_or(&lookup, "IMAGE_HEIGHT", DEFAULT_IMAGE_SIZE)?,
            upstream_timeout: Duration::from_secs(timeout_secs),
            gemini_base_url: non_blank("GEMINI_BASE_URL"),
            leonardo_base_url: non_blank("LEONARDO_BASE_URL"),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> crate::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| crate::Error::Config(format!("Invalid {} '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}
