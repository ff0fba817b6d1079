//! HTTP client for the orchestrator's own API, and a chat session that
//! routes messages and drives image polling the way the web client does.

use crate::intent::{Intent, IntentClassifier};
use crate::models::{ChatRequest, ChatResponse, ErrorBody, ImageJobAccepted, JobStatus, Message};
use crate::poller::{JobPoller, JobStatusSource};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Shown when the server cannot be reached or reports a failure.
pub const CONNECTION_APOLOGY: &str = "Sorry, something went wrong while contacting the server.";

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self::new_with_client(base_url, client))
    }

    pub fn new_with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn chat(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/chat", self.base_url))
            .json(&ChatRequest::new(prompt))
            .send()
            .await?;
        let body: ChatResponse = Self::decode(response).await?;
        Ok(body.text)
    }

    pub async fn generate_image(&self, prompt: &str) -> Result<ImageJobAccepted> {
        let response = self
            .client
            .post(format!("{}/generate-image", self.base_url))
            .json(&ChatRequest::new(prompt))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn image_status(&self, generation_id: &str) -> Result<JobStatus> {
        let response = self.client.get(self.status_url(generation_id)?).send().await?;
        Self::decode(response).await
    }

    fn status_url(&self, generation_id: &str) -> Result<Url> {
        if generation_id == "." || generation_id == ".." {
            return Err(Error::InvalidInput(format!(
                "Invalid generation id '{}'",
                generation_id
            )));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid server URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Invalid server URL '{}'", self.base_url)))?
            .pop_if_empty()
            .push("get-image")
            .push(generation_id);
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody {
                error,
                details: Some(details),
            }) => format!("{} ({})", error, details),
            Ok(ErrorBody { error, .. }) => error,
            Err(_) => body,
        };

        if status.is_client_error() {
            Err(Error::InvalidInput(message))
        } else {
            Err(Error::Upstream(format!(
                "Server error (status {}): {}",
                status, message
            )))
        }
    }
}

#[async_trait]
impl JobStatusSource for ApiClient {
    async fn job_status(&self, generation_id: &str) -> Result<JobStatus> {
        self.image_status(generation_id).await
    }
}

/// One user's conversation with the orchestrator. Holds no history.
pub struct ChatSession {
    api: ApiClient,
    classifier: IntentClassifier,
    poller: JobPoller,
}

impl ChatSession {
    pub fn new(api: ApiClient, classifier: IntentClassifier, poller: JobPoller) -> Self {
        Self {
            api,
            classifier,
            poller,
        }
    }

    /// Send one message and collect the bot replies.
    ///
    /// Image requests yield the acknowledgement followed by the image once
    /// polling completes. An empty message yields no replies.
    pub async fn send(&self, message: &str, cancel: &CancellationToken) -> Vec<Message> {
        if message.trim().is_empty() {
            return Vec::new();
        }

        match self.classifier.classify(message) {
            Intent::Answer => match self.api.chat(message).await {
                Ok(text) => vec![Message::bot(text)],
                Err(e) => {
                    error!("Chat request failed: {}", e);
                    vec![Message::bot(CONNECTION_APOLOGY)]
                }
            },
            Intent::GenerateImage => self.send_image_request(message, cancel).await,
        }
    }

    async fn send_image_request(&self, message: &str, cancel: &CancellationToken) -> Vec<Message> {
        let accepted = match self.api.generate_image(message).await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Image request failed: {}", e);
                return vec![Message::bot(CONNECTION_APOLOGY)];
            }
        };

        let mut replies = vec![Message::bot(accepted.message)];
        match self
            .poller
            .wait_for_completion(&self.api, &accepted.generation_id, cancel)
            .await
        {
            Ok(job) => {
                if let Some(url) = job.result_url() {
                    replies.push(Message::image(url));
                }
            }
            Err(Error::Cancelled) => {}
            Err(e) => {
                warn!("Image {} not delivered: {}", accepted.generation_id, e);
                replies.push(Message::bot(CONNECTION_APOLOGY));
            }
        }
        replies
    }
}
