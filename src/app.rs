//! Request routing between the text and image providers.

use crate::ai::{ChatService, GeminiChatClient, ImageJobService, LeonardoImageClient};
use crate::intent::{Intent, IntentClassifier};
use crate::models::{Config, ImageJobAccepted, JobStatus};
use crate::poller::JobStatusSource;
use crate::prompts::{PromptEnricher, TemplateEnricher};
use crate::{Error, Result};
use async_trait::async_trait;
use tracing::{info, warn};

/// Acknowledgement returned while an image is being generated.
pub const IMAGE_ACKNOWLEDGEMENT: &str = "Designing your ceramic pattern, one moment please...";

/// Stateless per-request translator between the HTTP contract and the providers.
pub struct App {
    chat: Box<dyn ChatService>,
    images: Box<dyn ImageJobService>,
    enricher: Box<dyn PromptEnricher>,
    classifier: IntentClassifier,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub chat: Box<dyn ChatService>,
    pub images: Box<dyn ImageJobService>,
    pub enricher: Box<dyn PromptEnricher>,
    pub classifier: IntentClassifier,
}

impl AppServices {
    /// Bundle with the default ceramic enricher and keyword classifier.
    pub fn new(chat: Box<dyn ChatService>, images: Box<dyn ImageJobService>) -> Self {
        Self {
            chat,
            images,
            enricher: Box::new(TemplateEnricher::ceramic()),
            classifier: IntentClassifier::default(),
        }
    }
}

impl App {
    pub fn with_services(services: AppServices) -> Self {
        Self {
            chat: services.chat,
            images: services.images,
            enricher: services.enricher,
            classifier: services.classifier,
        }
    }

    /// Build the provider clients described by `config`.
    pub fn from_config(config: &Config) -> Self {
        // Reuse one HTTP connection pool across provider clients.
        let http_client = reqwest::Client::new();

        let mut chat = GeminiChatClient::new_with_client(
            config.gemini_api_key.clone(),
            config.chat_model.clone(),
            http_client.clone(),
        )
        .with_timeout(config.upstream_timeout);
        if let Some(base_url) = &config.gemini_base_url {
            chat = chat.with_base_url(base_url.clone());
        }
        info!("Chat provider: Gemini (model: {})", config.chat_model);

        let mut images =
            LeonardoImageClient::new_with_client(config.leonardo_api_key.clone(), http_client)
                .with_model(config.image_model_id.clone())
                .with_size(config.image_width, config.image_height)
                .with_timeout(config.upstream_timeout);
        if let Some(base_url) = &config.leonardo_base_url {
            images = images.with_base_url(base_url.clone());
        }
        info!(
            "Image provider: Leonardo (model: {}, {}x{})",
            config.image_model_id, config.image_width, config.image_height
        );

        Self::with_services(AppServices::new(Box::new(chat), Box::new(images)))
    }

    /// Whether `message` asks for an image or for an answer.
    pub fn classify(&self, message: &str) -> Intent {
        self.classifier.classify(message)
    }

    /// Answer a question through the text provider.
    pub async fn converse(&self, prompt: &str) -> Result<String> {
        require_non_blank(prompt, "prompt")?;
        self.chat.converse(prompt).await.map_err(|e| {
            warn!("Chat request failed: {}", e);
            e
        })
    }

    /// Enrich `prompt` and submit it to the image provider.
    pub async fn start_image_job(&self, prompt: &str) -> Result<ImageJobAccepted> {
        require_non_blank(prompt, "prompt")?;

        let enriched = self.enricher.enrich(prompt);
        let generation_id = self.images.start_generation(&enriched).await.map_err(|e| {
            warn!("Image generation request failed: {}", e);
            e
        })?;

        Ok(ImageJobAccepted {
            generation_id,
            message: IMAGE_ACKNOWLEDGEMENT.to_string(),
        })
    }

    /// Read-through lookup of a generation's status.
    pub async fn get_job_status(&self, generation_id: &str) -> Result<JobStatus> {
        require_non_blank(generation_id, "generation id")?;
        self.images.generation_status(generation_id).await
    }
}

#[async_trait]
impl JobStatusSource for App {
    async fn job_status(&self, generation_id: &str) -> Result<JobStatus> {
        self.get_job_status(generation_id).await
    }
}

fn require_non_blank(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}
