use super::client::LeonardoHttpClient;
use super::types::{CreateGenerationRequest, CreateGenerationResponse, GenerationLookupResponse};
use crate::ai::ImageJobService;
use crate::models::{
    JobStatus, DEFAULT_IMAGE_MODEL_ID, DEFAULT_IMAGE_SIZE, DEFAULT_UPSTREAM_TIMEOUT,
};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

const GENERATIONS_PATH: &str = "/api/rest/v1/generations";

pub struct LeonardoImageClient {
    http: LeonardoHttpClient,
    model_id: String,
    width: u32,
    height: u32,
}

impl LeonardoImageClient {
    pub fn new(api_key: String) -> Self {
        Self::new_with_client(api_key, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, client: reqwest::Client) -> Self {
        Self {
            http: LeonardoHttpClient::new_with_client(api_key, DEFAULT_UPSTREAM_TIMEOUT, client),
            model_id: DEFAULT_IMAGE_MODEL_ID.to_string(),
            width: DEFAULT_IMAGE_SIZE,
            height: DEFAULT_IMAGE_SIZE,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    pub fn with_model(mut self, model_id: String) -> Self {
        self.model_id = model_id;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

#[async_trait]
impl ImageJobService for LeonardoImageClient {
    async fn start_generation(&self, prompt: &str) -> Result<String> {
        let request = CreateGenerationRequest {
            prompt: prompt.to_string(),
            model_id: self.model_id.clone(),
            width: self.width,
            height: self.height,
            num_images: 1,
        };

        let response: CreateGenerationResponse = self.http.post(GENERATIONS_PATH, &request).await?;

        let generation_id = response.generation_id().ok_or_else(|| {
            tracing::error!("Leonardo accepted the request but returned no generation id");
            Error::Upstream("No generation id in Leonardo response".to_string())
        })?;

        tracing::info!("Leonardo generation started: {}", generation_id);
        Ok(generation_id.to_string())
    }

    async fn generation_status(&self, generation_id: &str) -> Result<JobStatus> {
        let response: GenerationLookupResponse =
            self.http.get_by_id(GENERATIONS_PATH, generation_id).await?;
        Ok(response.status())
    }
}
