//! Leonardo generation payload types.

use crate::models::JobStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct CreateGenerationRequest {
    pub prompt: String,
    #[serde(rename = "modelId")]
    pub model_id: String,
    pub width: u32,
    pub height: u32,
    pub num_images: u32,
}

/// Acceptance envelope. Depending on the model family the job is reported
/// under `sdGenerationJob` or `generationJob`.
#[derive(Debug, Deserialize)]
pub struct CreateGenerationResponse {
    #[serde(rename = "sdGenerationJob", default)]
    pub sd_generation_job: Option<GenerationJob>,
    #[serde(rename = "generationJob", default)]
    pub generation_job: Option<GenerationJob>,
}

#[derive(Debug, Deserialize)]
pub struct GenerationJob {
    #[serde(rename = "generationId", default)]
    pub generation_id: Option<String>,
}

impl GenerationJob {
    fn id(&self) -> Option<&str> {
        self.generation_id.as_deref().filter(|id| !id.is_empty())
    }
}

impl CreateGenerationResponse {
    /// `sdGenerationJob.generationId`, else `generationJob.generationId`.
    pub fn generation_id(&self) -> Option<&str> {
        self.sd_generation_job
            .as_ref()
            .and_then(GenerationJob::id)
            .or_else(|| self.generation_job.as_ref().and_then(GenerationJob::id))
    }
}

/// Single-generation lookup envelope.
#[derive(Debug, Deserialize)]
pub struct GenerationLookupResponse {
    #[serde(default)]
    pub generations_by_pk: Option<GenerationRecord>,
}

#[derive(Debug, Deserialize)]
pub struct GenerationRecord {
    #[serde(default)]
    pub generated_images: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
}

impl GenerationLookupResponse {
    /// First generated image wins; no images (or no record yet) is pending.
    pub fn status(self) -> JobStatus {
        self.generations_by_pk
            .and_then(|record| record.generated_images.into_iter().next())
            .map(|image| JobStatus::Complete { url: image.url })
            .unwrap_or(JobStatus::Pending)
    }
}
