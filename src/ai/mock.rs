use super::{ChatService, ImageJobService};
use crate::models::JobStatus;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Clones share recorded prompts, responses and call counts.
#[derive(Clone)]
pub struct MockChatClient {
    responses: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    failure: Option<String>,
    call_count: Arc<Mutex<usize>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            failure: None,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Every call fails with an upstream error carrying `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatService for MockChatClient {
    async fn converse(&self, prompt: &str) -> Result<String> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(message) = &self.failure {
            return Err(Error::Upstream(message.clone()));
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(format!("Answer to: {}", prompt))
        } else {
            let index = (*count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}

/// Image provider double whose job state can be changed mid-test.
#[derive(Clone)]
pub struct MockImageJobClient {
    generation_id: Option<String>,
    images: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    failure: Option<String>,
    call_count: Arc<Mutex<usize>>,
}

impl MockImageJobClient {
    pub fn new() -> Self {
        Self {
            generation_id: None,
            images: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            failure: None,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Without an id, `start_generation` behaves like a provider response
    /// missing both id fields.
    pub fn with_generation_id(mut self, id: &str) -> Self {
        self.generation_id = Some(id.to_string());
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn set_images(&self, urls: &[&str]) {
        *self.images.lock().unwrap() = urls.iter().map(|u| u.to_string()).collect();
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    fn record_call(&self) {
        *self.call_count.lock().unwrap() += 1;
    }
}

impl Default for MockImageJobClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageJobService for MockImageJobClient {
    async fn start_generation(&self, prompt: &str) -> Result<String> {
        self.record_call();
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(message) = &self.failure {
            return Err(Error::Upstream(message.clone()));
        }

        self.generation_id
            .clone()
            .ok_or_else(|| Error::Upstream("No generation id in mock response".to_string()))
    }

    async fn generation_status(&self, _generation_id: &str) -> Result<JobStatus> {
        self.record_call();

        if let Some(message) = &self.failure {
            return Err(Error::Upstream(message.clone()));
        }

        Ok(self
            .images
            .lock()
            .unwrap()
            .first()
            .map(|url| JobStatus::Complete { url: url.clone() })
            .unwrap_or(JobStatus::Pending))
    }
}
