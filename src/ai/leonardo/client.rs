use crate::{Error, Result};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://cloud.leonardo.ai";

pub struct LeonardoHttpClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl LeonardoHttpClient {
    pub fn new_with_client(api_key: String, timeout: Duration, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {} to Leonardo", path);
        self.send(self.client.post(&url).json(request)).await
    }

    /// GET `{collection}/{id}`, with `id` always kept to a single path segment.
    pub async fn get_by_id<Resp: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Resp> {
        let url = self.item_url(collection, id)?;
        tracing::debug!("GET {} from Leonardo", url.path());
        self.send(self.client.get(url)).await
    }

    fn item_url(&self, collection: &str, id: &str) -> Result<Url> {
        // The segment setter silently drops these instead of encoding them.
        if id == "." || id == ".." {
            return Err(Error::InvalidInput(format!("Invalid generation id '{}'", id)));
        }

        let mut url = Url::parse(&format!("{}{}", self.base_url, collection))
            .map_err(|e| Error::Config(format!("Invalid Leonardo base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config("Leonardo base URL cannot carry a path".to_string()))?
            .push(id);
        Ok(url)
    }

    async fn send<Resp: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Resp> {
        let response = request
            .timeout(self.timeout)
            .header("accept", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Leonardo: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Leonardo API error (status {}): {}", status, error_text);
            return Err(Error::Upstream(format!(
                "Leonardo API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Leonardo response: {}\nBody: {}", e, body);
            Error::Upstream(format!("Failed to parse Leonardo response: {}", e))
        })
    }
}
