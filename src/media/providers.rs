use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::core::WortkartenError;

/// Synthesizes pronunciation audio for a piece of text.
#[async_trait]
pub trait TextToSpeechProvider: Send + Sync {
    fn name(&self) -> &str {
        "text-to-speech"
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, WortkartenError>;
}

/// Finds an illustrative image for a search query.
#[async_trait]
pub trait ImageSearchProvider: Send + Sync {
    fn name(&self) -> &str {
        "image-search"
    }

    async fn search(&self, query: &str) -> Result<Vec<u8>, WortkartenError>;
}

/// Turns a record's context hint into search-friendly terms, typically by
/// translating it.
#[async_trait]
pub trait QueryTranslationProvider: Send + Sync {
    fn name(&self) -> &str {
        "query-translation"
    }

    async fn derive_search_terms(&self, context: &str) -> Result<String, WortkartenError>;
}

/// Speech synthesis against a JSON HTTP endpoint: POST `{text, voice}`,
/// response body is the audio blob.
pub struct HttpTextToSpeech {
    client: Client,
    endpoint: String,
    voice: String,
}

impl HttpTextToSpeech {
    pub fn new(endpoint: impl Into<String>, voice: impl Into<String>) -> Self {
        Self { client: Client::new(), endpoint: endpoint.into(), voice: voice.into() }
    }
}

#[async_trait]
impl TextToSpeechProvider for HttpTextToSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, WortkartenError> {
        let body = serde_json::json!({ "text": text, "voice": self.voice });
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| WortkartenError::provider(self.name(), e))?;

        if !response.status().is_success() {
            return Err(WortkartenError::provider(
                self.name(),
                format!("HTTP {} from {}", response.status(), self.endpoint),
            ));
        }

        let bytes =
            response.bytes().await.map_err(|e| WortkartenError::provider(self.name(), e))?;
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Deserialize)]
struct ImageResult {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ImageSearchResponse {
    #[serde(default)]
    results: Vec<ImageResult>,
}

/// Image search against a JSON HTTP API: GET `?query=...`, pick the first
/// result, download its bytes.
pub struct HttpImageSearch {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpImageSearch {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { client: Client::new(), endpoint: endpoint.into(), api_key: api_key.into() }
    }
}

#[async_trait]
impl ImageSearchProvider for HttpImageSearch {
    async fn search(&self, query: &str) -> Result<Vec<u8>, WortkartenError> {
        let response: ImageSearchResponse = self
            .client
            .get(&self.endpoint)
            .header("Authorization", &self.api_key)
            .query(&[("query", query), ("per_page", "1")])
            .send()
            .await
            .map_err(|e| WortkartenError::provider(self.name(), e))?
            .json()
            .await
            .map_err(|e| WortkartenError::provider(self.name(), e))?;

        let first = response.results.into_iter().next().ok_or_else(|| {
            WortkartenError::provider(self.name(), format!("no results for '{}'", query))
        })?;

        let image = self
            .client
            .get(&first.url)
            .send()
            .await
            .map_err(|e| WortkartenError::provider(self.name(), e))?;

        if !image.status().is_success() {
            return Err(WortkartenError::provider(
                self.name(),
                format!("HTTP {} fetching {}", image.status(), first.url),
            ));
        }

        let bytes = image.bytes().await.map_err(|e| WortkartenError::provider(self.name(), e))?;
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Deserialize)]
struct TranslationResponse {
    text: String,
}

/// Context-hint translation against a JSON HTTP endpoint: POST `{text,
/// target}`, response carries the translated search terms.
pub struct HttpQueryTranslation {
    client: Client,
    endpoint: String,
}

impl HttpQueryTranslation {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { client: Client::new(), endpoint: endpoint.into() }
    }
}

#[async_trait]
impl QueryTranslationProvider for HttpQueryTranslation {
    async fn derive_search_terms(&self, context: &str) -> Result<String, WortkartenError> {
        let body = serde_json::json!({ "text": context, "target": "en" });
        let response: TranslationResponse = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| WortkartenError::provider(self.name(), e))?
            .json()
            .await
            .map_err(|e| WortkartenError::provider(self.name(), e))?;

        Ok(response.text)
    }
}
