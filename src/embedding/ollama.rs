//! Ollama embedding provider.
//!
//! Talks to the Ollama embeddings API (`POST /api/embeddings`), one request
//! per text — the endpoint does not accept batches.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::config::EmbeddingConfig;

#[derive(Debug)]
pub struct OllamaProvider {
    client: Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        anyhow::ensure!(!config.model.trim().is_empty(), "missing Ollama model name");
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build Ollama HTTP client")?;
        let endpoint = format!(
            "{}/api/embeddings",
            config.base_url.trim_end_matches('/')
        );
        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
        })
    }
}

impl EmbeddingProvider for OllamaProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: &self.model,
            prompt: text,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .context("Ollama embeddings request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            anyhow::bail!("Ollama embeddings request failed ({status}): {body}");
        }

        let parsed: EmbedResponse = response
            .json()
            .context("failed to parse Ollama embedding response")?;
        anyhow::ensure!(
            !parsed.embedding.is_empty(),
            "Ollama returned an empty embedding"
        );
        Ok(parsed.embedding)
    }
}
