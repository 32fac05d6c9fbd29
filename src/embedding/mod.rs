//! Text-to-vector embedding pipeline.
//!
//! Provides the [`EmbeddingProvider`] trait and HTTP-backed implementations
//! for Ollama and OpenAI-compatible endpoints. The provider is created via
//! [`create_provider`] from configuration; the store L2-normalizes whatever
//! the provider returns, so raw vectors are acceptable.

pub mod ollama;
pub mod openai;

use anyhow::Result;

/// Trait for embedding text into vectors.
///
/// All vectors from one provider must share a dimension; the store fixes its
/// dimension from the first indexed batch. Methods are synchronous — callers
/// in async contexts should use their runtime's blocking escape hatch.
pub trait EmbeddingProvider: std::fmt::Debug + Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of text strings. Implementations may override for
    /// batched inference.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Create an embedding provider from config.
///
/// Supported providers: `"ollama"` (per-text requests, the default) and
/// `"openai"` (batched, OpenAI-compatible endpoints).
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "ollama" => {
            let provider = ollama::OllamaProvider::new(config)?;
            Ok(Box::new(provider))
        }
        "openai" => {
            let provider = openai::OpenAiProvider::new(config)?;
            Ok(Box::new(provider))
        }
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: ollama, openai"),
    }
}

/// L2-normalize a vector. A near-zero norm maps to the zero vector instead
/// of dividing by zero.
pub fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        v.iter().map(|x| x / norm).collect()
    } else {
        vec![0.0; v.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_normalize() {
        let v = vec![3.0, 4.0];
        let normalized = l2_normalize(&v);
        assert!((normalized[0] - 0.6).abs() < 1e-6);
        assert!((normalized[1] - 0.8).abs() < 1e-6);
        let norm: f32 = normalized.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        let v = vec![0.0, 0.0, 0.0];
        let normalized = l2_normalize(&v);
        assert_eq!(normalized, vec![0.0, 0.0, 0.0]);
        assert!(normalized.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = crate::config::EmbeddingConfig {
            provider: "mystery".into(),
            ..crate::config::EmbeddingConfig::default()
        };
        let result = create_provider(&config);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unknown embedding provider"));
    }
}
