// Embeddings module
// Embedding backends behind a single capability trait

pub mod hashing;
pub mod ollama;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{Config, EmbedderKind};

pub use hashing::HashingEmbedder;
pub use ollama::OllamaClient;

/// Turns texts into fixed-dimension vectors.
///
/// Implementations must return exactly one vector per input, in input order,
/// and the same vector for the same text on every call.
pub trait Embedder: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    #[inline]
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        (**self).embed(texts)
    }
}

impl<E: Embedder + ?Sized> Embedder for std::sync::Arc<E> {
    #[inline]
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        (**self).embed(texts)
    }
}

/// Construct the embedding backend named in the configuration.
///
/// The Ollama backend is health-checked first so a missing server or model
/// fails before any document is embedded.
#[inline]
pub fn embedder_from_config(config: &Config) -> Result<Box<dyn Embedder>> {
    match config.embedder {
        EmbedderKind::Ollama => {
            info!(
                "Using Ollama embedder with model {}",
                config.ollama.model
            );
            let client = OllamaClient::new(&config.ollama)
                .context("Failed to initialize Ollama client")?
                .with_progress(true);
            client
                .health_check()
                .context("Ollama is not ready for embedding")?;
            Ok(Box::new(client))
        }
        EmbedderKind::Hashing => {
            info!(
                "Using hashing embedder with {} dimensions",
                config.hashing.dimension
            );
            Ok(Box::new(HashingEmbedder::new(config.hashing.dimension)))
        }
    }
}
