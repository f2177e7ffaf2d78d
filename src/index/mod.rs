// Semantic index module
// Chunk accumulation, batch embedding and exact nearest-neighbour retrieval

pub mod vector;


use tracing::{debug, info};

use crate::chunking::{Chunk, ChunkingConfig, chunk_words};
use crate::embeddings::Embedder;
use crate::{MandoError, Result};

pub use vector::{FlatL2Index, Neighbor};

/// A retrieved chunk and its squared Euclidean distance to the query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub text: String,
    pub position: usize,
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
enum IndexState {
    Empty,
    Built(FlatL2Index),
}

/// Owns one indexing session: the chunk sequence and the vector index built
/// over it.
///
/// Text is chunked as it is added; `build_index` embeds every chunk in one
/// batch and moves the indexer from empty to built. Queries borrow the
/// indexer immutably, so a built index can be shared for concurrent reads
/// while a rebuild requires exclusive access.
#[derive(Debug)]
pub struct SemanticIndexer<E> {
    embedder: E,
    chunking: ChunkingConfig,
    chunks: Vec<Chunk>,
    state: IndexState,
}

impl<E: Embedder> SemanticIndexer<E> {
    /// Create an empty indexer. Fails if the chunking window cannot advance.
    #[inline]
    pub fn new(embedder: E, chunking: ChunkingConfig) -> Result<Self> {
        chunking.validate()?;

        Ok(Self {
            embedder,
            chunking,
            chunks: Vec::new(),
            state: IndexState::Empty,
        })
    }

    /// Chunk `text` and append the windows to the chunk sequence.
    ///
    /// Adding text to a built index starts a new session: the previous chunks
    /// and vectors are discarded first. Returns the number of chunks added.
    #[inline]
    pub fn add_text(&mut self, text: &str) -> Result<usize> {
        if self.is_built() {
            info!(
                "Starting a new indexing session, discarding {} indexed chunks",
                self.chunks.len()
            );
            self.reset();
        }

        let windows = chunk_words(text, &self.chunking)?;
        let added = windows.len();
        let offset = self.chunks.len();

        self.chunks.extend(
            windows
                .into_iter()
                .enumerate()
                .map(|(i, text)| Chunk {
                    text,
                    position: offset + i,
                }),
        );

        debug!(
            "Added {} chunks ({} pending in total)",
            added,
            self.chunks.len()
        );
        Ok(added)
    }

    /// Embed every chunk in one batch and build the exact search index
    #[inline]
    pub fn build_index(&mut self) -> Result<()> {
        if self.chunks.is_empty() {
            return Err(MandoError::EmptyCorpus);
        }

        let texts = self
            .chunks
            .iter()
            .map(|chunk| chunk.text.clone())
            .collect::<Vec<_>>();

        info!("Embedding {} chunks", texts.len());
        let vectors = self
            .embedder
            .embed(&texts)
            .map_err(|e| MandoError::Embedding(format!("{:#}", e)))?;

        if vectors.len() != texts.len() {
            return Err(MandoError::Embedding(format!(
                "embedder returned {} vectors for {} chunks",
                vectors.len(),
                texts.len()
            )));
        }

        let index = FlatL2Index::build(&vectors)?;
        info!(
            "Built index over {} chunks ({} dimensions)",
            index.len(),
            index.dimension()
        );
        self.state = IndexState::Built(index);
        Ok(())
    }

    /// Return the `top_k` chunks nearest to `text`, nearest first.
    ///
    /// The query is embedded on every call. Fewer than `top_k` hits are
    /// returned when the index holds fewer chunks.
    #[inline]
    pub fn query(&self, text: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        let IndexState::Built(index) = &self.state else {
            return Err(MandoError::IndexNotBuilt);
        };

        let mut vectors = self
            .embedder
            .embed(&[text.to_string()])
            .map_err(|e| MandoError::Embedding(format!("{:#}", e)))?;

        let query_vector = match (vectors.pop(), vectors.is_empty()) {
            (Some(vector), true) => vector,
            _ => {
                return Err(MandoError::Embedding(
                    "embedder did not return exactly one query vector".to_string(),
                ));
            }
        };

        let hits = index
            .search(&query_vector, top_k)?
            .into_iter()
            .map(|neighbor| {
                let chunk = &self.chunks[neighbor.position];
                SearchHit {
                    text: chunk.text.clone(),
                    position: chunk.position,
                    distance: neighbor.distance,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            "Query returned {} hits (top_k {}, {} chunks indexed)",
            hits.len(),
            top_k,
            self.chunks.len()
        );
        Ok(hits)
    }

    /// Discard all chunks and vectors
    #[inline]
    pub fn reset(&mut self) {
        self.chunks.clear();
        self.state = IndexState::Empty;
    }

    #[inline]
    pub fn is_built(&self) -> bool {
        matches!(self.state, IndexState::Built(_))
    }

    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Vector dimension of the built index
    #[inline]
    pub fn dimension(&self) -> Option<usize> {
        match &self.state {
            IndexState::Built(index) => Some(index.dimension()),
            IndexState::Empty => None,
        }
    }

    #[inline]
    pub fn chunking(&self) -> &ChunkingConfig {
        &self.chunking
    }

    #[inline]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }
}
