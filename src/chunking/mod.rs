
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConfigError;

pub const DEFAULT_CHUNK_SIZE: usize = 200;
pub const DEFAULT_OVERLAP: usize = 50;

/// A contiguous word window of the corpus.
///
/// `position` is the chunk's ordinal in the indexer's chunk sequence and is
/// the only key used to relate a chunk to its embedding row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Words of the window joined by single spaces
    pub text: String,
    /// Ordinal position within the chunk sequence
    pub position: usize,
}

/// Word-window chunking parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum number of words per chunk
    pub chunk_size: usize,
    /// Number of words shared by consecutive chunks
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    /// Build a config, rejecting windows that could never advance
    #[inline]
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ConfigError> {
        let config = Self {
            chunk_size,
            overlap,
        };
        config.validate()?;
        Ok(config)
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(self.chunk_size));
        }

        if self.overlap >= self.chunk_size {
            return Err(ConfigError::OverlapTooLarge(self.overlap, self.chunk_size));
        }

        Ok(())
    }

    /// Distance in words between the starts of consecutive windows
    #[inline]
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

/// Split text into overlapping word windows.
///
/// Words are whitespace-delimited. Each window holds at most `chunk_size`
/// words and starts `chunk_size - overlap` words after the previous one.
/// Only the final window may be shorter than `chunk_size`. Empty or
/// whitespace-only text yields no windows.
#[inline]
pub fn chunk_words(text: &str, config: &ChunkingConfig) -> Result<Vec<String>, ConfigError> {
    config.validate()?;

    let words = text.split_whitespace().collect::<Vec<_>>();
    let stride = config.stride();

    let mut windows = Vec::with_capacity(expected_chunk_count(words.len(), config));
    let mut start = 0;
    while start < words.len() {
        let end = (start + config.chunk_size).min(words.len());
        windows.push(words[start..end].join(" "));
        // A window that reaches the last word already covers every later start
        if end == words.len() {
            break;
        }
        start += stride;
    }

    debug!(
        "Split {} words into {} chunks (size {}, overlap {})",
        words.len(),
        windows.len(),
        config.chunk_size,
        config.overlap
    );

    Ok(windows)
}

/// Number of windows `chunk_words` emits for `word_count` words
#[inline]
pub fn expected_chunk_count(word_count: usize, config: &ChunkingConfig) -> usize {
    if word_count == 0 {
        return 0;
    }
    word_count
        .saturating_sub(config.overlap)
        .div_ceil(config.stride())
        .max(1)
}
