use thiserror::Error;

pub type Result<T> = std::result::Result<T, MandoError>;

#[derive(Error, Debug)]
pub enum MandoError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cannot build an index: no chunks have been added")]
    EmptyCorpus,

    #[error("Index has not been built; call build_index first")]
    IndexNotBuilt,

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Scoring error: {0}")]
    Scoring(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<config::ConfigError> for MandoError {
    #[inline]
    fn from(error: config::ConfigError) -> Self {
        Self::Configuration(error.to_string())
    }
}

pub mod answer;
pub mod chunking;
pub mod commands;
pub mod config;
pub mod crawler;
pub mod embeddings;
pub mod index;
pub mod ingest;
