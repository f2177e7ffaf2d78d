// Configuration management module
// TOML settings under the user config directory plus terminal display helpers

pub mod settings;


use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub use settings::{
    Config, ConfigError, EmbedderKind, HashingConfig, OllamaConfig, RetrievalConfig,
};

/// Print the resolved configuration for `config_dir`
#[inline]
pub fn show_config(config_dir: &Path) -> Result<()> {
    let config = Config::load(config_dir).context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();
    eprint!("{}", render_config(&config));

    eprintln!();
    let config_path = config.config_file_path();
    if config_path.exists() {
        eprintln!("Config file: {}", style(config_path.display()).dim());
    } else {
        eprintln!(
            "Config file: {} {}",
            style(config_path.display()).dim(),
            style("(not created, using defaults)").yellow()
        );
    }

    Ok(())
}

/// Write a default configuration file unless one already exists
#[inline]
pub fn init_config(config_dir: &Path) -> Result<()> {
    let config = Config {
        base_dir: config_dir.to_path_buf(),
        ..Config::default()
    };
    let config_path = config.config_file_path();

    if config_path.exists() {
        eprintln!(
            "{} {}",
            style("Configuration already exists:").yellow(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    config.save().context("Failed to save configuration")?;
    eprintln!("{}", style("✓ Configuration saved successfully!").green());
    eprintln!(
        "Configuration saved to: {}",
        style(config_path.display()).cyan()
    );

    Ok(())
}

fn render_config(config: &Config) -> String {
    let ollama_url = config
        .ollama_url()
        .map_or_else(|e| format!("invalid ({})", e), |url| url.to_string());
    let embedder = match config.embedder {
        EmbedderKind::Ollama => "ollama",
        EmbedderKind::Hashing => "hashing",
    };

    format!(
        "  Embedder: {embedder}
Ollama Settings:
  URL: {ollama_url}
  Embedding Model: {model}
  Generation Model: {generation_model}
  Batch Size: {batch_size}
  Timeout: {ollama_timeout}s
Hashing Embedder:
  Dimension: {dimension}
Chunking:
  Chunk Size: {chunk_size} words
  Overlap: {overlap} words
Retrieval:
  Top K: {top_k}
  Strategy: {strategy}
  Generate: {generate}
Crawler:
  Timeout: {crawler_timeout}s
  Max Retries: {max_retries}
  User Agent: {user_agent}
",
        model = config.ollama.model,
        generation_model = config.ollama.generation_model,
        batch_size = config.ollama.batch_size,
        ollama_timeout = config.ollama.timeout_seconds,
        dimension = config.hashing.dimension,
        chunk_size = config.chunking.chunk_size,
        overlap = config.chunking.overlap,
        top_k = config.retrieval.top_k,
        strategy = config.retrieval.strategy,
        generate = config.retrieval.generate,
        crawler_timeout = config.crawler.timeout_seconds,
        max_retries = config.crawler.max_retries,
        user_agent = config.crawler.user_agent,
    )
}
