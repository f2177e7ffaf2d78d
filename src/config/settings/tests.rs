use super::*;
use tempfile::TempDir;

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.embedder, EmbedderKind::Ollama);
    assert_eq!(config.ollama.protocol, "http");
    assert_eq!(config.ollama.host, "localhost");
    assert_eq!(config.ollama.port, 11434);
    assert_eq!(config.ollama.model, "nomic-embed-text:latest");
    assert_eq!(config.ollama.batch_size, 16);
    assert_eq!(config.chunking.chunk_size, 200);
    assert_eq!(config.chunking.overlap, 50);
    assert_eq!(config.retrieval.top_k, 5);
    assert_eq!(config.retrieval.strategy, AnswerStrategy::Concatenate);
    assert_eq!(config.crawler.timeout_seconds, 5);
    assert!(config.validate().is_ok());
}

#[test]
fn config_validation() {
    let config = Config::default();

    let mut invalid_config = config.clone();
    invalid_config.ollama.protocol = "ftp".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.ollama.port = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.model = String::new();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.batch_size = 1001;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.hashing.dimension = 8;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidEmbeddingDimension(8))
    ));

    let mut invalid_config = config.clone();
    invalid_config.chunking.overlap = invalid_config.chunking.chunk_size;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::OverlapTooLarge(200, 200))
    ));

    let mut invalid_config = config.clone();
    invalid_config.retrieval.top_k = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidTopK(0))
    ));

    let mut invalid_config = config;
    invalid_config.crawler.timeout_seconds = 0;
    assert!(invalid_config.validate().is_err());
}

#[test]
fn ollama_url_generation() {
    let config = Config::default();
    let url = config
        .ollama_url()
        .expect("should generate ollama_url successfully");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    let parsed_config: Config = toml::from_str(&toml_str).expect("should parse toml correctly");
    assert_eq!(config, parsed_config);
}

#[test]
fn partial_config_uses_defaults() {
    let partial_toml = r#"
        embedder = "hashing"

        [chunking]
        chunk_size = 120

        [retrieval]
        strategy = "per_chunk"
    "#;

    let config: Config = toml::from_str(partial_toml).expect("partial config parses");
    assert_eq!(config.embedder, EmbedderKind::Hashing);
    assert_eq!(config.chunking.chunk_size, 120);
    assert_eq!(config.chunking.overlap, 50);
    assert_eq!(config.retrieval.strategy, AnswerStrategy::PerChunk);
    assert_eq!(config.retrieval.top_k, DEFAULT_TOP_K);
    assert_eq!(config.ollama, OllamaConfig::default());
}

#[test]
fn load_missing_file_gives_defaults() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config = Config::load(temp_dir.path()).expect("missing file is not an error");

    assert_eq!(config.base_dir, temp_dir.path());
    assert_eq!(config.chunking, ChunkingConfig::default());
}

#[test]
fn save_and_reload() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config_dir = temp_dir.path().join("nested").join("mando");

    let mut config = Config {
        base_dir: config_dir.clone(),
        ..Config::default()
    };
    config.embedder = EmbedderKind::Hashing;
    config.retrieval.top_k = 8;
    config.save().expect("config saves");

    assert!(config_dir.join(CONFIG_FILE_NAME).exists());

    let loaded = Config::load(&config_dir).expect("config reloads");
    assert_eq!(loaded, config);
}

#[test]
fn load_rejects_invalid_file() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[chunking]\nchunk_size = 10\noverlap = 10\n",
    )
    .expect("write config");

    let error = Config::load(temp_dir.path()).expect_err("overlap == size is rejected");
    assert!(format!("{:#}", error).contains("must be smaller than chunk size"));
}

#[test]
fn save_refuses_invalid_config() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let mut config = Config {
        base_dir: temp_dir.path().to_path_buf(),
        ..Config::default()
    };
    config.retrieval.top_k = 1000;

    assert!(config.save().is_err());
    assert!(!temp_dir.path().join(CONFIG_FILE_NAME).exists());
}
