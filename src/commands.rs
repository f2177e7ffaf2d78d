
use anyhow::{Context, anyhow};
use console::style;
use dialoguer::Input;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::answer::{
    AnswerSelection, AnswerStrategy, Generator, LexicalScorer, Scorer, concatenate_context,
    generate_answer, score_context, select_best_answer_parallel,
};
use crate::config::{Config, ConfigError, RetrievalConfig};
use crate::crawler::crawl_url;
use crate::embeddings::{Embedder, OllamaClient, embedder_from_config};
use crate::index::{SearchHit, SemanticIndexer};
use crate::ingest::Corpus;
use crate::{MandoError, Result};

/// Documents and pages to index for one session
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub files: Vec<PathBuf>,
    pub url: Option<String>,
}

impl Sources {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.url.as_deref().is_none_or(|url| url.trim().is_empty())
    }
}

/// Command-line overrides for the configured retrieval settings
#[derive(Debug, Clone, Copy, Default)]
pub struct AskOptions {
    pub top_k: Option<usize>,
    pub strategy: Option<AnswerStrategy>,
    pub generate: bool,
}

impl AskOptions {
    /// Apply the overrides on top of `base` and validate the result
    #[inline]
    pub fn resolve(&self, base: RetrievalConfig) -> Result<RetrievalConfig> {
        let resolved = RetrievalConfig {
            top_k: self.top_k.unwrap_or(base.top_k),
            strategy: self.strategy.unwrap_or(base.strategy),
            generate: self.generate || base.generate,
        };
        resolved.validate()?;
        Ok(resolved)
    }
}

/// Everything produced for one question
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerReport {
    pub hits: Vec<SearchHit>,
    pub context: String,
    pub extractive: AnswerSelection,
    pub generative: Option<String>,
}

/// Extract every file and crawl the URL into one corpus
#[inline]
pub fn ingest_sources(sources: &Sources, config: &Config) -> Result<Corpus> {
    if sources.is_empty() {
        return Err(MandoError::Configuration(
            "Please provide at least one file or a URL".to_string(),
        ));
    }

    let mut corpus = Corpus::new();
    for path in &sources.files {
        eprintln!("• Processing {}", style(path.display()).cyan());
        corpus.add_path(path);
    }

    if let Some(url) = sources.url.as_deref().filter(|url| !url.trim().is_empty()) {
        eprintln!("• Crawling {}", style(url).cyan());
        corpus.add_document(&crawl_url(url, &config.crawler));
    }

    info!("Ingested {} documents", corpus.document_count());
    Ok(corpus)
}

/// Chunk, embed and index a corpus
#[inline]
pub fn build_indexer<E: Embedder>(
    embedder: E,
    config: &Config,
    corpus: &Corpus,
) -> Result<SemanticIndexer<E>> {
    let mut indexer = SemanticIndexer::new(embedder, config.chunking)?;
    let chunks = indexer.add_text(corpus.text())?;
    let chunking = indexer.chunking();
    info!(
        "Split corpus into {} chunks of up to {} words ({} overlapping)",
        chunks, chunking.chunk_size, chunking.overlap
    );

    indexer.build_index()?;
    Ok(indexer)
}

/// Retrieve context for `question` and produce the extractive (and optionally
/// generative) answer
#[inline]
pub fn answer_question<E, S>(
    indexer: &SemanticIndexer<E>,
    scorer: &S,
    generator: Option<&dyn Generator>,
    question: &str,
    retrieval: &RetrievalConfig,
) -> Result<AnswerReport>
where
    E: Embedder,
    S: Scorer + ?Sized,
{
    let question = question.trim();
    if question.is_empty() {
        return Err(MandoError::Other(anyhow!("Please enter a question")));
    }

    let hits = indexer.query(question, retrieval.top_k)?;
    let context = concatenate_context(&hits);

    let extractive = match retrieval.strategy {
        AnswerStrategy::Concatenate => match score_context(scorer, question, &context) {
            Ok(candidate) => AnswerSelection::Answer(candidate),
            Err(e) => {
                warn!("Extractive answer failed: {}", e);
                AnswerSelection::NoAnswer
            }
        },
        AnswerStrategy::PerChunk => {
            let texts = hits.iter().map(|hit| hit.text.as_str()).collect::<Vec<_>>();
            select_best_answer_parallel(scorer, question, &texts)
        }
    };

    let generative = generator.map(|generator| {
        generate_answer(generator, question, &context).unwrap_or_else(|e| {
            warn!("Generative answer failed: {}", e);
            format!("Error during generative answer: {}", e)
        })
    });

    Ok(AnswerReport {
        hits,
        context,
        extractive,
        generative,
    })
}

/// Print a report to stdout
#[inline]
pub fn print_report(report: &AnswerReport) {
    println!("{}", style("Retrieved Context").bold().yellow());
    for hit in &report.hits {
        println!(
            "{} {}",
            style(format!("[chunk {} · distance {:.4}]", hit.position, hit.distance)).dim(),
            hit.text
        );
    }
    println!();

    println!("{}", style("Extractive Answer").bold().yellow());
    match &report.extractive {
        AnswerSelection::Answer(candidate) => println!(
            "{} {}",
            style(&candidate.answer).green(),
            style(format!("(confidence {:.2})", candidate.confidence)).dim()
        ),
        AnswerSelection::NoAnswer => println!("{}", style(&report.extractive).red()),
    }

    if let Some(answer) = &report.generative {
        println!();
        println!("{}", style("Generative Answer").bold().yellow());
        println!("{}", answer);
    }
}

/// Index the sources once, then answer a single question
#[inline]
pub fn ask(config_dir: &Path, question: &str, sources: &Sources, options: AskOptions) -> Result<()> {
    if question.trim().is_empty() {
        return Err(MandoError::Other(anyhow!("Please enter a question")));
    }

    let session = Session::open(config_dir, sources, options)?;
    let report = session.answer(question)?;
    print_report(&report);
    Ok(())
}

/// Index the sources once, then answer questions until an empty line
#[inline]
pub fn chat(config_dir: &Path, sources: &Sources, options: AskOptions) -> Result<()> {
    let session = Session::open(config_dir, sources, options)?;
    eprintln!(
        "{}",
        style("Ask a question, or press Enter on an empty line to quit.").dim()
    );

    loop {
        let question: String = Input::new()
            .with_prompt("Question")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read question")?;

        if question.trim().is_empty() {
            break;
        }

        match session.answer(&question) {
            Ok(report) => print_report(&report),
            Err(e) => eprintln!("{} {}", style("Error:").red().bold(), e),
        }
        println!();
    }

    Ok(())
}

/// Load the configuration, keeping validation failures as configuration errors
fn load_config(config_dir: &Path) -> Result<Config> {
    Config::load(config_dir).map_err(|e| {
        if e.downcast_ref::<ConfigError>().is_some() {
            MandoError::Configuration(format!("{:#}", e))
        } else {
            MandoError::Other(e.context("Failed to load configuration"))
        }
    })
}

/// A built index plus the components that answer questions over it
struct Session {
    indexer: SemanticIndexer<Box<dyn Embedder>>,
    scorer: LexicalScorer,
    generator: Option<OllamaClient>,
    retrieval: RetrievalConfig,
}

impl Session {
    fn open(config_dir: &Path, sources: &Sources, options: AskOptions) -> Result<Self> {
        let config = load_config(config_dir)?;
        let retrieval = options.resolve(config.retrieval)?;

        let corpus = ingest_sources(sources, &config)?;
        let embedder = embedder_from_config(&config)?;
        let indexer = build_indexer(embedder, &config, &corpus)?;
        eprintln!(
            "{} Indexed {} chunks",
            style("✓").green(),
            indexer.chunk_count()
        );

        let generator = if retrieval.generate {
            let client =
                OllamaClient::new(&config.ollama).context("Failed to initialize Ollama client")?;
            client
                .generation_health_check()
                .context("Ollama is not ready for generation")?;
            Some(client)
        } else {
            None
        };

        Ok(Self {
            indexer,
            scorer: LexicalScorer::new(),
            generator,
            retrieval,
        })
    }

    fn answer(&self, question: &str) -> Result<AnswerReport> {
        answer_question(
            &self.indexer,
            &self.scorer,
            self.generator.as_ref().map(|g| g as &dyn Generator),
            question,
            &self.retrieval,
        )
    }
}
