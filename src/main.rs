use clap::{Parser, Subcommand};
use mando::Result;
use mando::answer::AnswerStrategy;
use mando::commands::{AskOptions, Sources, ask, chat};
use mando::config::{Config, init_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mando")]
#[command(about = "Ask questions about your documents and web pages")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml (defaults to the user config directory)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Default)]
struct SourceArgs {
    /// Document to ingest (txt, md, json, csv, tsv, html, docx, pptx); repeatable
    #[arg(long = "file", short = 'f')]
    files: Vec<PathBuf>,
    /// Web page to crawl for extra content
    #[arg(long)]
    url: Option<String>,
}

#[derive(clap::Args, Debug, Default)]
struct RetrievalArgs {
    /// Number of chunks to retrieve
    #[arg(long)]
    top_k: Option<usize>,
    /// How retrieved chunks are turned into an answer
    #[arg(long, value_enum)]
    strategy: Option<AnswerStrategy>,
    /// Also ask the generative model
    #[arg(long)]
    generate: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the given sources and answer one question
    Ask {
        /// The question to answer
        question: String,
        #[command(flatten)]
        sources: SourceArgs,
        #[command(flatten)]
        retrieval: RetrievalArgs,
    },
    /// Index the given sources and answer questions interactively
    Chat {
        #[command(flatten)]
        sources: SourceArgs,
        #[command(flatten)]
        retrieval: RetrievalArgs,
    },
    /// Show or initialize the configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Write a default configuration file
        #[arg(long, conflicts_with = "show")]
        init: bool,
    },
}

impl From<SourceArgs> for Sources {
    fn from(args: SourceArgs) -> Self {
        Self {
            files: args.files,
            url: args.url,
        }
    }
}

impl From<RetrievalArgs> for AskOptions {
    fn from(args: RetrievalArgs) -> Self {
        Self {
            top_k: args.top_k,
            strategy: args.strategy,
            generate: args.generate,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => Config::default_dir()?,
    };

    match cli.command {
        Commands::Ask {
            question,
            sources,
            retrieval,
        } => {
            ask(&config_dir, &question, &sources.into(), retrieval.into())?;
        }
        Commands::Chat { sources, retrieval } => {
            chat(&config_dir, &sources.into(), retrieval.into())?;
        }
        Commands::Config { init, .. } => {
            if init {
                init_config(&config_dir)?;
            } else {
                show_config(&config_dir)?;
            }
        }
    }

    Ok(())
}
