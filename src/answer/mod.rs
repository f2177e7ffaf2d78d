// Answer selection module
// Turns retrieved chunks into a single answer, by concatenation or per-chunk scoring

pub mod lexical;


use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::index::SearchHit;
use crate::{MandoError, Result};

pub use lexical::LexicalScorer;

/// Text shown when no chunk produced a usable answer
pub const NO_ANSWER_TEXT: &str = "No answer available.";

/// How retrieved chunks are turned into an answer
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStrategy {
    /// Join the retrieved chunks into one context and answer over it
    #[default]
    Concatenate,
    /// Score every retrieved chunk on its own and keep the most confident
    PerChunk,
}

impl fmt::Display for AnswerStrategy {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concatenate => write!(f, "concatenate"),
            Self::PerChunk => write!(f, "per_chunk"),
        }
    }
}

/// An answer span and how confident the scorer is in it (higher is better)
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerCandidate {
    pub answer: String,
    pub confidence: f32,
}

/// Outcome of answer selection
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerSelection {
    Answer(AnswerCandidate),
    /// Every chunk failed to score, or there was nothing to score
    NoAnswer,
}

impl AnswerSelection {
    #[inline]
    pub fn is_answer(&self) -> bool {
        matches!(self, Self::Answer(_))
    }

    #[inline]
    pub fn candidate(&self) -> Option<&AnswerCandidate> {
        match self {
            Self::Answer(candidate) => Some(candidate),
            Self::NoAnswer => None,
        }
    }
}

impl fmt::Display for AnswerSelection {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Answer(candidate) => write!(f, "{}", candidate.answer),
            Self::NoAnswer => write!(f, "{NO_ANSWER_TEXT}"),
        }
    }
}

/// Extractive question answering over a single context.
///
/// A call may fail; callers scanning several contexts treat a failure as
/// "this context has no answer" rather than aborting.
pub trait Scorer: Send + Sync {
    fn score(&self, question: &str, context: &str) -> anyhow::Result<AnswerCandidate>;
}

/// Free-form text generation from a prompt
pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

impl<S: Scorer + ?Sized> Scorer for Box<S> {
    #[inline]
    fn score(&self, question: &str, context: &str) -> anyhow::Result<AnswerCandidate> {
        (**self).score(question, context)
    }
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    #[inline]
    fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        (**self).generate(prompt)
    }
}

/// Join retrieved chunk texts with newlines, keeping retrieval order
#[inline]
pub fn concatenate_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| hit.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Score one context, turning scorer failures and unusable confidences into
/// `MandoError::Scoring`
#[inline]
pub fn score_context<S: Scorer + ?Sized>(
    scorer: &S,
    question: &str,
    context: &str,
) -> Result<AnswerCandidate> {
    let candidate = scorer
        .score(question, context)
        .map_err(|e| MandoError::Scoring(format!("{:#}", e)))?;

    if candidate.confidence.is_nan() {
        return Err(MandoError::Scoring(
            "scorer returned a NaN confidence".to_string(),
        ));
    }

    Ok(candidate)
}

/// Score every chunk independently and keep the most confident answer.
///
/// The first chunk reaching the maximum confidence wins ties. Chunks whose
/// scoring fails are skipped; if none succeed the result is
/// [`AnswerSelection::NoAnswer`].
#[inline]
pub fn select_best_answer<S, T>(scorer: &S, question: &str, chunks: &[T]) -> AnswerSelection
where
    S: Scorer + ?Sized,
    T: AsRef<str>,
{
    merge_in_order(
        chunks
            .iter()
            .map(|chunk| score_context(scorer, question, chunk.as_ref())),
    )
}

/// Same selection as [`select_best_answer`], scoring chunks on the rayon pool.
///
/// Results are merged in chunk order, so the winner does not depend on which
/// score finished first.
#[inline]
pub fn select_best_answer_parallel<S, T>(
    scorer: &S,
    question: &str,
    chunks: &[T],
) -> AnswerSelection
where
    S: Scorer + ?Sized,
    T: AsRef<str> + Sync,
{
    let results = chunks
        .par_iter()
        .map(|chunk| score_context(scorer, question, chunk.as_ref()))
        .collect::<Vec<_>>();

    merge_in_order(results)
}

fn merge_in_order<I>(results: I) -> AnswerSelection
where
    I: IntoIterator<Item = Result<AnswerCandidate>>,
{
    let mut best: Option<AnswerCandidate> = None;
    let mut scored = 0_usize;
    let mut failed = 0_usize;

    for (position, result) in results.into_iter().enumerate() {
        match result {
            Ok(candidate) => {
                scored += 1;
                let replaces = best
                    .as_ref()
                    .is_none_or(|current| candidate.confidence > current.confidence);
                if replaces {
                    best = Some(candidate);
                }
            }
            Err(e) => {
                failed += 1;
                warn!("Skipping chunk {}: {}", position, e);
            }
        }
    }

    debug!("Scored {} chunks, {} failed", scored, failed);

    match best {
        Some(candidate) => AnswerSelection::Answer(candidate),
        None => {
            if failed > 0 {
                warn!("All {} chunks failed to score", failed);
            }
            AnswerSelection::NoAnswer
        }
    }
}

/// Prompt handed to the generative model
#[inline]
pub fn build_prompt(question: &str, context: &str) -> String {
    format!("Context: {context}\nQuestion: {question}\nAnswer:")
}

/// Ask the generator to answer `question` from `context`.
///
/// Models that echo their input have the prompt removed from the output.
#[inline]
pub fn generate_answer<G: Generator + ?Sized>(
    generator: &G,
    question: &str,
    context: &str,
) -> Result<String> {
    let prompt = build_prompt(question, context);
    debug!("Generating answer from {} bytes of context", context.len());

    let output = generator
        .generate(&prompt)
        .map_err(|e| MandoError::Other(e.context("Generative answer failed")))?;

    Ok(output.replace(&prompt, "").trim().to_string())
}
