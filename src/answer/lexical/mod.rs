
use anyhow::{Result, bail};
use std::collections::HashSet;

use super::{AnswerCandidate, Scorer};

const STOP_WORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "as", "at", "be", "by", "can", "did", "do", "does", "for",
    "from", "has", "have", "how", "i", "in", "is", "it", "its", "me", "of", "on", "or", "that",
    "the", "their", "there", "this", "to", "was", "were", "what", "when", "where", "which", "who",
    "whom", "why", "will", "with", "you", "your",
];

/// Extractive scorer based on term overlap.
///
/// Picks the sentence of the context that contains the largest share of the
/// question's content terms. Confidence is that share, in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalScorer;

impl LexicalScorer {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Scorer for LexicalScorer {
    #[inline]
    fn score(&self, question: &str, context: &str) -> Result<AnswerCandidate> {
        let question_terms = content_terms(question);
        if question_terms.is_empty() {
            bail!("Question has no content terms: {:?}", question);
        }

        let mut best: Option<AnswerCandidate> = None;
        for sentence in split_sentences(context) {
            let sentence_terms = content_terms(sentence);
            let matched = question_terms
                .iter()
                .filter(|term| sentence_terms.contains(*term))
                .count();
            let confidence = matched as f32 / question_terms.len() as f32;

            if best.as_ref().is_none_or(|b| confidence > b.confidence) {
                best = Some(AnswerCandidate {
                    answer: sentence.to_string(),
                    confidence,
                });
            }
        }

        match best {
            Some(candidate) => Ok(candidate),
            None => bail!("Context is empty"),
        }
    }
}

/// Distinct lower-cased alphanumeric terms, stop-words removed
fn content_terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
        .filter(|term| !STOP_WORDS.contains(&term.as_str()))
        .collect()
}

/// Split on line breaks and on `.`, `!`, `?` followed by whitespace or the end
/// of the text. Terminators stay with their sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        let boundary = match c {
            '\n' => Some(index),
            '.' | '!' | '?' => match chars.peek() {
                None => Some(index + c.len_utf8()),
                Some((_, next)) if next.is_whitespace() => Some(index + c.len_utf8()),
                Some(_) => None,
            },
            _ => None,
        };

        if let Some(end) = boundary {
            push_trimmed(&mut sentences, text.get(start..end));
            start = end;
        }
    }
    push_trimmed(&mut sentences, text.get(start..));

    sentences
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, piece: Option<&'a str>) {
    if let Some(sentence) = piece.map(str::trim).filter(|s| !s.is_empty()) {
        sentences.push(sentence);
    }
}
