#[cfg(test)]
mod tests;

use anyhow::{Result, bail};
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use super::Embedder;

pub const DEFAULT_HASHING_DIMENSION: usize = 384;

/// Deterministic feature-hashing embedder.
///
/// Every lower-cased alphanumeric term is hashed into one of `dimension`
/// buckets with a hash-derived sign, and the resulting vector is L2
/// normalised. Texts sharing more terms land closer together, which is
/// enough for offline use and tests without a model server.
#[derive(Debug, Clone, Copy)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    #[inline]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimension];

        for term in terms(text) {
            let mut hasher = XxHash64::with_seed(0);
            term.hash(&mut hasher);
            let hash = hasher.finish();

            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

impl Default for HashingEmbedder {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_HASHING_DIMENSION)
    }
}

impl Embedder for HashingEmbedder {
    #[inline]
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.dimension == 0 {
            bail!("Hashing embedder needs a non-zero dimension");
        }
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
}
