#[cfg(test)]
mod tests;

use itertools::Itertools;
use std::cmp::Ordering;
use tracing::debug;

use crate::{MandoError, Result};

/// One search result: the row's position and its squared Euclidean distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Exact nearest-neighbour index over squared Euclidean distance.
///
/// Rows are stored contiguously; row `i` is the vector for chunk position `i`.
/// The structure is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    /// Build from one vector per row. All rows must share one non-zero
    /// dimension and contain only finite values.
    #[inline]
    pub fn build(vectors: &[Vec<f32>]) -> Result<Self> {
        let Some(first) = vectors.first() else {
            return Err(MandoError::EmptyCorpus);
        };

        let dimension = first.len();
        if dimension == 0 {
            return Err(MandoError::Embedding(
                "embedder returned zero-dimension vectors".to_string(),
            ));
        }

        let mut data = Vec::with_capacity(vectors.len() * dimension);
        for (row, vector) in vectors.iter().enumerate() {
            if vector.len() != dimension {
                return Err(MandoError::Embedding(format!(
                    "vector {} has dimension {} but the index dimension is {}",
                    row,
                    vector.len(),
                    dimension
                )));
            }
            if vector.iter().any(|x| !x.is_finite()) {
                return Err(MandoError::Embedding(format!(
                    "vector {} contains non-finite values",
                    row
                )));
            }
            data.extend_from_slice(vector);
        }

        debug!(
            "Built flat L2 index with {} rows of dimension {}",
            vectors.len(),
            dimension
        );

        Ok(Self { dimension, data })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return up to `k` rows closest to `query`, nearest first.
    ///
    /// Equal distances are ordered by ascending position.
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(MandoError::Embedding(format!(
                "query has dimension {} but the index dimension is {}",
                query.len(),
                self.dimension
            )));
        }
        if query.iter().any(|x| !x.is_finite()) {
            return Err(MandoError::Embedding(
                "query vector contains non-finite values".to_string(),
            ));
        }

        let neighbors = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, row)| Neighbor {
                position,
                distance: squared_l2(row, query),
            })
            .k_smallest_by(k, compare_neighbors)
            .collect::<Vec<_>>();

        Ok(neighbors)
    }
}

/// Squared Euclidean distance between two equal-length vectors
#[inline]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

fn compare_neighbors(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.position.cmp(&b.position))
}
