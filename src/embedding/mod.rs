//! Text embedding
//!
//! The vector index turns document and query text into vectors through the
//! [`Embedder`] trait. [`HashingEmbedder`] is a dependency-free, deterministic
//! implementation based on feature hashing: word tokens and their character
//! trigrams are hashed into a fixed number of signed buckets and the result is
//! L2-normalized. Texts sharing vocabulary land close together, which is enough
//! for small collections and fully reproducible in tests.

use crate::defaults::{DEFAULT_EMBEDDING_DIMS, TOKEN_WEIGHT, TRIGRAM_WEIGHT};
use std::fmt::Debug;

/// Maps text to a fixed-dimension vector
pub trait Embedder: Send + Sync + Debug + 'static {
    /// Embed a single text. The result always has `dimensions()` entries.
    fn embed(&self, text: &str) -> Vec<f32>;

    /// Output dimensionality
    fn dimensions(&self) -> usize;

    /// Embed a batch of texts
    fn embed_batch(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Feature-hashing embedder
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dims: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIMS)
    }
}

impl HashingEmbedder {
    /// Create an embedder with `dims` buckets (at least one)
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let hash = crc32fast::hash(feature);
        let bucket = (hash as usize) % self.dims;
        let sign = if hash & 0x8000_0000 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];

        for token in tokenize(text) {
            self.add_feature(&mut vector, token.as_bytes(), TOKEN_WEIGHT);

            let chars: Vec<char> = token.chars().collect();
            if chars.len() > 3 {
                for window in chars.windows(3) {
                    let trigram: String = window.iter().collect();
                    // Prefix keeps trigrams out of the whole-token feature space
                    let feature = format!("#{}", trigram);
                    self.add_feature(&mut vector, feature.as_bytes(), TRIGRAM_WEIGHT);
                }
            }
        }

        normalize_in_place(&mut vector);
        vector
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Lowercased alphanumeric runs
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
}

/// Scale to unit length; the zero vector stays zero
pub fn normalize_in_place(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
