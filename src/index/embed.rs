//! Text embedders.
//!
//! [`HashEmbedder`] is a feature-hashing embedder: each lowercased
//! alphanumeric token is hashed with FNV-1a into one of `dimension` buckets,
//! with the top hash bit choosing the sign, and the result is L2-normalized.
//! It needs no model download and is deterministic across runs.

/// Errors that can occur while embedding text.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EmbedError {
    #[error("nothing to embed: input has no tokens")]
    EmptyInput,

    #[error("embedding model failed: {0}")]
    Model(String),
}

/// Trait for text embedders.
pub trait Embedder: Send + Sync {
    /// Stable identifier; stored with a collection so vectors from different
    /// embedders are never compared.
    fn id(&self) -> &str;

    fn dimension(&self) -> usize;

    /// Embed `text` into a unit-length vector of [`Embedder::dimension`] floats.
    ///
    /// # Errors
    ///
    /// Returns `EmbedError::EmptyInput` if the text has nothing to embed.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

impl Embedder for Box<dyn Embedder> {
    fn id(&self) -> &str {
        self.as_ref().id()
    }

    fn dimension(&self) -> usize {
        self.as_ref().dimension()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.as_ref().embed(text)
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// FNV-1a feature-hashing embedder.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    id: String,
    dimension: usize,
}

impl HashEmbedder {
    /// Create an embedder with the given dimension (at least 1).
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            id: format!("fnv1a-{dimension}"),
            dimension,
        }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl Embedder for HashEmbedder {
    fn id(&self) -> &str {
        &self.id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    #[allow(clippy::cast_possible_truncation)]
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vector = vec![0.0_f32; self.dimension];
        let mut token_count = 0usize;

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(token.to_lowercase().as_bytes());
            // modulo keeps the bucket below dimension, which fits in usize
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 1 { -1.0 } else { 1.0 };
            vector[bucket] += sign;
            token_count += 1;
        }

        if token_count == 0 {
            return Err(EmbedError::EmptyInput);
        }

        l2_normalize(&mut vector);
        Ok(vector)
    }
}

/// Scale `vector` to unit length; zero vectors are left alone.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Cosine similarity of two vectors; `0.0` if either is zero or the
/// lengths differ.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_known_vectors() {
        assert_eq!(fnv1a(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn embedding_shape_and_id() {
        let embedder = HashEmbedder::new(256);
        let embedding = embedder.embed("hello world").unwrap();
        assert_eq!(embedding.len(), 256);
        assert_eq!(embedder.id(), "fnv1a-256");

        let norm: f32 = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn deterministic_and_case_insensitive() {
        let embedder = HashEmbedder::default();
        assert_eq!(
            embedder.embed("Rust Ownership").unwrap(),
            embedder.embed("rust ownership").unwrap()
        );
    }

    #[test]
    fn empty_input_rejected() {
        let embedder = HashEmbedder::default();
        assert_eq!(embedder.embed(""), Err(EmbedError::EmptyInput));
        assert_eq!(embedder.embed(" .,- "), Err(EmbedError::EmptyInput));
    }

    #[test]
    fn zero_dimension_clamped() {
        let embedder = HashEmbedder::new(0);
        assert_eq!(embedder.dimension(), 1);
        assert_eq!(embedder.embed("x").unwrap().len(), 1);
    }

    #[test]
    fn boxed_embedder_delegates() {
        let boxed: Box<dyn Embedder> = Box::new(HashEmbedder::new(16));
        assert_eq!(boxed.id(), "fnv1a-16");
        assert_eq!(boxed.dimension(), 16);
        assert_eq!(
            boxed.embed("rust").unwrap(),
            HashEmbedder::new(16).embed("rust").unwrap()
        );
    }

    #[test]
    fn cosine_edge_cases() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0], &[1.0, 0.0]).abs() < 1e-6);
    }

    #[test]
    fn similar_texts_score_higher() {
        let embedder = HashEmbedder::default();
        let base = embedder.embed("rust ownership borrowing").unwrap();
        let close = embedder.embed("ownership in rust").unwrap();
        let far = embedder.embed("sourdough bread recipe").unwrap();
        assert!(cosine_similarity(&base, &close) > cosine_similarity(&base, &far));
    }
}
