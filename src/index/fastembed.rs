//! Sentence-embedding model via `fastembed` (feature `semantic`).
//!
//! Runs all-MiniLM-L6-v2 locally through ONNX Runtime. Model files are
//! fetched into the cache directory on first use.

use std::path::Path;
use std::sync::Mutex;

use ::fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::index::embed::{EmbedError, Embedder};

const MINILM_EMBEDDER_ID: &str = "minilm-384";
const MINILM_DIMENSION: usize = 384;

/// all-MiniLM-L6-v2 sentence embedder.
pub struct FastEmbedEmbedder {
    model: Mutex<TextEmbedding>,
}

impl FastEmbedEmbedder {
    /// Load the model, downloading it into `cache_dir` if it isn't there.
    ///
    /// # Errors
    ///
    /// Returns `EmbedError::Model` if the model can't be fetched or loaded.
    pub fn new(cache_dir: &Path) -> Result<Self, EmbedError> {
        let options = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_cache_dir(cache_dir.to_path_buf())
            .with_show_download_progress(false);

        let model = TextEmbedding::try_new(options)
            .map_err(|e| EmbedError::Model(format!("load all-MiniLM-L6-v2: {e}")))?;

        tracing::info!(cache = %cache_dir.display(), "Loaded all-MiniLM-L6-v2");
        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl Embedder for FastEmbedEmbedder {
    fn id(&self) -> &str {
        MINILM_EMBEDDER_ID
    }

    fn dimension(&self) -> usize {
        MINILM_DIMENSION
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if text.trim().is_empty() {
            return Err(EmbedError::EmptyInput);
        }

        #[allow(unused_mut)]
        let mut model = self
            .model
            .lock()
            .map_err(|_| EmbedError::Model("embedder lock poisoned".to_string()))?;

        let embedding = model
            .embed(vec![text], None)
            .map_err(|e| EmbedError::Model(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::Model("no embedding returned".to_string()))?;

        if embedding.len() != MINILM_DIMENSION {
            return Err(EmbedError::Model(format!(
                "dimension mismatch: expected {MINILM_DIMENSION}, got {}",
                embedding.len()
            )));
        }
        Ok(embedding)
    }
}
