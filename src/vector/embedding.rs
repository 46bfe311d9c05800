//! Embedding inference client.
//!
//! Text is turned into vectors by an [`EmbeddingBackend`]. Backends are
//! blocking (model inference is CPU bound), so [`EmbeddingClient`] runs them on
//! the blocking pool and bounds every call with a timeout:
//! - inference: multi-minute budget (default 300s)
//! - model listing: short budget (default 5s)
//!
//! Expiry is reported as `ServiceError::UpstreamTimeout`. Failures are never
//! retried here.

use crate::config::EmbeddingConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::vector::types::Vector;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by an embedding backend.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Unknown embedding model '{0}'\nSuggestion: Call the model list endpoint for available names")]
    UnknownModel(String),

    #[error("Failed to initialize embedding model '{model}': {reason}")]
    ModelInit { model: String, reason: String },

    #[error("Embedding generation failed: {0}")]
    Inference(String),

    #[error("Embedding backend returned {actual} vectors for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },
}

impl From<EmbeddingError> for ServiceError {
    fn from(err: EmbeddingError) -> Self {
        ServiceError::Upstream(err.to_string())
    }
}

/// Trait for generating embeddings from text.
///
/// Implementations must be thread-safe; calls arrive from the blocking pool.
pub trait EmbeddingBackend: Send + Sync {
    /// Generate one embedding per input text using `model_name`.
    fn inference(&self, texts: &[String], model_name: &str)
    -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Names of the models this backend can serve.
    fn model_list(&self) -> Result<Vec<String>, EmbeddingError>;
}

/// Timeout-bounded handle to an embedding backend.
#[derive(Clone)]
pub struct EmbeddingClient {
    backend: Arc<dyn EmbeddingBackend>,
    default_model: String,
    inference_timeout: Duration,
    list_timeout: Duration,
}

impl std::fmt::Debug for EmbeddingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingClient")
            .field("backend", &"<EmbeddingBackend>")
            .field("default_model", &self.default_model)
            .field("inference_timeout", &self.inference_timeout)
            .field("list_timeout", &self.list_timeout)
            .finish()
    }
}

impl EmbeddingClient {
    pub fn new(backend: Arc<dyn EmbeddingBackend>, config: &EmbeddingConfig) -> Self {
        Self {
            backend,
            default_model: config.default_model.clone(),
            inference_timeout: config.inference_timeout(),
            list_timeout: config.list_timeout(),
        }
    }

    pub fn with_timeouts(mut self, inference: Duration, list: Duration) -> Self {
        self.inference_timeout = inference;
        self.list_timeout = list;
        self
    }

    /// Client over the in-process fastembed backend, when compiled in.
    pub fn local(config: &EmbeddingConfig) -> Option<Self> {
        #[cfg(feature = "local-embeddings")]
        {
            let backend = FastEmbedBackend::new(config.models.clone(), config.cache_dir.clone());
            Some(Self::new(Arc::new(backend), config))
        }
        #[cfg(not(feature = "local-embeddings"))]
        {
            let _ = config;
            None
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Embed `texts` with `model_name` (or the default model).
    pub async fn inference(
        &self,
        texts: Vec<String>,
        model_name: Option<&str>,
    ) -> ServiceResult<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = model_name.unwrap_or(&self.default_model).to_string();
        let expected = texts.len();
        let backend = Arc::clone(&self.backend);

        tracing::debug!(model = %model, texts = expected, "embedding inference");
        let embeddings = run_bounded("inference", self.inference_timeout, move || {
            backend.inference(&texts, &model)
        })
        .await?;

        if embeddings.len() != expected {
            return Err(EmbeddingError::CountMismatch {
                expected,
                actual: embeddings.len(),
            }
            .into());
        }

        Ok(embeddings
            .into_iter()
            .map(|embedding| embedding.into_iter().map(f64::from).collect())
            .collect())
    }

    /// Names of the models the backend serves.
    pub async fn model_list(&self) -> ServiceResult<Vec<String>> {
        let backend = Arc::clone(&self.backend);
        run_bounded("model list", self.list_timeout, move || backend.model_list()).await
    }
}

async fn run_bounded<T, F>(operation: &'static str, timeout: Duration, call: F) -> ServiceResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, EmbeddingError> + Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(call)).await {
        Ok(Ok(Ok(value))) => Ok(value),
        Ok(Ok(Err(err))) => {
            tracing::warn!("embedding {operation} failed: {err}");
            Err(err.into())
        }
        Ok(Err(join_err)) => {
            tracing::warn!("embedding {operation} task aborted: {join_err}");
            Err(ServiceError::Upstream(format!(
                "embedding {operation} task aborted: {join_err}"
            )))
        }
        Err(_) => {
            tracing::warn!("embedding {operation} timed out after {timeout:?}");
            Err(ServiceError::UpstreamTimeout { operation, timeout })
        }
    }
}

#[cfg(feature = "local-embeddings")]
pub use local::{FastEmbedBackend, parse_embedding_model};

#[cfg(feature = "local-embeddings")]
mod local {
    use super::{EmbeddingBackend, EmbeddingError};
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Arc;

    /// Maps a configured model name to a fastembed model.
    pub fn parse_embedding_model(name: &str) -> Result<EmbeddingModel, EmbeddingError> {
        match name {
            "AllMiniLML6V2" => Ok(EmbeddingModel::AllMiniLML6V2),
            "AllMiniLML12V2" => Ok(EmbeddingModel::AllMiniLML12V2),
            "BGESmallENV15" => Ok(EmbeddingModel::BGESmallENV15),
            "BGEBaseENV15" => Ok(EmbeddingModel::BGEBaseENV15),
            "BGELargeENV15" => Ok(EmbeddingModel::BGELargeENV15),
            "MultilingualE5Small" => Ok(EmbeddingModel::MultilingualE5Small),
            other => Err(EmbeddingError::UnknownModel(other.to_string())),
        }
    }

    /// A model slot, empty until the first request for that model loads it.
    type ModelSlot = Arc<Mutex<Option<TextEmbedding>>>;

    /// Local ONNX inference through fastembed.
    ///
    /// Models are loaded on first use and cached for the process lifetime.
    /// Each model has its own lock, so a slow load or batch only blocks
    /// requests for the same model.
    pub struct FastEmbedBackend {
        allowed: Vec<String>,
        cache_dir: PathBuf,
        models: Mutex<HashMap<String, ModelSlot>>,
    }

    impl FastEmbedBackend {
        pub fn new(allowed: Vec<String>, cache_dir: PathBuf) -> Self {
            Self {
                allowed,
                cache_dir,
                models: Mutex::new(HashMap::new()),
            }
        }

        fn slot(&self, name: &str) -> ModelSlot {
            Arc::clone(self.models.lock().entry(name.to_string()).or_default())
        }

        fn load(&self, name: &str) -> Result<TextEmbedding, EmbeddingError> {
            let model = parse_embedding_model(name)?;
            tracing::info!(model = name, cache = %self.cache_dir.display(), "loading embedding model");
            TextEmbedding::try_new(
                InitOptions::new(model)
                    .with_cache_dir(self.cache_dir.clone())
                    .with_show_download_progress(false),
            )
            .map_err(|e| EmbeddingError::ModelInit {
                model: name.to_string(),
                reason: e.to_string(),
            })
        }
    }

    impl EmbeddingBackend for FastEmbedBackend {
        fn inference(
            &self,
            texts: &[String],
            model_name: &str,
        ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            if !self.allowed.iter().any(|m| m == model_name) {
                return Err(EmbeddingError::UnknownModel(model_name.to_string()));
            }

            let slot = self.slot(model_name);
            let mut guard = slot.lock();
            if guard.is_none() {
                *guard = Some(self.load(model_name)?);
            }
            let model = guard
                .as_mut()
                .ok_or_else(|| EmbeddingError::UnknownModel(model_name.to_string()))?;

            model
                .embed(texts.to_vec(), None)
                .map_err(|e| EmbeddingError::Inference(e.to_string()))
        }

        fn model_list(&self) -> Result<Vec<String>, EmbeddingError> {
            Ok(self
                .allowed
                .iter()
                .filter(|name| parse_embedding_model(name).is_ok())
                .cloned()
                .collect())
        }
    }

}

/// Deterministic backend for tests.
#[cfg(test)]
pub struct MockEmbeddingBackend {
    pub dimension: usize,
    pub delay: Duration,
}

#[cfg(test)]
impl EmbeddingBackend for MockEmbeddingBackend {
    fn inference(
        &self,
        texts: &[String],
        _model_name: &str,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        std::thread::sleep(self.delay);
        Ok(texts
            .iter()
            .map(|text| {
                let mut embedding = vec![0.1; self.dimension];
                embedding[text.len() % self.dimension] = 1.0;
                embedding
            })
            .collect())
    }

    fn model_list(&self) -> Result<Vec<String>, EmbeddingError> {
        std::thread::sleep(self.delay);
        Ok(vec!["mock".to_string()])
    }
}
