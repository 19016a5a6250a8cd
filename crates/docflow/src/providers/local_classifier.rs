//! Local ONNX sequence-classification backend

use async_trait::async_trait;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use tokenizers::Tokenizer;

use crate::config::ClassifierConfig;
use crate::error::{Error, Result};

use super::classifier::Classifier;

/// Runs a sequence-classification model locally instead of calling the
/// prediction service. The model directory must contain `model.onnx` and
/// `tokenizer.json`; logits map onto the configured label set in order.
pub struct LocalClassifier {
    /// `Session::run` takes `&mut self`, so the session sits behind a mutex
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    max_length: usize,
}

impl LocalClassifier {
    /// Load the model and tokenizer from the configured directory
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let model_dir = config.model_dir.as_ref().ok_or_else(|| {
            Error::Config("local classifier backend requires classifier.model_dir".to_string())
        })?;

        if config.labels.is_empty() {
            return Err(Error::Config(
                "local classifier backend requires a non-empty classifier.labels list".to_string(),
            ));
        }

        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        tracing::info!("Loading local classifier from {}", model_dir.display());

        let session = Session::builder()
            .map_err(|e| Error::Classification(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::Classification(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(4)
            .map_err(|e| Error::Classification(format!("Failed to set threads: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| Error::Classification(format!("Failed to load model: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::Classification(format!("Failed to load tokenizer: {}", e)))?;

        tracing::info!(
            "Local classifier ready ({} labels, max_length {})",
            config.labels.len(),
            config.max_length
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            labels: config.labels.clone(),
            max_length: config.max_length,
        })
    }

    fn predict(&self, text: &str) -> Result<String> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::Classification(format!("Tokenization failed: {}", e)))?;

        let ids = encoding.get_ids();
        let mask = encoding.get_attention_mask();
        let types = encoding.get_type_ids();
        let len = ids.len().min(self.max_length);

        let mut input_ids = vec![0i64; len];
        let mut attention_mask = vec![0i64; len];
        let mut token_type_ids = vec![0i64; len];
        for i in 0..len {
            input_ids[i] = ids[i] as i64;
            attention_mask[i] = mask[i] as i64;
            token_type_ids[i] = types[i] as i64;
        }

        let input_ids_tensor = Tensor::from_array((vec![1, len], input_ids.into_boxed_slice()))
            .map_err(|e| Error::Classification(format!("Input tensor creation failed: {}", e)))?;
        let attention_mask_tensor =
            Tensor::from_array((vec![1, len], attention_mask.into_boxed_slice())).map_err(|e| {
                Error::Classification(format!("Attention mask tensor creation failed: {}", e))
            })?;
        let token_type_ids_tensor =
            Tensor::from_array((vec![1, len], token_type_ids.into_boxed_slice())).map_err(|e| {
                Error::Classification(format!("Token type tensor creation failed: {}", e))
            })?;

        let inputs = vec![
            ("input_ids", input_ids_tensor.into_dyn()),
            ("attention_mask", attention_mask_tensor.into_dyn()),
            ("token_type_ids", token_type_ids_tensor.into_dyn()),
        ];

        let mut session = self.session.lock();
        let outputs = session
            .run(inputs)
            .map_err(|e| Error::Classification(format!("Inference failed: {}", e)))?;

        let output_iter: Vec<_> = outputs.iter().collect();
        let output = output_iter
            .iter()
            .find(|(name, _)| *name == "logits")
            .or_else(|| output_iter.first())
            .map(|(_, v)| v)
            .ok_or_else(|| Error::Classification("No output tensor".to_string()))?;

        let (_, logits) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Classification(format!("Failed to extract tensor: {}", e)))?;

        let (best, _) = logits
            .iter()
            .enumerate()
            .take(self.labels.len())
            .fold((0usize, f32::NEG_INFINITY), |(bi, bv), (i, &v)| {
                if v > bv { (i, v) } else { (bi, bv) }
            });

        self.labels
            .get(best)
            .cloned()
            .ok_or_else(|| {
                Error::Classification(format!(
                    "model predicted class {} but only {} labels are configured",
                    best,
                    self.labels.len()
                ))
            })
    }
}

#[async_trait]
impl Classifier for LocalClassifier {
    async fn classify(&self, text: &str) -> Option<String> {
        match self.predict(text) {
            Ok(label) => Some(label),
            Err(e) => {
                tracing::warn!("Local classification failed: {}", e);
                None
            }
        }
    }

    fn name(&self) -> &str {
        "local"
    }
}
