// ONNX Runtime sentiment scorer
//
// Runs a DistilBERT SST-2 export. Model files come from the HuggingFace Hub
// cache (HF_HOME controls the location).

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use hf_hub::{api::sync::Api, Repo, RepoType};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::Value,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use super::{SentimentLabel, SentimentResult, SentimentScorer};

/// ONNX export of distilbert-base-uncased-finetuned-sst-2-english
pub const DEFAULT_SENTIMENT_REPO: &str = "Xenova/distilbert-base-uncased-finetuned-sst-2-english";

/// Output index -> label, as in the SST-2 head's id2label
const LABELS: [SentimentLabel; 2] = [SentimentLabel::Negative, SentimentLabel::Positive];

/// Token ceiling for the encoder
const MAX_TOKENS: usize = 512;

/// Sentiment scorer backed by an ONNX Runtime session
pub struct OnnxSentimentScorer {
    // Session::run needs &mut; inference is short so a plain mutex is enough
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
}

impl OnnxSentimentScorer {
    /// Download (or reuse cached) model files and build a session
    ///
    /// Blocking; call from the blocking pool.
    pub fn load(repo_id: &str) -> Result<Self> {
        info!("Loading sentiment model: {}", repo_id);
        let (model_path, tokenizer_path) = download_model_files(repo_id)?;
        Self::from_files(&model_path, &tokenizer_path, repo_id)
    }

    /// Build a scorer from local model and tokenizer files
    pub fn from_files(model_path: &Path, tokenizer_path: &Path, model_name: &str) -> Result<Self> {
        let tokenizer = load_tokenizer(tokenizer_path)?;

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(2)?
            .commit_from_file(model_path)
            .context("Failed to create ONNX session")?;

        info!("Sentiment model ready: {}", model_name);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name: model_name.to_string(),
        })
    }

    fn predict(
        session: &Mutex<Session>,
        tokenizer: &Tokenizer,
        text: &str,
    ) -> Result<SentimentResult> {
        let (input_ids, attention_mask) = encode(tokenizer, text)?;
        let len = input_ids.len();
        debug!("Sentiment input: {} tokens", len);

        let input_ids = Value::from_array(
            ndarray::Array2::from_shape_vec((1, len), input_ids)
                .context("Failed to create ndarray for input_ids")?,
        )?;
        let attention_mask = Value::from_array(
            ndarray::Array2::from_shape_vec((1, len), attention_mask)
                .context("Failed to create ndarray for attention_mask")?,
        )?;

        let mut session = session
            .lock()
            .map_err(|_| anyhow!("Sentiment session lock poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => input_ids,
            "attention_mask" => attention_mask,
        ])?;

        let (_shape, logits) = outputs
            .get("logits")
            .ok_or_else(|| anyhow!("Model output has no 'logits' tensor"))?
            .try_extract_tensor::<f32>()
            .context("Failed to extract logits")?;

        label_from_logits(logits)
    }
}

#[async_trait]
impl SentimentScorer for OnnxSentimentScorer {
    async fn score(&self, text: &str) -> Result<SentimentResult> {
        let session = self.session.clone();
        let tokenizer = self.tokenizer.clone();
        let text = text.to_string();

        tokio::task::spawn_blocking(move || Self::predict(&session, &tokenizer, &text))
            .await
            .context("Sentiment inference task panicked")?
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

/// Load a tokenizer that truncates to the encoder's token ceiling
///
/// Truncation happens before special tokens are added, so [CLS] and [SEP]
/// survive long inputs.
fn load_tokenizer(path: &Path) -> Result<Tokenizer> {
    let mut tokenizer = Tokenizer::from_file(path)
        .map_err(|e| anyhow!("Failed to load tokenizer from {:?}: {}", path, e))?;
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: MAX_TOKENS,
            ..Default::default()
        }))
        .map_err(|e| anyhow!("Failed to configure tokenizer truncation: {}", e))?;
    Ok(tokenizer)
}

/// Token ids and attention mask as model inputs
fn encode(tokenizer: &Tokenizer, text: &str) -> Result<(Vec<i64>, Vec<i64>)> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| anyhow!("Failed to encode text: {}", e))?;

    let input_ids = encoding.get_ids().iter().map(|&t| t as i64).collect();
    let attention_mask = encoding
        .get_attention_mask()
        .iter()
        .map(|&m| m as i64)
        .collect();
    Ok((input_ids, attention_mask))
}

fn download_model_files(repo_id: &str) -> Result<(PathBuf, PathBuf)> {
    let api = Api::new().context("Failed to initialize HuggingFace Hub client")?;
    let repo = api.repo(Repo::new(repo_id.to_string(), RepoType::Model));

    let tokenizer_path = repo
        .get("tokenizer.json")
        .with_context(|| format!("Failed to download tokenizer.json from {}", repo_id))?;

    // onnx-community style repos keep the graph under onnx/
    let model_path = match repo.get("onnx/model.onnx") {
        Ok(path) => path,
        Err(_) => repo
            .get("model.onnx")
            .with_context(|| format!("No ONNX model found in {}", repo_id))?,
    };

    debug!("Sentiment model files: {:?}, {:?}", model_path, tokenizer_path);
    Ok((model_path, tokenizer_path))
}

/// Softmax over the two SST-2 logits and pick the winning label
fn label_from_logits(logits: &[f32]) -> Result<SentimentResult> {
    if logits.len() != LABELS.len() {
        anyhow::bail!("Expected {} logits, got {}", LABELS.len(), logits.len());
    }

    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    let (idx, best) = exps
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .context("Empty logits")?;

    Ok(SentimentResult::new(LABELS[idx], best / sum))
}
