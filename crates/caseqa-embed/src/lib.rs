use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use caseqa_core::traits::Embedder;

pub mod device;
pub mod pool;
pub mod tokenize;

pub use pool::masked_mean_l2;

/// Sentence-transformers checkpoints are trained with 128-token inputs.
pub const DEFAULT_MAX_LEN: usize = 128;
pub const FAKE_DIM: usize = 768;

/// XLM-RoBERTa sentence encoder: mean pooling over the last hidden state,
/// L2-normalized.
pub struct SentenceEmbedder {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
}

impl SentenceEmbedder {
    pub fn load(model_dir: &Path) -> Result<Self> {
        let device = device::select_device();
        info!("Loading embedding model from {}", model_dir.display());

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path)?;
        let config: XLMRobertaConfig = serde_json::from_str(&raw_config)?;
        let dim = hidden_size(&raw_config).ok_or_else(|| anyhow!("{} has no hidden_size", config_path.display()))?;

        let vb = load_weights(model_dir, &device)?;
        let model = XLMRobertaModel::new(&config, vb)?;
        info!("Embedding model ready (dim={})", dim);
        Ok(Self { model, tokenizer, device, dim, max_len: DEFAULT_MAX_LEN })
    }

    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize::tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if emb.len() != self.dim {
            return Err(anyhow!("model produced {} dims, expected {}", emb.len(), self.dim));
        }
        if start.elapsed().as_millis() > 500 { debug!("Slow embedding: {:?}", start.elapsed()); }
        Ok(emb)
    }
}

impl Embedder for SentenceEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_text(t)).collect()
    }
}

fn hidden_size(raw_config: &str) -> Option<usize> {
    let raw: serde_json::Value = serde_json::from_str(raw_config).ok()?;
    raw.get("hidden_size").and_then(serde_json::Value::as_u64).map(|v| v as usize)
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        // SAFETY: the file is memory-mapped read-only and not modified while the model lives.
        return Ok(unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DType::F32, device)? });
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        let weights: HashMap<String, Tensor> = candle_core::pickle::read_all(&pickle)?.into_iter().collect();
        return Ok(VarBuilder::from_tensors(weights, DType::F32, device));
    }
    Err(anyhow!("No model.safetensors or pytorch_model.bin in {}", model_dir.display()))
}

/// Deterministic hashed bag-of-words vectors. No model files needed.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim } }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { usize::MAX }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

pub fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// The configured model, or the fake embedder when `APP_USE_FAKE_EMBEDDINGS=1`.
pub fn get_default_embedder(embedding_model: &str) -> Result<Box<dyn Embedder>> {
    if use_fake_embeddings() { warn!("Using FakeEmbedder"); return Ok(Box::new(FakeEmbedder::new(FAKE_DIM))); }
    let dir = resolve_model_dir(embedding_model)?;
    Ok(Box::new(SentenceEmbedder::load(&dir)?))
}

/// `embedding_model` may itself be a local directory; otherwise look in
/// `APP_MODEL_DIR`, `MODEL_DIR`, then `models/<model name>`.
pub fn resolve_model_dir(embedding_model: &str) -> Result<PathBuf> {
    let direct = PathBuf::from(embedding_model);
    if direct.is_dir() { return Ok(direct); }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = PathBuf::from(&dir);
            if p.is_dir() { info!("Using {}: {}", var, p.display()); return Ok(p); }
        }
    }
    let name = embedding_model.rsplit('/').next().unwrap_or(embedding_model);
    let local = Path::new("models").join(name);
    if local.is_dir() { return Ok(local); }
    Err(anyhow!(
        "Could not locate model directory for '{}' (tried it as a path, APP_MODEL_DIR, MODEL_DIR, {})",
        embedding_model,
        local.display()
    ))
}
