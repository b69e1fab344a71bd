// crates/stylescope-core/src/bert.rs
//
// Real-mode layer extraction with a BERT-family encoder on candle.
//
// A model directory must hold `config.json`, `tokenizer.json` and
// `model.safetensors`. The forward pass keeps the embedding output and every
// encoder layer output; the row for each is the hidden state at the chunk's
// last token position, so L = num_hidden_layers + 1 and D = hidden_size.

use std::path::{Path, PathBuf};

use candle_core::{DType, Device, IndexOp, Module, Tensor};
use candle_nn::{embedding, layer_norm, linear, Embedding, LayerNorm, Linear, VarBuilder};
use serde::Deserialize;
use tokenizers::Tokenizer;

use crate::chunker::{chunk_ids, Chunk, ChunkSize};
use crate::error::StyleScopeError;
use crate::trajectory::LayerMatrix;

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

fn default_type_vocab_size() -> usize {
    2
}

fn default_layer_norm_eps() -> f64 {
    1e-12
}

/// The subset of a Hugging Face BERT `config.json` the encoder needs.
#[derive(Debug, Clone, Deserialize)]
pub struct BertConfig {
    pub vocab_size: usize,
    pub hidden_size: usize,
    pub num_hidden_layers: usize,
    pub num_attention_heads: usize,
    pub intermediate_size: usize,
    pub max_position_embeddings: usize,
    #[serde(default = "default_type_vocab_size")]
    pub type_vocab_size: usize,
    #[serde(default = "default_layer_norm_eps")]
    pub layer_norm_eps: f64,
}

struct EncoderLayer {
    query: Linear,
    key: Linear,
    value: Linear,
    attention_out: Linear,
    attention_norm: LayerNorm,
    intermediate: Linear,
    output: Linear,
    output_norm: LayerNorm,
}

impl EncoderLayer {
    fn load(vb: VarBuilder, config: &BertConfig) -> candle_core::Result<Self> {
        let h = config.hidden_size;
        let attention = vb.pp("attention");
        Ok(Self {
            query: linear(h, h, attention.pp("self").pp("query"))?,
            key: linear(h, h, attention.pp("self").pp("key"))?,
            value: linear(h, h, attention.pp("self").pp("value"))?,
            attention_out: linear(h, h, attention.pp("output").pp("dense"))?,
            attention_norm: layer_norm(h, config.layer_norm_eps, attention.pp("output").pp("LayerNorm"))?,
            intermediate: linear(h, config.intermediate_size, vb.pp("intermediate").pp("dense"))?,
            output: linear(config.intermediate_size, h, vb.pp("output").pp("dense"))?,
            output_norm: layer_norm(h, config.layer_norm_eps, vb.pp("output").pp("LayerNorm"))?,
        })
    }

    fn forward(&self, hidden: &Tensor, heads: usize) -> candle_core::Result<Tensor> {
        let (batch, seq, width) = hidden.dims3()?;
        let head_dim = width / heads;

        let split = |t: Tensor| -> candle_core::Result<Tensor> {
            t.reshape((batch, seq, heads, head_dim))?
                .transpose(1, 2)?
                .contiguous()
        };
        let q = split(self.query.forward(hidden)?)?;
        let k = split(self.key.forward(hidden)?)?;
        let v = split(self.value.forward(hidden)?)?;

        let scores = (q.matmul(&k.t()?)? / (head_dim as f64).sqrt())?;
        let probs = candle_nn::ops::softmax_last_dim(&scores)?;
        let context = probs
            .matmul(&v)?
            .transpose(1, 2)?
            .contiguous()?
            .reshape((batch, seq, width))?;

        let attended = self
            .attention_norm
            .forward(&(self.attention_out.forward(&context)? + hidden)?)?;
        let expanded = self.intermediate.forward(&attended)?.gelu_erf()?;
        self.output_norm
            .forward(&(self.output.forward(&expanded)? + attended)?)
    }
}

/// Loaded tokenizer and encoder weights for one model.
pub struct BertExtractor {
    config: BertConfig,
    tokenizer: Tokenizer,
    device: Device,
    word_embeddings: Embedding,
    position_embeddings: Embedding,
    token_type_embeddings: Embedding,
    embedding_norm: LayerNorm,
    layers: Vec<EncoderLayer>,
}

impl std::fmt::Debug for BertExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BertExtractor")
            .field("config", &self.config)
            .finish()
    }
}

/// Locate a model directory: an existing path is used as-is, otherwise the
/// id is looked up under `models_dir`.
pub fn resolve_model_dir(model_id: &str, models_dir: Option<&Path>) -> Result<PathBuf, StyleScopeError> {
    let direct = PathBuf::from(model_id);
    if direct.is_dir() {
        return Ok(direct);
    }
    if let Some(root) = models_dir {
        let nested = root.join(model_id);
        if nested.is_dir() {
            return Ok(nested);
        }
    }
    Err(StyleScopeError::ModelNotFound(format!(
        "no model directory for '{}'",
        model_id
    )))
}

impl BertExtractor {
    /// Load config, tokenizer and weights from `dir`.
    pub fn load(dir: &Path) -> Result<Self, StyleScopeError> {
        for file in [CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_FILE] {
            if !dir.join(file).is_file() {
                return Err(StyleScopeError::ModelNotFound(format!(
                    "{} is missing {}",
                    dir.display(),
                    file
                )));
            }
        }

        let raw = std::fs::read_to_string(dir.join(CONFIG_FILE))
            .map_err(|e| StyleScopeError::ModelLoad(format!("reading {}: {}", CONFIG_FILE, e)))?;
        let config: BertConfig = serde_json::from_str(&raw)
            .map_err(|e| StyleScopeError::ModelLoad(format!("parsing {}: {}", CONFIG_FILE, e)))?;
        if config.num_attention_heads == 0 || config.hidden_size % config.num_attention_heads != 0 {
            return Err(StyleScopeError::ModelLoad(format!(
                "hidden_size {} is not divisible by {} heads",
                config.hidden_size, config.num_attention_heads
            )));
        }

        let tokenizer = Tokenizer::from_file(dir.join(TOKENIZER_FILE))
            .map_err(|e| StyleScopeError::ModelLoad(format!("loading tokenizer: {}", e)))?;

        let device = Device::Cpu;
        let weights = dir.join(WEIGHTS_FILE);
        // SAFETY: the weights file is opened read-only and not modified while mapped.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, &device) }
            .map_err(|e| StyleScopeError::ModelLoad(format!("mapping weights: {}", e)))?;
        // Task-head checkpoints nest the encoder under "bert.".
        let vb = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            vb.pp("bert")
        } else {
            vb
        };

        let load = |e: candle_core::Error| StyleScopeError::ModelLoad(format!("loading weights: {}", e));
        let emb = vb.pp("embeddings");
        let h = config.hidden_size;
        let word_embeddings = embedding(config.vocab_size, h, emb.pp("word_embeddings")).map_err(load)?;
        let position_embeddings =
            embedding(config.max_position_embeddings, h, emb.pp("position_embeddings")).map_err(load)?;
        let token_type_embeddings =
            embedding(config.type_vocab_size, h, emb.pp("token_type_embeddings")).map_err(load)?;
        let embedding_norm = layer_norm(h, config.layer_norm_eps, emb.pp("LayerNorm")).map_err(load)?;

        let layers = (0..config.num_hidden_layers)
            .map(|i| EncoderLayer::load(vb.pp("encoder").pp("layer").pp(i.to_string()), &config))
            .collect::<candle_core::Result<Vec<_>>>()
            .map_err(load)?;

        Ok(Self {
            config,
            tokenizer,
            device,
            word_embeddings,
            position_embeddings,
            token_type_embeddings,
            embedding_norm,
            layers,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.config.num_hidden_layers + 1, self.config.hidden_size)
    }

    /// Tokenize with the model's tokenizer (special tokens included), then
    /// window the ids.
    pub fn chunk(&self, text: &str, size: ChunkSize) -> Result<Vec<Chunk>, StyleScopeError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| StyleScopeError::Tokenization(e.to_string()))?;
        let ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        Ok(chunk_ids(&ids, size))
    }

    pub fn extract(&self, chunk: &Chunk) -> Result<LayerMatrix, StyleScopeError> {
        let seq = chunk.len();
        if seq == 0 {
            return Err(StyleScopeError::Validation("cannot extract an empty chunk".to_string()));
        }
        if seq > self.config.max_position_embeddings {
            return Err(StyleScopeError::Validation(format!(
                "chunk of {} tokens exceeds the model's {} positions",
                seq, self.config.max_position_embeddings
            )));
        }
        let ids = chunk
            .ids()
            .iter()
            .map(|&id| {
                u32::try_from(id)
                    .ok()
                    .filter(|&v| (v as usize) < self.config.vocab_size)
                    .ok_or_else(|| StyleScopeError::Inference(format!("token id {} out of vocabulary", id)))
            })
            .collect::<Result<Vec<u32>, _>>()?;

        let input_ids = Tensor::from_vec(ids, (1, seq), &self.device)?;
        let positions = Tensor::arange(0u32, seq as u32, &self.device)?.unsqueeze(0)?;
        let token_types = Tensor::zeros((1, seq), DType::U32, &self.device)?;

        let embedded = ((self.word_embeddings.forward(&input_ids)?
            + self.position_embeddings.forward(&positions)?)?
            + self.token_type_embeddings.forward(&token_types)?)?;
        let mut hidden = self.embedding_norm.forward(&embedded)?;

        let last = seq - 1;
        let mut rows = Vec::with_capacity(self.layers.len() + 1);
        rows.push(hidden.i((0, last))?.to_vec1::<f32>()?);
        for layer in &self.layers {
            hidden = layer.forward(&hidden, self.config.num_attention_heads)?;
            rows.push(hidden.i((0, last))?.to_vec1::<f32>()?);
        }

        LayerMatrix::from_rows(rows)
    }
}
