use std::path::Path;

use anyhow::Result;
use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        transformer::{PositionWiseFeedForward, PositionWiseFeedForwardConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    record::CompactRecorder,
};

/// Architecture of the issue classifier. Saved as model_config.json so
/// evaluation rebuilds an identical module before loading weights.
#[derive(Config, Debug)]
pub struct IssueClassifierConfig {
    pub vocab_size:  usize,
    /// Size of the learned position table; longer inputs must be truncated
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    pub num_classes: usize,
    pub dropout:     f64,
}

impl IssueClassifierConfig {
    /// Encoder plus a freshly initialised classification head.
    pub fn init<B: Backend>(&self, device: &B::Device) -> IssueClassifier<B> {
        IssueClassifier {
            encoder: self.init_encoder(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            head:    LinearConfig::new(self.d_model, self.num_classes).init(device),
        }
    }

    pub fn init_encoder<B: Backend>(&self, device: &B::Device) -> TextEncoder<B> {
        TextEncoder {
            tokens:    EmbeddingConfig::new(self.vocab_size, self.d_model).init(device),
            positions: EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device),
            blocks:    (0..self.num_layers).map(|_| self.init_block(device)).collect(),
            norm:      LayerNormConfig::new(self.d_model).init(device),
            dropout:   DropoutConfig::new(self.dropout).init(),
        }
    }

    fn init_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        EncoderBlock {
            attention: MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
                .with_dropout(self.dropout)
                .init(device),
            attention_norm: LayerNormConfig::new(self.d_model).init(device),
            feed_forward: PositionWiseFeedForwardConfig::new(self.d_model, self.d_ff)
                .with_dropout(self.dropout)
                .init(device),
            feed_forward_norm: LayerNormConfig::new(self.d_model).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

/// Post-norm encoder layer: masked self-attention, then a GELU
/// feed-forward, each wrapped in a residual connection.
#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    attention:         MultiHeadAttention<B>,
    attention_norm:    LayerNorm<B>,
    feed_forward:      PositionWiseFeedForward<B>,
    feed_forward_norm: LayerNorm<B>,
    dropout:           Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    pub fn forward(&self, hidden: Tensor<B, 3>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attended = self
            .attention
            .forward(MhaInput::self_attn(hidden.clone()).mask_pad(mask_pad))
            .context;
        let hidden = self
            .attention_norm
            .forward(hidden + self.dropout.forward(attended));

        let projected = self.feed_forward.forward(hidden.clone());
        self.feed_forward_norm
            .forward(hidden + self.dropout.forward(projected))
    }
}

/// The transformer body. Saved and loaded on its own so a pretrained
/// body can be reused under a new classification head.
#[derive(Module, Debug)]
pub struct TextEncoder<B: Backend> {
    tokens:    Embedding<B>,
    positions: Embedding<B>,
    blocks:    Vec<EncoderBlock<B>>,
    norm:      LayerNorm<B>,
    dropout:   Dropout,
}

impl<B: Backend> TextEncoder<B> {
    /// input_ids, mask_pad: [batch, seq_len] → hidden states [batch, seq_len, d_model]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let [batch_size, seq_len] = input_ids.dims();
        let device = input_ids.device();

        let position_ids = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .reshape([1, seq_len])
            .repeat_dim(0, batch_size);
        let embedded = self.tokens.forward(input_ids) + self.positions.forward(position_ids);

        let hidden = self
            .blocks
            .iter()
            .fold(self.dropout.forward(embedded), |hidden, block| {
                block.forward(hidden, mask_pad.clone())
            });
        self.norm.forward(hidden)
    }
}

#[derive(Module, Debug)]
pub struct IssueClassifier<B: Backend> {
    pub encoder: TextEncoder<B>,
    pub dropout: Dropout,
    pub head:    Linear<B>,
}

impl<B: Backend> IssueClassifier<B> {
    /// input_ids, mask_pad: [batch, seq_len] → logits [batch, num_classes]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 2> {
        let [batch_size, seq_len] = input_ids.dims();
        let hidden = self.encoder.forward(input_ids, mask_pad.clone());
        let [_, _, d_model] = hidden.dims();

        // Mean over real tokens only
        let keep   = mask_pad.bool_not().float().reshape([batch_size, seq_len, 1]);
        let summed = (hidden * keep.clone()).sum_dim(1).reshape([batch_size, d_model]);
        let counts = keep.sum_dim(1).reshape([batch_size, 1]).clamp_min(1.0);
        let pooled = summed / counts;

        self.head.forward(self.dropout.forward(pooled))
    }

    pub fn num_classes(&self) -> usize {
        self.head.weight.dims()[1]
    }

    /// Replace the encoder weights with a pretrained record, keeping the head.
    pub fn with_pretrained_encoder(mut self, path: &Path, device: &B::Device) -> Result<Self> {
        self.encoder = self
            .encoder
            .load_file(path.to_path_buf(), &CompactRecorder::new(), device)
            .map_err(|e| {
                anyhow::anyhow!("Cannot load pretrained encoder from '{}': {e:?}", path.display())
            })?;
        tracing::info!("Encoder initialised from '{}'", path.display());
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tiny_config() -> IssueClassifierConfig {
        IssueClassifierConfig::new(20, 8, 16, 2, 1, 32, 4, 0.0)
    }

    #[test]
    fn test_logits_shape() {
        let device = Default::default();
        let model: IssueClassifier<TestBackend> = tiny_config().init(&device);

        let ids  = Tensor::<TestBackend, 2, Int>::from_ints([[5, 6, 7], [8, 0, 0]], &device);
        let mask = ids.clone().equal_elem(0);
        let logits = model.forward(ids, mask);

        assert_eq!(logits.dims(), [2, 4]);
        assert_eq!(model.num_classes(), 4);
    }

    #[test]
    fn test_padding_does_not_change_logits() {
        let device = Default::default();
        let model: IssueClassifier<TestBackend> = tiny_config().init(&device);

        let short = Tensor::<TestBackend, 2, Int>::from_ints([[5, 6]], &device);
        let padded = Tensor::<TestBackend, 2, Int>::from_ints([[5, 6, 0, 0]], &device);

        let a = model.forward(short.clone(), short.equal_elem(0));
        let b = model.forward(padded.clone(), padded.equal_elem(0));

        let a: Vec<f32> = a.into_data().to_vec().unwrap();
        let b: Vec<f32> = b.into_data().to_vec().unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-4, "{x} vs {y}");
        }
    }

    #[test]
    fn test_pretrained_encoder_is_loaded() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let path   = dir.path().join("encoder");

        let source: IssueClassifier<TestBackend> = tiny_config().init(&device);
        source
            .encoder
            .clone()
            .save_file(path.clone(), &CompactRecorder::new())
            .unwrap();

        // Two differently initialised models end up with the same encoder
        let a = tiny_config().init::<TestBackend>(&device).with_pretrained_encoder(&path, &device).unwrap();
        let b = tiny_config().init::<TestBackend>(&device).with_pretrained_encoder(&path, &device).unwrap();

        let ids  = Tensor::<TestBackend, 2, Int>::from_ints([[3, 4, 5]], &device);
        let mask = ids.clone().equal_elem(0);
        let ha: Vec<f32> = a.encoder.forward(ids.clone(), mask.clone()).into_data().to_vec().unwrap();
        let hb: Vec<f32> = b.encoder.forward(ids, mask).into_data().to_vec().unwrap();
        assert_eq!(ha, hb);
    }

    #[test]
    fn test_missing_pretrained_encoder_is_an_error() {
        let device = Default::default();
        let model  = tiny_config().init::<TestBackend>(&device);
        assert!(model.with_pretrained_encoder(Path::new("/no/such/encoder"), &device).is_err());
    }
}
