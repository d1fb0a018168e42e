// ============================================================
// Layer 4 — Tokenisation Stage
// ============================================================
// Owns the tokenizer for the duration of a run and turns
// labelled examples into TokenizedIssue samples.
//
// The tokenizer is constructed once by the application layer
// and handed in here; nothing reaches for a global instance.
// Truncation to `max_seq_len` is configured on construction so
// every encoding fits the model's position table.

use anyhow::Result;
use tokenizers::{Tokenizer, TruncationParams};

use crate::data::dataset::TokenizedIssue;
use crate::domain::issue::LabeledExample;

pub struct IssueTokenizer {
    inner:       Tokenizer,
    pad_id:      u32,
    vocab_size:  usize,
}

impl IssueTokenizer {
    /// Take ownership of `tokenizer` and enable truncation at `max_seq_len`.
    ///
    /// Fails if no pad id can be found: the collator masks every token equal
    /// to the pad id, so guessing one would hide real tokens from attention.
    pub fn new(mut tokenizer: Tokenizer, max_seq_len: usize) -> Result<Self> {
        // Read before padding is switched off below
        let pad_id = tokenizer
            .get_padding()
            .map(|p| p.pad_id)
            .or_else(|| tokenizer.token_to_id("[PAD]"))
            .or_else(|| tokenizer.token_to_id("<pad>"))
            .ok_or_else(|| {
                anyhow::anyhow!("Tokenizer defines no padding token ([PAD] or <pad>)")
            })?;

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_seq_len,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Cannot enable truncation: {e}"))?;
        // Padding is done per batch by the collator
        tokenizer.with_padding(None);

        // Ids need not be dense in every vocabulary; size the embedding
        // table by the largest id instead of the entry count.
        let vocab_size = tokenizer
            .get_vocab(true)
            .values()
            .max()
            .map_or(0, |&max_id| max_id as usize + 1);

        tracing::debug!(
            "Tokenizer ready: vocab_size={}, pad_id={}, max_seq_len={}",
            vocab_size,
            pad_id,
            max_seq_len
        );

        Ok(Self { inner: tokenizer, pad_id, vocab_size })
    }

    pub fn pad_id(&self) -> u32 {
        self.pad_id
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Encode the `text` column of every example in one batch.
    pub fn tokenize(&self, examples: &[LabeledExample]) -> Result<Vec<TokenizedIssue>> {
        let texts: Vec<&str> = examples.iter().map(|e| e.text.as_str()).collect();
        let encodings = self
            .inner
            .encode_batch(texts, true)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;

        Ok(examples
            .iter()
            .zip(encodings)
            .map(|(example, enc)| TokenizedIssue {
                id:             example.id,
                label:          example.label,
                input_ids:      enc.get_ids().to_vec(),
                attention_mask: enc.get_attention_mask().to_vec(),
            })
            .collect())
    }
}

/// Build a small word-level tokenizer in `dir` for tests.
#[cfg(test)]
pub(crate) fn test_tokenizer(dir: &std::path::Path, texts: &[&str], max_seq_len: usize) -> IssueTokenizer {
    let store = crate::infra::tokenizer_store::TokenizerStore::new(dir.join("tokenizer.json"));
    IssueTokenizer::new(store.load_or_build(texts, 200).unwrap(), max_seq_len).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_keeps_ids_and_labels() {
        let dir = tempfile::tempdir().unwrap();
        let tok = test_tokenizer(dir.path(), &["disk full error", "ui freeze"], 16);

        let examples = vec![
            LabeledExample::new(7, "disk full error", 2),
            LabeledExample::new(9, "ui freeze", 0),
        ];
        let out = tok.tokenize(&examples).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!((out[0].id, out[0].label), (7, 2));
        assert_eq!((out[1].id, out[1].label), (9, 0));
        assert_eq!(out[0].input_ids.len(), 3);
        assert_eq!(out[0].attention_mask, vec![1, 1, 1]);
        assert_eq!(tok.pad_id(), 0);
    }

    #[test]
    fn test_long_text_is_truncated() {
        let dir  = tempfile::tempdir().unwrap();
        let text = "word ".repeat(50);
        let tok  = test_tokenizer(dir.path(), &[text.as_str()], 8);

        let out = tok.tokenize(&[LabeledExample::new(0, text.clone(), 0)]).unwrap();
        assert_eq!(out[0].input_ids.len(), 8);
    }

    /// Word-level tokenizer over `vocab` with no special tokens registered.
    fn word_level(vocab: serde_json::Value) -> Tokenizer {
        serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": null,
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": { "type": "WordLevel", "vocab": vocab, "unk_token": "[UNK]" }
        })
        .to_string()
        .parse()
        .unwrap()
    }

    #[test]
    fn test_tokenizer_without_pad_token_is_rejected() {
        let tok = word_level(serde_json::json!({ "hello": 0, "world": 1, "[UNK]": 2 }));
        assert!(IssueTokenizer::new(tok, 8).is_err());
    }

    #[test]
    fn test_angle_bracket_pad_token_is_found() {
        let tok = word_level(serde_json::json!({ "hello": 0, "<pad>": 1, "[UNK]": 2 }));
        assert_eq!(IssueTokenizer::new(tok, 8).unwrap().pad_id(), 1);
    }

    #[test]
    fn test_vocab_size_covers_largest_id() {
        let dir = tempfile::tempdir().unwrap();
        let tok = test_tokenizer(dir.path(), &["alpha beta gamma"], 8);
        // 5 specials + 3 words, ids 0..=7
        assert_eq!(tok.vocab_size(), 8);
    }
}
