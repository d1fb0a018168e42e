// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Locates the tokenizer used for a run.
//
// Normal case: a pretrained HuggingFace `tokenizer.json`
// (e.g. bert-base-uncased) sits at the configured path and is
// loaded as-is.
//
// Offline fallback: when that file is missing, a word-level
// vocabulary is built from the *training partition* and written
// in HuggingFace format, so later runs (and `evaluate`) load the
// exact same vocabulary.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokenizers::Tokenizer;

/// Special tokens of the built vocabulary, in id order.
const SPECIAL_TOKENS: [&str; 5] = ["[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]"];

pub struct TokenizerStore {
    path: PathBuf,
}

impl TokenizerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the tokenizer if present, otherwise build one from `texts`.
    pub fn load_or_build(&self, texts: &[&str], vocab_size: usize) -> Result<Tokenizer> {
        if self.exists() {
            tracing::info!("Loading tokenizer from '{}'", self.path.display());
            self.load()
        } else {
            tracing::warn!(
                "No tokenizer at '{}'; building a word-level vocabulary (vocab_size={})",
                self.path.display(),
                vocab_size
            );
            self.build_and_save(texts, vocab_size)
        }
    }

    pub fn load(&self) -> Result<Tokenizer> {
        Tokenizer::from_file(&self.path).map_err(|e| {
            anyhow::anyhow!("Cannot load tokenizer from '{}': {}", self.path.display(), e)
        })
    }

    /// Build a word-level vocabulary and write it as a HuggingFace
    /// tokenizer JSON, then load it back.
    fn build_and_save(&self, texts: &[&str], vocab_size: usize) -> Result<Tokenizer> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        // ── Step 1: Word frequencies ──────────────────────────────────────────
        // Split the same way the Whitespace pre-tokenizer does, lowercased
        // to match the BertNormalizer below.
        let mut freq: HashMap<String, usize> = HashMap::new();
        for text in texts {
            for word in text
                .split(|c: char| !(c.is_alphanumeric() || c == '_'))
                .filter(|w| !w.is_empty())
            {
                *freq.entry(word.to_lowercase()).or_insert(0) += 1;
            }
        }

        // Most frequent first; ties alphabetically so the build is reproducible
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(vocab_size.saturating_sub(SPECIAL_TOKENS.len()));

        // ── Step 2: Contiguous ids, specials first ────────────────────────────
        let mut vocab = serde_json::Map::new();
        for (id, token) in SPECIAL_TOKENS.iter().enumerate() {
            vocab.insert(token.to_string(), serde_json::json!(id));
        }
        for (word, _) in &words {
            let next_id = vocab.len();
            vocab.entry(word.clone()).or_insert(serde_json::json!(next_id));
        }

        let added_tokens: Vec<serde_json::Value> = SPECIAL_TOKENS
            .iter()
            .enumerate()
            .map(|(id, token)| {
                serde_json::json!({
                    "id": id, "content": token, "single_word": false,
                    "lstrip": false, "rstrip": false, "normalized": false, "special": true
                })
            })
            .collect();

        // ── Step 3: HuggingFace tokenizer JSON ────────────────────────────────
        let vocab_len      = vocab.len();
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": added_tokens,
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": true,
                "strip_accents": null,
                "lowercase": true
            },
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        });

        std::fs::write(&self.path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| format!("Cannot write tokenizer to '{}'", self.path.display()))?;

        tracing::info!(
            "Tokenizer built with {} entries, saved to '{}'",
            vocab_len,
            self.path.display()
        );

        self.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_then_reload() {
        let dir   = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(dir.path().join("tok").join("tokenizer.json"));
        assert!(!store.exists());

        let texts = ["Login fails on Safari", "login button missing", "Crash on login"];
        let tok   = store.load_or_build(&texts, 100).unwrap();
        assert!(store.exists());

        // "login" is the most frequent word → first id after the specials
        assert_eq!(tok.token_to_id("login"), Some(SPECIAL_TOKENS.len() as u32));
        assert_eq!(tok.token_to_id("[PAD]"), Some(0));

        let enc = tok.encode("LOGIN unknownword", false).unwrap();
        assert_eq!(enc.get_ids(), &[SPECIAL_TOKENS.len() as u32, 1]);

        // Second call loads the saved file instead of rebuilding
        let again = store.load_or_build(&["something else entirely"], 100).unwrap();
        assert_eq!(again.token_to_id("login"), tok.token_to_id("login"));
    }

    #[test]
    fn test_vocab_size_is_respected() {
        let dir   = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(dir.path().join("tokenizer.json"));
        let tok   = store.load_or_build(&["a b c d e f g h"], 8).unwrap();
        assert_eq!(tok.get_vocab_size(false), 8);
    }

    #[test]
    fn test_missing_tokenizer_load_fails() {
        let store = TokenizerStore::new("/no/such/tokenizer.json");
        assert!(store.load().is_err());
    }
}
