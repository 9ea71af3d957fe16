//! Tokenization for hearth fine-tuning
//!
//! Wraps `aprender::text::tokenize::BpeTokenizer` with the conventions the
//! training pipeline relies on:
//! - an end-of-sequence token that doubles as the padding token
//! - fixed-length encoding (truncate or right-pad to the context length)
//! - `tokenizer.json` persistence (vocabulary + merge rules)
//!
//! # Example
//!
//! ```no_run
//! use hearth_tokenizer::Tokenizer;
//!
//! # fn main() -> anyhow::Result<()> {
//! let tokenizer = Tokenizer::from_directory("./models/base")?;
//! let ids = tokenizer.encode_fixed("turn on the lights", 512)?;
//! assert_eq!(ids.len(), 512);
//! # Ok(())
//! # }
//! ```

pub use aprender::text::tokenize::BpeTokenizer;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// End-of-sequence marker expected in the vocabulary.
///
/// The padding identifier is an alias for this token: padded positions and a
/// genuine end of sequence are indistinguishable in encoded output. The batch
/// collator compensates by stripping the attention mask (which would
/// otherwise mask real eos tokens along with padding).
pub const EOS_TOKEN: &str = "<|endoftext|>";

/// Serialized tokenizer payload: vocabulary and merge rules only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerData {
    /// Token to ID mapping
    pub vocabulary: std::collections::HashMap<String, u32>,
    /// BPE merge rules
    pub merges: Vec<(String, String)>,
}

/// Tokenizer interface used by the fine-tuning pipeline.
///
/// Uses `aprender::text::tokenize::BpeTokenizer` internally; this type adds
/// the eos/pad resolution and fixed-length encoding the pipeline needs.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    bpe: BpeTokenizer,
    eos_id: u32,
}

impl Tokenizer {
    /// Wrap an existing BPE tokenizer, resolving the eos token id.
    ///
    /// # Errors
    /// Fails if the vocabulary does not contain [`EOS_TOKEN`].
    pub fn new(bpe: BpeTokenizer) -> Result<Self> {
        let eos_id = bpe
            .token_to_id(EOS_TOKEN)
            .with_context(|| format!("Vocabulary is missing the eos token {:?}", EOS_TOKEN))?;
        Ok(Self { bpe, eos_id })
    }

    /// Train a new tokenizer from an iterator of text.
    ///
    /// The corpus must surface [`EOS_TOKEN`] as a whole vocabulary entry,
    /// otherwise construction fails. Intended for tests and small local
    /// vocabularies; production runs load a pretrained tokenizer with
    /// [`Tokenizer::from_directory`].
    pub fn train_from_iterator<I, S>(text_iterator: I, vocab_size: usize) -> Result<Self>
    where
        I: Iterator<Item = S>,
        S: AsRef<str>,
    {
        let corpus_owned: Vec<String> = text_iterator.map(|s| s.as_ref().to_string()).collect();
        let corpus: Vec<&str> = corpus_owned.iter().map(|s| s.as_str()).collect();

        let bpe = BpeTokenizer::train(&corpus, vocab_size)
            .map_err(|e| anyhow::anyhow!("Failed to train BPE tokenizer: {}", e))?;

        Self::new(bpe)
    }

    /// Load a tokenizer from a directory containing `tokenizer.json`
    pub fn from_directory<P: AsRef<Path>>(path: P) -> Result<Self> {
        use std::fs;

        let path = path.as_ref();
        let tokenizer_file = path.join("tokenizer.json");

        if !tokenizer_file.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_file.display());
        }

        let content = fs::read_to_string(&tokenizer_file).with_context(|| {
            format!(
                "Failed to read tokenizer file: {}",
                tokenizer_file.display()
            )
        })?;

        let data: TokenizerData =
            serde_json::from_str(&content).context("Failed to parse tokenizer JSON")?;

        let bpe = BpeTokenizer::from_vocab(data.vocabulary, data.merges);
        Self::new(bpe)
    }

    /// Save the tokenizer to a directory as `tokenizer.json`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        use std::fs;

        let path = path.as_ref();
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;

        let data = TokenizerData {
            vocabulary: self.bpe.vocab().clone(),
            merges: self.bpe.merges().to_vec(),
        };

        let content = serde_json::to_string(&data).context("Failed to serialize tokenizer")?;
        let tokenizer_file = path.join("tokenizer.json");
        fs::write(&tokenizer_file, content).with_context(|| {
            format!(
                "Failed to write tokenizer file: {}",
                tokenizer_file.display()
            )
        })?;

        Ok(())
    }

    /// Encode text to token IDs
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        self.bpe
            .encode(text)
            .map_err(|e| anyhow::anyhow!("Encoding failed: {}", e))
    }

    /// Encode text to exactly `context_length` token IDs.
    ///
    /// Longer sequences are truncated, shorter sequences are right-padded
    /// with [`Tokenizer::pad_id`]. Empty text yields an all-pad sequence of
    /// full length. Only the ids are produced; no attention mask exists at
    /// this layer.
    pub fn encode_fixed(&self, text: &str, context_length: usize) -> Result<Vec<u32>> {
        let mut ids = self.encode(text)?;
        ids.truncate(context_length);
        ids.resize(context_length, self.pad_id());
        Ok(ids)
    }

    /// Decode token IDs to text
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.bpe
            .decode(ids)
            .map_err(|e| anyhow::anyhow!("Decoding failed: {}", e))
    }

    /// The end-of-sequence token id
    pub fn eos_id(&self) -> u32 {
        self.eos_id
    }

    /// The padding token id, aliased to the eos id
    pub fn pad_id(&self) -> u32 {
        self.eos_id
    }

    /// Look up the id of a token, if present
    pub fn token_to_id(&self, token: &str) -> Option<u32> {
        self.bpe.token_to_id(token)
    }

    /// Get vocabulary size
    pub fn vocab_size(&self) -> usize {
        self.bpe.vocab_size()
    }
}

/// Strip trailing pad/eos identifiers from an encoded sequence.
///
/// Inverse of the right-padding in [`Tokenizer::encode_fixed`]. A genuine
/// trailing eos is removed too; with pad aliased to eos the two cannot be
/// told apart.
pub fn strip_trailing_pad(ids: &[u32], pad_id: u32) -> &[u32] {
    let mut end = ids.len();
    while end > 0 && ids[end - 1] == pad_id {
        end -= 1;
    }
    &ids[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_trailing_pad() {
        assert_eq!(strip_trailing_pad(&[5, 6, 9, 9, 9], 9), &[5, 6]);
        assert_eq!(strip_trailing_pad(&[9, 5, 9], 9), &[9, 5]);
        assert_eq!(strip_trailing_pad(&[9, 9], 9), &[] as &[u32]);
        assert_eq!(strip_trailing_pad(&[], 9), &[] as &[u32]);
    }
}
