//! Raw text example loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One input unit: a single field of raw text.
///
/// Examples are immutable once loaded. Any other fields present in the source
/// JSON are ignored; only `text` is consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Raw text to tokenize and train on
    pub text: String,
}

/// Load examples from a dataset file.
///
/// Two layouts are accepted:
/// - a `.json` file containing an array of objects with a `text` field
/// - a `.jsonl` file with one such object per line (blank lines are skipped)
///
/// Empty `text` fields are kept: downstream tokenization turns them into
/// all-pad sequences, and that behavior is part of the pipeline contract.
///
/// # Errors
/// Fails fast on a missing file or malformed JSON; the error carries the file
/// path and, for JSONL, the offending line number.
pub fn load_examples<P: AsRef<Path>>(path: P) -> Result<Vec<Example>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset file: {}", path.display()))?;

    if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        parse_jsonl(&content, path)
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse dataset file: {}", path.display()))
    }
}

fn parse_jsonl(content: &str, path: &Path) -> Result<Vec<Example>> {
    let mut examples = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let example: Example = serde_json::from_str(line).with_context(|| {
            format!(
                "Failed to parse example at line {} in {}",
                line_num + 1,
                path.display()
            )
        })?;
        examples.push(example);
    }
    Ok(examples)
}
