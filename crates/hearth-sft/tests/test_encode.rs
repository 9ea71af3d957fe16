//! Integration tests for dataset preparation

use hearth_sft::config::TrainingConfigFile;
use hearth_sft::encode::{prepare_dataset, tokenize_partition};
use hearth_data::Example;
use hearth_tokenizer::{Tokenizer, EOS_TOKEN};
use tempfile::TempDir;

fn create_test_tokenizer() -> Option<Tokenizer> {
    let mut corpus: Vec<&str> = vec![
        "turn on the lights",
        "turn off the lights",
        "set the thermostat to twenty one",
        "lock the front door",
        "abcdefghijklmnopqrstuvwxyz",
    ];
    for _ in 0..50 {
        corpus.push(EOS_TOKEN);
    }

    match Tokenizer::train_from_iterator(corpus.iter(), 800) {
        Ok(tokenizer) => Some(tokenizer),
        Err(_) => {
            eprintln!("Skipping test: eos token not preserved in trained vocabulary");
            None
        }
    }
}

#[test]
fn test_tokenize_partition_preserves_order_and_length() {
    let Some(tokenizer) = create_test_tokenizer() else {
        return;
    };

    let examples = vec![
        Example { text: "turn on the lights".to_string() },
        Example { text: String::new() },
        Example { text: "lock the front door".to_string() },
    ];

    let rows = tokenize_partition(&tokenizer, &examples, 32).expect("Tokenization should succeed");
    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert_eq!(row.len(), 32);
    }
    // Empty text becomes a full-length pad row, in place
    assert_eq!(rows[1], vec![tokenizer.pad_id(); 32]);
}

#[test]
fn test_prepare_dataset_splits_and_tokenizes() {
    let Some(tokenizer) = create_test_tokenizer() else {
        return;
    };

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let dataset_path = temp_dir.path().join("examples.json");
    // Suffixes stay within the tokenizer's trained alphabet
    let examples: Vec<String> = (0..20)
        .map(|i| format!(r#"{{"text": "turn on the lights {}"}}"#, "a".repeat(i + 1)))
        .collect();
    std::fs::write(&dataset_path, format!("[{}]", examples.join(",")))
        .expect("Failed to write dataset");

    let mut data = TrainingConfigFile::default().data;
    data.dataset_path = dataset_path;

    let (train_rows, eval_rows) =
        prepare_dataset(&tokenizer, &data, 16).expect("Preparation should succeed");

    // Default 0.1 fraction: 18 train, 2 eval
    assert_eq!(train_rows.len(), 18);
    assert_eq!(eval_rows.len(), 2);
    for row in train_rows.iter().chain(eval_rows.iter()) {
        assert_eq!(row.len(), 16);
    }
}

#[test]
fn test_prepare_dataset_missing_file() {
    let Some(tokenizer) = create_test_tokenizer() else {
        return;
    };

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let mut data = TrainingConfigFile::default().data;
    data.dataset_path = temp_dir.path().join("nope.json");

    assert!(prepare_dataset(&tokenizer, &data, 16).is_err());
}
