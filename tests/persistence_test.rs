mod helpers;

use engram::{EngramError, MemoryStore};
use helpers::{sample_text, test_config, SpikeProvider};

fn open(dir: &std::path::Path) -> engram::Result<MemoryStore> {
    MemoryStore::with_provider(test_config(dir), Box::new(SpikeProvider::new(32)))
}

#[test]
fn reopened_store_serves_the_same_results() {
    let dir = tempfile::tempdir().unwrap();
    let body = "the body used for both the index and the query";
    {
        let store = open(dir.path()).unwrap();
        store.index_document("doc1", "Doc One", body).unwrap();
        store.record_visit("doc1").unwrap();
    }

    let store = open(dir.path()).unwrap();
    let stats = store.stats();
    assert_eq!(stats.chunks, 1);
    assert_eq!(stats.total_visits, 2);

    let hits = store.search(body, 5).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].url, "doc1");
    // exact-match similarity survives the reload
    assert!(hits[0].score > 0.75);
}

#[test]
fn fresh_directory_opens_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path()).unwrap();
    assert_eq!(store.stats().chunks, 0);
    assert!(store.search("anything", 5).unwrap().is_empty());
}

#[test]
fn malformed_ledger_line_fails_open() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = open(dir.path()).unwrap();
        store
            .index_document("doc1", "Doc One", &sample_text())
            .unwrap();
    }

    let ledger_path = dir.path().join("metadata.jsonl");
    let mut contents = std::fs::read_to_string(&ledger_path).unwrap();
    contents.push_str("{\"url\": truncated garbage\n");
    std::fs::write(&ledger_path, contents).unwrap();

    match open(dir.path()) {
        Err(EngramError::CorruptLedger { line, .. }) => assert_eq!(line, 4),
        other => panic!("expected CorruptLedger, got {other:?}"),
    }
}

#[test]
fn truncated_index_file_fails_open() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = open(dir.path()).unwrap();
        store
            .index_document("doc1", "Doc One", &sample_text())
            .unwrap();
    }

    let index_path = dir.path().join("index.bin");
    let bytes = std::fs::read(&index_path).unwrap();
    std::fs::write(&index_path, &bytes[..bytes.len() / 2]).unwrap();

    assert!(matches!(
        open(dir.path()),
        Err(EngramError::CorruptIndex { .. })
    ));
}

#[test]
fn index_ledger_length_divergence_fails_open() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = open(dir.path()).unwrap();
        store
            .index_document("doc1", "Doc One", &sample_text())
            .unwrap();
    }

    // drop one ledger line while leaving the vectors alone
    let ledger_path = dir.path().join("metadata.jsonl");
    let contents = std::fs::read_to_string(&ledger_path).unwrap();
    let kept: Vec<&str> = contents.lines().take(2).collect();
    std::fs::write(&ledger_path, format!("{}\n", kept.join("\n"))).unwrap();

    match open(dir.path()) {
        Err(EngramError::CorruptIndex { reason, .. }) => {
            assert!(reason.contains("3 rows"), "reason: {reason}");
            assert!(reason.contains("2 records"), "reason: {reason}");
        }
        other => panic!("expected CorruptIndex, got {other:?}"),
    }
}

#[test]
fn every_mutation_is_durable_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path()).unwrap();

    store
        .index_document("doc1", "Doc One", &sample_text())
        .unwrap();
    // a second handle on the same directory sees the write at once
    let other = open(dir.path()).unwrap();
    assert_eq!(other.stats().chunks, 3);

    store.record_visit("doc1").unwrap();
    let third = open(dir.path()).unwrap();
    assert_eq!(third.stats().total_visits, 6);
}
