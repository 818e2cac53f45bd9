use crate::faq::{load_faqs, SourceError};
use crate::openai::Embedder;
use crate::pipeline::{Pipeline, FALLBACK_MESSAGE};
use crate::store::{FaqStore, COLLECTION_DIR, COLLECTION_FILE};
use crate::tests::{FakeEmbedder, FakeGenerator};

fn write_source(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("faqs.json");
    std::fs::write(&path, content).unwrap();
    path
}

fn embedder() -> FakeEmbedder {
    FakeEmbedder::new(
        &[
            ("How long does delivery take?", vec![1.0, 0.0]),
            ("Do you ship to Portugal?", vec![0.0, 1.0]),
        ],
        vec![-0.7, -0.7],
    )
}

/// The full offline-build then online-answer cycle: source json in,
/// grounded reply out of a freshly reopened store.
#[test]
fn source_to_reply_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write_source(
        &tmp,
        r#"[
            {"id": 1, "question": "How long does delivery take?", "answer": "Delivery to Lisbon takes 2-4 business days."},
            {"id": 2, "question": "Do you ship to Portugal?", "answer": "Yes, we ship to all of Portugal."}
        ]"#,
    );

    let records = load_faqs(&source).unwrap();
    let builder = embedder();
    let store = FaqStore::create(tmp.path(), builder.fingerprint()).unwrap();
    let count = store.rebuild(&records, &builder).unwrap();
    assert_eq!(count, 2);

    // Answer from a separate store handle, as the chat command would
    let reader = embedder();
    let store = FaqStore::open(tmp.path(), reader.fingerprint()).unwrap();
    assert_eq!(store.len(), 2);

    let pipeline = Pipeline::new(Box::new(reader), Box::new(FakeGenerator::new()), store, 0.3);
    let reply = pipeline.ask("How long does delivery take?").unwrap();
    assert!(reply.contains("2-4 business days"));
}

#[test]
fn duplicate_ids_fail_before_the_store_is_touched() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write_source(
        &tmp,
        r#"[
            {"id": 1, "question": "a", "answer": "b"},
            {"id": 1, "question": "c", "answer": "d"}
        ]"#,
    );

    let err = load_faqs(&source).unwrap_err();
    assert!(matches!(err, SourceError::DuplicateId(1)));

    // Validation failed at the loader, so no collection file appeared
    assert!(!tmp.path().join(COLLECTION_DIR).join(COLLECTION_FILE).exists());
}

#[test]
fn zero_record_source_builds_an_empty_store() {
    let tmp = tempfile::tempdir().unwrap();
    let source = write_source(&tmp, "[]");

    let records = load_faqs(&source).unwrap();
    let builder = embedder();
    let store = FaqStore::create(tmp.path(), builder.fingerprint()).unwrap();
    assert_eq!(store.rebuild(&records, &builder).unwrap(), 0);

    let reader = embedder();
    let store = FaqStore::open(tmp.path(), reader.fingerprint()).unwrap();
    assert!(store.is_empty());

    let pipeline = Pipeline::new(Box::new(reader), Box::new(FakeGenerator::new()), store, 0.3);
    assert_eq!(
        pipeline.ask("How long does delivery take?").unwrap(),
        FALLBACK_MESSAGE
    );
}

#[test]
fn rebuild_from_changed_source_replaces_the_collection() {
    let tmp = tempfile::tempdir().unwrap();

    let first = write_source(
        &tmp,
        r#"[{"id": 1, "question": "How long does delivery take?", "answer": "old answer"}]"#,
    );
    let builder = embedder();
    let store = FaqStore::create(tmp.path(), builder.fingerprint()).unwrap();
    store.rebuild(&load_faqs(&first).unwrap(), &builder).unwrap();

    let second = write_source(
        &tmp,
        r#"[
            {"id": 1, "question": "How long does delivery take?", "answer": "new answer"},
            {"id": 2, "question": "Do you ship to Portugal?", "answer": "Yes."}
        ]"#,
    );
    store.rebuild(&load_faqs(&second).unwrap(), &builder).unwrap();

    let reader = embedder();
    let reopened = FaqStore::open(tmp.path(), reader.fingerprint()).unwrap();
    assert_eq!(reopened.len(), 2);

    let results = reopened.query(&[1.0, 0.0], 1).unwrap();
    assert_eq!(results[0].entry.answer, "new answer");
}
