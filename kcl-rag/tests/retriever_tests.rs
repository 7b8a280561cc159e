//! Index build and retrieval tests against a deterministic embedding provider.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use kcl_rag::{
    Embedder, EmbeddingMatrix, EmbeddingProvider, FlatIndex, IndexArtifacts, IndexBuildOutcome,
    IndexBuilder, IndexPaths, QuestionRecord, RagError, Retriever,
};
use proptest::prelude::*;

/// Returns the vector of the first key contained in the text.
struct KeyedProvider {
    table: Vec<(String, Vec<f32>)>,
    calls: AtomicUsize,
}

impl KeyedProvider {
    fn new(table: Vec<(String, Vec<f32>)>) -> Arc<Self> {
        Arc::new(Self { table, calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for KeyedProvider {
    async fn embed_batch(&self, texts: &[&str]) -> kcl_rag::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        texts
            .iter()
            .map(|text| {
                self.table
                    .iter()
                    .find(|(key, _)| text.contains(key.as_str()))
                    .map(|(_, v)| v.clone())
                    .ok_or_else(|| RagError::EmbeddingError {
                        provider: "keyed".into(),
                        message: format!("no vector for {text:?}"),
                    })
            })
            .collect()
    }

    fn name(&self) -> &str {
        "keyed"
    }
}

fn record(question: &str) -> QuestionRecord {
    QuestionRecord {
        question: question.into(),
        a: "가".into(),
        b: "나".into(),
        c: "다".into(),
        d: "라".into(),
        answer: "1".into(),
    }
}

fn four_document_table() -> Vec<(String, Vec<f32>)> {
    vec![
        ("문서0".into(), vec![1.0, 0.0, 0.0, 0.0]),
        ("문서1".into(), vec![0.0, 1.0, 0.0, 0.0]),
        ("문서2".into(), vec![0.0, 0.0, 1.0, 0.0]),
        ("문서3".into(), vec![0.0, 0.0, 0.0, 1.0]),
        ("질의".into(), vec![0.1, 0.3, 0.9, 0.2]),
    ]
}

fn training_candidates(dir: &Path) -> [PathBuf; 2] {
    [dir.join("Criminal-Law-train.csv"), dir.join("train.csv")]
}

async fn build_four(dir: &Path, provider: Arc<KeyedProvider>) -> IndexPaths {
    let paths = IndexPaths::in_dir(dir);
    let records: Vec<QuestionRecord> =
        (0..4).map(|i| record(&format!("문서{i} 질문"))).collect();
    let outcome = IndexBuilder::new(Embedder::new(provider), paths.clone())
        .build_from_records(&records, Path::new("memory"))
        .await
        .unwrap();
    assert_eq!(outcome, IndexBuildOutcome::Built { documents: 4, dim: 4 });
    paths
}

#[tokio::test]
async fn nearest_document_comes_first() {
    let dir = tempfile::tempdir().unwrap();
    let provider = KeyedProvider::new(four_document_table());
    let paths = build_four(dir.path(), provider.clone()).await;

    let retriever = Retriever::new(Embedder::new(provider), paths);
    let hits = retriever.query("질의", 1).await.unwrap();

    assert_eq!(hits.len(), 1);
    assert!(hits[0].text.starts_with("질문: 문서2 질문\n"), "{}", hits[0].text);
}

#[tokio::test]
async fn top_k_is_clamped_to_corpus_size() {
    let dir = tempfile::tempdir().unwrap();
    let provider = KeyedProvider::new(four_document_table());
    let paths = build_four(dir.path(), provider.clone()).await;

    let retriever = Retriever::new(Embedder::new(provider), paths);
    let hits = retriever.query("질의", 50).await.unwrap();
    assert_eq!(hits.len(), 4);
    for pair in hits.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
}

#[tokio::test]
async fn zero_top_k_skips_embedding() {
    let dir = tempfile::tempdir().unwrap();
    let provider = KeyedProvider::new(four_document_table());
    let paths = build_four(dir.path(), provider.clone()).await;
    let calls_after_build = provider.calls();

    let retriever = Retriever::new(Embedder::new(provider.clone()), paths);
    assert!(retriever.query("질의", 0).await.unwrap().is_empty());
    assert_eq!(provider.calls(), calls_after_build);
}

#[tokio::test]
async fn in_memory_artifacts_need_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let provider = KeyedProvider::new(four_document_table());
    let rows: Vec<Vec<f32>> = four_document_table().into_iter().take(4).map(|(_, v)| v).collect();
    let embeddings = EmbeddingMatrix::from_rows(rows).unwrap();
    let artifacts = IndexArtifacts {
        texts: (0..4).map(|i| format!("문서{i}")).collect(),
        search: FlatIndex::fit(embeddings.clone(), 10),
        embeddings,
    };

    let retriever = Retriever::from_artifacts(
        Embedder::new(provider.clone()),
        IndexPaths::in_dir(dir.path()),
        artifacts,
    );
    let hits = retriever.query("질의", 2).await.unwrap();

    assert_eq!(hits[0].text, "문서2");
    assert_eq!(hits.len(), 2);
    assert_eq!(provider.calls(), 1);
    assert!(!IndexPaths::in_dir(dir.path()).texts.exists());
}

#[tokio::test]
async fn build_embeds_all_documents_in_one_call() {
    let dir = tempfile::tempdir().unwrap();
    let provider = KeyedProvider::new(four_document_table());
    build_four(dir.path(), provider.clone()).await;
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn missing_index_is_reported_and_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let provider = KeyedProvider::new(four_document_table());
    let retriever =
        Retriever::new(Embedder::new(provider.clone()), IndexPaths::in_dir(dir.path()));

    let err = retriever.query("질의", 1).await.unwrap_err();
    assert!(matches!(err, RagError::MissingIndex { .. }));
    assert!(err.to_string().contains("kcl index"));

    build_four(dir.path(), provider).await;
    assert_eq!(retriever.query("질의", 2).await.unwrap().len(), 2);
}

#[tokio::test]
async fn cached_index_survives_file_removal() {
    let dir = tempfile::tempdir().unwrap();
    let provider = KeyedProvider::new(four_document_table());
    let paths = build_four(dir.path(), provider.clone()).await;

    let retriever = Retriever::new(Embedder::new(provider), paths.clone());
    assert_eq!(retriever.document_count().await.unwrap(), 4);

    std::fs::remove_file(&paths.texts).unwrap();
    assert_eq!(retriever.query("질의", 1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_training_file_is_reported_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let provider = KeyedProvider::new(four_document_table());
    let builder =
        IndexBuilder::new(Embedder::new(provider.clone()), IndexPaths::in_dir(dir.path()));

    let outcome = builder
        .build_from_files(&training_candidates(dir.path()))
        .await
        .unwrap();
    assert!(matches!(outcome, IndexBuildOutcome::NoTrainingData { .. }));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn falls_back_to_second_training_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("train.csv"),
        "question,A,B,C,D,answer\n문서0 질문,가,나,다,라,1\n문서1 질문,가,나,다,라,B\n",
    )
    .unwrap();
    let provider = KeyedProvider::new(four_document_table());
    let builder =
        IndexBuilder::new(Embedder::new(provider), IndexPaths::in_dir(dir.path().join("out")));

    let outcome = builder
        .build_from_files(&training_candidates(dir.path()))
        .await
        .unwrap();
    assert_eq!(outcome, IndexBuildOutcome::Built { documents: 2, dim: 4 });
    assert!(builder.paths().search.exists());
}

/// Embeds by hashing characters into a small vector, so any text has a vector.
struct HashingProvider;

#[async_trait]
impl EmbeddingProvider for HashingProvider {
    async fn embed_batch(&self, texts: &[&str]) -> kcl_rag::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut v = vec![0.0f32; 8];
                for (i, c) in text.chars().enumerate() {
                    v[(c as usize + i) % 8] += 1.0;
                }
                v
            })
            .collect())
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn results_are_sorted_and_bounded(
        questions in proptest::collection::vec("[a-z가-힣 ]{1,20}", 1..12),
        query in "[a-z가-힣 ]{1,20}",
        top_k in 0usize..16,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (hits, corpus) = rt.block_on(async {
            let dir = tempfile::tempdir().unwrap();
            let embedder = Embedder::new(Arc::new(HashingProvider));
            let paths = IndexPaths::in_dir(dir.path());
            let records: Vec<QuestionRecord> = questions.iter().map(|q| record(q)).collect();
            IndexBuilder::new(embedder.clone(), paths.clone())
                .build_from_records(&records, Path::new("memory"))
                .await
                .unwrap();
            let hits = Retriever::new(embedder, paths).query(&query, top_k).await.unwrap();
            (hits, records.len())
        });

        prop_assert_eq!(hits.len(), top_k.min(corpus));
        for pair in hits.windows(2) {
            prop_assert!(pair[0].distance <= pair[1].distance);
        }
    }
}
