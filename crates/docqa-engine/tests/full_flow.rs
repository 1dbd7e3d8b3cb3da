use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use docqa_core::config::Settings;
use docqa_core::traits::Embedder;
use docqa_core::Error;
use docqa_embed::HashEmbedder;
use docqa_engine::{EngineOptions, EngineState, RetrievalEngine};
use docqa_vector::similarity::dot;

const TOPICS: [&str; 5] = ["apples", "rivers", "engines", "music", "stars"];

/// Axis per topic word plus a catch-all; records every call.
struct TopicEmbedder {
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl TopicEmbedder {
    fn new() -> Self { Self { calls: AtomicUsize::new(0), fail: AtomicBool::new(false) } }
}

fn topic_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0f32; TOPICS.len() + 1];
    for word in text.split_whitespace() {
        let word = word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
        match TOPICS.iter().position(|t| *t == word) {
            Some(i) => v[i] += 1.0,
            None => v[TOPICS.len()] += 0.05,
        }
    }
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    v.iter().map(|x| x / norm).collect()
}

impl Embedder for TopicEmbedder {
    fn dim(&self) -> usize { TOPICS.len() + 1 }
    fn max_len(&self) -> usize { 512 }
    fn encode(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) { anyhow::bail!("embedding service down"); }
        Ok(texts.iter().map(|t| topic_vector(t)).collect())
    }
}

fn engine_with(embedder: Arc<dyn Embedder>, chunk_size: usize) -> RetrievalEngine {
    RetrievalEngine::new(embedder, EngineOptions { chunk_size, ..EngineOptions::default() }).expect("engine")
}

/// Five 4-word chunks, each leaning on a different topic.
const FIVE_CHUNKS: &str = "apples grow on trees \
    rivers run to sea \
    engines burn fuel fast \
    music fills the hall \
    stars shine at night";

#[tokio::test]
async fn ask_on_empty_engine_is_no_index() {
    let engine = engine_with(Arc::new(TopicEmbedder::new()), 300);
    assert_eq!(engine.state(), EngineState::Empty);
    assert!(matches!(engine.ask("What is X?").await, Err(Error::NoIndex)));
    assert!(matches!(engine.ask("   ").await, Err(Error::NoIndex)), "index is checked before the question");
}

#[tokio::test]
async fn empty_document_is_empty_corpus() {
    let embedder = Arc::new(TopicEmbedder::new());
    let engine = engine_with(embedder.clone(), 300);
    assert!(matches!(engine.build_from_document("").await, Err(Error::EmptyCorpus)));
    assert!(matches!(engine.build_from_document(" \n\t ").await, Err(Error::EmptyCorpus)));
    assert_eq!(engine.state(), EngineState::Empty);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_question_is_empty_query() {
    let engine = engine_with(Arc::new(TopicEmbedder::new()), 4);
    engine.build_from_document(FIVE_CHUNKS).await.expect("build");
    assert!(matches!(engine.ask("").await, Err(Error::EmptyQuery)));
    assert!(matches!(engine.ask(" \n ").await, Err(Error::EmptyQuery)));
}

#[tokio::test]
async fn six_hundred_fifty_word_document_builds_three_chunks() {
    let engine = engine_with(Arc::new(HashEmbedder::new(64)), 300);
    let doc = (0..650).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
    let summary = engine.build_from_document(&doc).await.expect("build");
    assert_eq!(summary.chunks, 3);
    assert_eq!(summary.words, 650);
    assert_eq!(summary.generation, 1);
    assert_eq!(summary.dim, 64);
    let sizes: Vec<usize> = engine.index().snapshot().unwrap().chunks().iter().map(|c| c.word_count()).collect();
    assert_eq!(sizes, vec![300, 300, 50]);
}

#[tokio::test]
async fn streamed_answer_is_the_best_reranked_chunk() {
    let embedder = Arc::new(TopicEmbedder::new());
    let engine = engine_with(embedder.clone(), 4);
    let summary = engine.build_from_document(FIVE_CHUNKS).await.expect("build");
    assert_eq!(summary.chunks, 5);
    assert_eq!(engine.state(), EngineState::Indexed { generation: 1, chunks: 5 });

    let question = "What is known about rivers?";
    let answer = engine.ask(question).await.expect("ask");

    let q = topic_vector(question);
    let generation = engine.index().snapshot().unwrap();
    let expected = generation
        .chunks()
        .iter()
        .max_by(|a, b| dot(&q, &topic_vector(&a.text)).total_cmp(&dot(&q, &topic_vector(&b.text))))
        .expect("chunk");
    assert_eq!(answer.chunk_id, Some(expected.id));
    assert_eq!(answer.text, "rivers run to sea");
    assert!(!answer.is_fallback());

    let streamed: String = answer.stream().collect();
    assert_eq!(streamed.trim_end(), expected.text);
    let replayed: String = answer.stream().collect();
    assert_eq!(streamed, replayed, "each stream() call restarts from the first word");

    // build: one batch call; ask: one call for the question, none per candidate
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn repeated_asks_are_deterministic() {
    let engine = engine_with(Arc::new(HashEmbedder::new(4096)), 6);
    let doc = "Photosynthesis lets plants turn light into sugar. \
               The Danube flows through ten countries before the sea. \
               A diesel engine ignites fuel by compression alone. \
               Bach wrote hundreds of cantatas for church services.";
    engine.build_from_document(doc).await.expect("build");
    let first = engine.ask("How does a diesel engine ignite fuel?").await.expect("ask");
    let second = engine.ask("How does a diesel engine ignite fuel?").await.expect("ask");
    assert_eq!(first, second);
    assert!(first.text.contains("diesel") || first.text.contains("engine"), "{}", first.text);
}

#[tokio::test]
async fn rebuild_answers_from_the_new_document() {
    let engine = engine_with(Arc::new(TopicEmbedder::new()), 4);
    engine.build_from_document("apples grow on trees").await.expect("first");
    let summary = engine.build_from_document("stars shine at night music fills the hall").await.expect("second");
    assert_eq!(summary.generation, 2);
    let answer = engine.ask("stars").await.expect("ask");
    assert_eq!(answer.text, "stars shine at night");
    assert_eq!(answer.generation, 2);
}

#[tokio::test]
async fn failed_build_keeps_serving_previous_document() {
    let embedder = Arc::new(TopicEmbedder::new());
    let engine = engine_with(embedder.clone(), 4);
    engine.build_from_document(FIVE_CHUNKS).await.expect("build");

    embedder.fail.store(true, Ordering::SeqCst);
    let err = engine.build_from_document("apples apples apples apples").await.unwrap_err();
    assert!(matches!(err, Error::Embedding(_)));
    assert!(matches!(engine.ask("music").await, Err(Error::Embedding(_))), "ask surfaces embedder failures too");

    embedder.fail.store(false, Ordering::SeqCst);
    assert_eq!(engine.state(), EngineState::Indexed { generation: 1, chunks: 5 });
    let answer = engine.ask("music").await.expect("ask after recovery");
    assert_eq!(answer.text, "music fills the hall");
}

#[tokio::test]
async fn top_k_limits_the_candidate_pool() {
    let engine = RetrievalEngine::new(
        Arc::new(TopicEmbedder::new()),
        EngineOptions { chunk_size: 4, top_k: 1, ..EngineOptions::default() },
    )
    .expect("engine");
    assert_eq!(engine.top_k(), 1);
    engine.build_from_document(FIVE_CHUNKS).await.expect("build");
    let answer = engine.ask("engines").await.expect("ask");
    assert_eq!(answer.text, "engines burn fuel fast");
}

#[test]
fn invalid_options_are_rejected() {
    let zero_k = RetrievalEngine::new(Arc::new(HashEmbedder::new(8)), EngineOptions { top_k: 0, ..EngineOptions::default() });
    assert!(matches!(zero_k, Err(Error::InvalidConfig(_))));
    let zero_size = RetrievalEngine::new(Arc::new(HashEmbedder::new(8)), EngineOptions { chunk_size: 0, ..EngineOptions::default() });
    assert!(matches!(zero_size, Err(Error::InvalidConfig(_))));
}

#[test]
fn options_follow_settings() {
    let mut settings = Settings::default();
    settings.chunking.size = 120;
    settings.retrieval.top_k = 7;
    let engine = RetrievalEngine::from_settings(Arc::new(HashEmbedder::new(8)), &settings).expect("engine");
    assert_eq!((engine.chunk_size(), engine.top_k()), (120, 7));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn asks_during_rebuild_see_one_generation() {
    let engine = Arc::new(engine_with(Arc::new(TopicEmbedder::new()), 4));
    engine.build_from_document(FIVE_CHUNKS).await.expect("seed");
    let other = "stars stars stars stars rivers rivers rivers rivers";

    let writer = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            for round in 0..10 {
                let doc = if round % 2 == 0 { other } else { FIVE_CHUNKS };
                engine.build_from_document(doc).await.expect("rebuild");
            }
        })
    };
    let mut readers = Vec::new();
    for _ in 0..4 {
        let engine = Arc::clone(&engine);
        readers.push(tokio::spawn(async move {
            for _ in 0..25 {
                let answer = engine.ask("rivers").await.expect("ask");
                let odd = answer.generation % 2 == 1;
                let expected = if odd { "rivers run to sea" } else { "rivers rivers rivers rivers" };
                assert_eq!(answer.text, expected, "generation {}", answer.generation);
            }
        }));
    }
    writer.await.expect("writer");
    for reader in readers { reader.await.expect("reader"); }
}
