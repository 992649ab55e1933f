//! End-to-end tests for the recommendation engine over an in-memory store.

use std::sync::Arc;
use std::thread;

use chrono::TimeDelta;
use serde_json::{json, Value};

use recommender::config::Config;
use recommender::engine::{ManualClock, ModelStatus, RecommendationEngine};
use recommender::store::{JsonFileStore, MemoryStore, RawDocument};

fn doc(id: &str, value: Value) -> RawDocument {
    RawDocument::new(id, value.as_object().cloned().unwrap_or_default())
}

fn innovation(id: &str, description: &str, category: &str) -> RawDocument {
    doc(
        id,
        json!({
            "description": description,
            "category": category,
            "title": format!("Inovasi {id}"),
            "creatorName": "Tim Desa",
            "images": [format!("{id}.png")],
            "yearCreated": "2023"
        }),
    )
}

fn three_records() -> Vec<RawDocument> {
    vec![
        innovation("A", "Aplikasi kesehatan digital untuk masyarakat desa", "kesehatan"),
        innovation("B", "Aplikasi pemantauan kesehatan ibu hamil", "kesehatan"),
        innovation("C", "Mesin pertanian otomatis hemat energi", "pertanian"),
    ]
}

fn catalog() -> Vec<RawDocument> {
    vec![
        innovation("inv-01", "Aplikasi kesehatan digital untuk memantau gizi anak", "kesehatan"),
        innovation("inv-02", "Aplikasi pemantauan kesehatan ibu hamil di desa", "kesehatan"),
        innovation("inv-03", "Sistem informasi kesehatan puskesmas", "kesehatan"),
        innovation("inv-04", "Mesin pertanian otomatis untuk panen padi", "pertanian"),
        innovation("inv-05", "Alat penyiram tanaman otomatis tenaga surya", "pertanian"),
        innovation("inv-06", "Sensor kelembaban tanah untuk pertanian presisi", "pertanian"),
        innovation("inv-07", "Platform pembelajaran daring untuk siswa desa", "pendidikan"),
        innovation("inv-08", "Aplikasi pembelajaran bahasa daerah", "pendidikan"),
        innovation("inv-09", "Panel surya hemat energi untuk rumah desa", "energi"),
        innovation("inv-10", "Kompor biogas hemat energi dari limbah ternak", "energi"),
    ]
}

fn engine_with(
    docs: Vec<RawDocument>,
    config: Config,
) -> (RecommendationEngine, Arc<MemoryStore>, Arc<ManualClock>) {
    let store = Arc::new(MemoryStore::new(docs));
    let clock = Arc::new(ManualClock::default());
    let engine = RecommendationEngine::with_clock(config, store.clone(), clock.clone());
    (engine, store, clock)
}

fn engine(docs: Vec<RawDocument>) -> RecommendationEngine {
    engine_with(docs, Config::default()).0
}

// ---------------------------------------------------------------------------
// End-to-end scenario
// ---------------------------------------------------------------------------

#[test]
fn test_health_apps_rank_above_farm_machine() {
    let engine = engine(three_records());
    assert!(engine.initialize());

    let results = engine.recommend("A", 2, 0.0);
    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["B", "C"]);
    assert!(results[0].similarity_score > results[1].similarity_score);
    assert_eq!(results[1].similarity_score, 0.0);
}

#[test]
fn test_short_descriptions_rank_sibling_first() {
    let engine = engine(vec![
        innovation("A", "aplikasi kesehatan digital", "kesehatan"),
        innovation("B", "aplikasi kesehatan mobile", "kesehatan"),
        innovation("C", "mesin pertanian otomatis", "pertanian"),
    ]);
    assert!(engine.initialize());

    let results = engine.recommend("A", 2, 0.0);
    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["B", "C"]);
    assert!(results[0].similarity_score > results[1].similarity_score);
    assert_eq!(results[0].similarity_score, 1.0);

    // C shares no vocabulary term with A
    let results = engine.recommend("A", 2, 0.01);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "B");
}

#[test]
fn test_default_threshold_drops_unrelated_record() {
    let engine = engine(three_records());
    let results = engine.recommend("A", 2, 0.01);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "B");
    assert!(results[0].similarity_score >= 0.01);
}

#[test]
fn test_recommendation_fields_materialized() {
    let engine = engine(three_records());
    let results = engine.recommend_default("A");
    let b = &results[0];
    assert_eq!(b.title, "Inovasi B");
    assert_eq!(b.creator, "Tim Desa");
    assert_eq!(b.category, "kesehatan");
    assert_eq!(b.images, vec!["B.png"]);
    assert_eq!(b.year_created.as_deref(), Some("2023"));
    assert_eq!(b.similarity_score, (b.similarity_score * 10_000.0).round() / 10_000.0);
}

// ---------------------------------------------------------------------------
// Ranking properties
// ---------------------------------------------------------------------------

#[test]
fn test_recommend_excludes_self_and_is_sorted() {
    let engine = engine(catalog());
    for doc in catalog() {
        let results = engine.recommend(&doc.id, 20, 0.0);
        assert!(results.iter().all(|r| r.id != doc.id));
        for pair in results.windows(2) {
            assert!(pair[0].similarity_score >= pair[1].similarity_score);
        }
    }
}

#[test]
fn test_recommend_respects_top_n_and_threshold() {
    let engine = engine(catalog());
    assert!(engine.recommend("inv-01", 2, 0.0).len() <= 2);
    assert!(engine.recommend("inv-01", 0, 0.0).is_empty());

    let strict = engine.recommend("inv-01", 20, 0.2);
    assert!(strict.iter().all(|r| r.similarity_score >= 0.2));
}

#[test]
fn test_unknown_and_blank_ids() {
    let engine = engine(catalog());
    assert!(engine.recommend("does-not-exist", 5, 0.0).is_empty());
    assert!(engine.recommend("", 5, 0.0).is_empty());
    assert!(engine.recommend("   ", 5, 0.0).is_empty());
}

#[test]
fn test_duplicate_ids_resolve_to_first_row() {
    let mut docs = catalog();
    docs.push(innovation("inv-01", "Mesin pertanian otomatis", "pertanian"));
    let engine = engine(docs);

    let results = engine.recommend("inv-01", 20, 0.01);
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.id != "inv-01"));
    // the first inv-01 is a health app
    assert!(results[0].category == "kesehatan" || results[0].id == "inv-08");
}

#[test]
fn test_parallel_materialization_path() {
    let words = ["gizi", "anak", "ibu", "lansia", "posyandu"];
    let mut docs: Vec<RawDocument> = (0..15)
        .map(|i| {
            innovation(
                &format!("sehat-{i:02}"),
                &format!("Aplikasi kesehatan {}", words[i % words.len()]),
                "kesehatan",
            )
        })
        .collect();
    docs.extend((0..5).map(|i| {
        innovation(&format!("tani-{i}"), "Mesin pertanian otomatis", "pertanian")
    }));

    let engine = engine(docs);
    let results = engine.recommend("sehat-00", 20, 0.01);
    assert_eq!(results.len(), 14);
    assert!(results.iter().all(|r| r.id.starts_with("sehat-") && r.id != "sehat-00"));
    for pair in results.windows(2) {
        assert!(pair[0].similarity_score >= pair[1].similarity_score);
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[test]
fn test_search_before_initialization_is_empty() {
    let engine = engine(three_records());
    assert!(engine.search("aplikasi kesehatan", 10).is_empty());
    assert!(engine.snapshot().is_none());
}

#[test]
fn test_search_matches_related_records() {
    let engine = engine(three_records());
    engine.initialize();

    let results = engine.search("aplikasi kesehatan", 10);
    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"A") && ids.contains(&"B"));
    assert!(results.iter().all(|r| r.similarity_score > 0.01));
}

#[test]
fn test_search_empty_queries() {
    let engine = engine(catalog());
    engine.initialize();
    assert!(engine.search("", 10).is_empty());
    assert!(engine.search("   ", 10).is_empty());
    assert!(engine.search("dan yang 123 !!", 10).is_empty());
    assert!(engine.search("pesawat luar angkasa", 10).is_empty());
}

#[test]
fn test_search_respects_top_n() {
    let engine = engine(catalog());
    engine.initialize();
    let results = engine.search_default("aplikasi kesehatan desa otomatis energi");
    assert!(!results.is_empty());
    assert!(engine.search("aplikasi kesehatan desa", 1).len() <= 1);
    for pair in results.windows(2) {
        assert!(pair[0].similarity_score >= pair[1].similarity_score);
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_insufficient_data() {
    let engine = engine(vec![innovation(
        "solo",
        "Aplikasi kesehatan digital",
        "kesehatan",
    )]);
    assert!(!engine.initialize());
    assert!(engine.recommend("solo", 5, 0.0).is_empty());
    assert!(engine.search("aplikasi", 10).is_empty());

    let stats = engine.model_stats();
    assert_eq!(stats.status, ModelStatus::NotInitialized);
    assert_eq!(stats.total_records, 0);
    assert_eq!(stats.builds, 0);
    assert!(stats.matrix_shape.is_none());
}

#[test]
fn test_model_stats_after_build() {
    let engine = engine(three_records());
    engine.initialize();

    let stats = engine.model_stats();
    assert_eq!(stats.status, ModelStatus::Initialized);
    assert_eq!(stats.total_records, 3);
    assert_eq!(stats.matrix_shape, Some((3, 3)));
    assert_eq!(stats.vocabulary_size, 2);
    assert_eq!(stats.cache_ttl_secs, 3600);
    assert_eq!(stats.builds, 1);
    assert!(stats.last_update.is_some());

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["status"], "initialized");
    assert_eq!(json["matrix_shape"], json!([3, 3]));
}

#[test]
fn test_ttl_expiry_triggers_exactly_one_rebuild() {
    let mut config = Config::default();
    config.cache.ttl_secs = 1;
    let (engine, _store, clock) = engine_with(catalog(), config);

    assert!(engine.initialize());
    engine.recommend("inv-01", 5, 0.01);
    assert_eq!(engine.model_stats().builds, 1);

    clock.advance(TimeDelta::seconds(2));
    engine.recommend("inv-01", 5, 0.01);
    assert_eq!(engine.model_stats().builds, 2);

    engine.recommend("inv-02", 5, 0.01);
    engine.search("aplikasi", 5);
    assert_eq!(engine.model_stats().builds, 2);
}

#[test]
fn test_concurrent_readers_see_whole_snapshots() {
    let mut config = Config::default();
    config.cache.ttl_secs = 1;
    let (engine, store, clock) = engine_with(catalog(), config);
    assert!(engine.initialize());

    let mut grown = catalog();
    grown.push(innovation("inv-11", "Aplikasi kesehatan jiwa remaja", "kesehatan"));
    store.replace(grown);
    clock.advance(TimeDelta::seconds(2));

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                let results = engine.recommend("inv-01", 50, 0.0);
                let snapshot = engine.snapshot().unwrap();
                assert!(snapshot.len() == 10 || snapshot.len() == 11);
                assert_eq!(snapshot.matrix.len(), snapshot.len());
                assert_eq!(snapshot.vectors.len(), snapshot.len());
                assert!(results.len() == 9 || results.len() == 10);
            });
        }
    });

    assert_eq!(engine.model_stats().builds, 2);
    assert_eq!(engine.snapshot().unwrap().len(), 11);
}

#[test]
fn test_force_refresh_picks_up_new_records() {
    let (engine, store, _clock) = engine_with(three_records(), Config::default());
    engine.initialize();
    assert!(engine.recommend("D", 5, 0.0).is_empty());

    let mut docs = three_records();
    docs.push(innovation("D", "Aplikasi kesehatan lansia", "kesehatan"));
    store.replace(docs);

    // within TTL nothing changes until forced
    assert!(engine.recommend("D", 5, 0.0).is_empty());
    assert!(engine.force_refresh());
    assert!(!engine.recommend("D", 5, 0.0).is_empty());
    assert_eq!(engine.model_stats().builds, 2);
}

#[test]
fn test_failed_refresh_keeps_serving() {
    let (engine, store, _clock) = engine_with(three_records(), Config::default());
    engine.initialize();

    store.replace(Vec::new());
    assert!(!engine.force_refresh());
    assert_eq!(engine.recommend("A", 2, 0.01)[0].id, "B");
    assert_eq!(engine.model_stats().status, ModelStatus::Initialized);
}

#[test]
fn test_missing_catalog_file_is_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path().join("absent.json")));
    let engine = RecommendationEngine::new(Config::default(), store);

    assert!(!engine.initialize());
    assert!(engine.recommend("inv-001", 5, 0.0).is_empty());
    assert_eq!(engine.model_stats().status, ModelStatus::NotInitialized);
}

#[test]
fn test_category_weight() {
    let mut config = Config::default();
    config.text.category_weight = 3;
    let (engine, _store, _clock) = engine_with(three_records(), config);
    engine.initialize();

    let snapshot = engine.snapshot().unwrap();
    let a = snapshot.row_of("A").unwrap();
    assert_eq!(snapshot.texts[a].matches("sehat").count(), 4);
}
