// Criterion benchmarks for Local RAG

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use local_rag::core::similarity::cosine_distance;
use local_rag::models::{Metadata, StoredDocument};
use local_rag::services::{HashingEmbedder, VectorStore};

const DIMENSION: usize = 384;

fn sample_text(id: usize) -> String {
    format!(
        "Document {} describes procedure {} for team {} including escalation step {}",
        id,
        id % 17,
        id % 5,
        id % 3
    )
}

fn bench_cosine_distance(c: &mut Criterion) {
    let embedder = HashingEmbedder::new(DIMENSION);
    let a = embedder.embed_text("reset the vpn token");
    let b = embedder.embed_text("vpn token regeneration procedure");

    c.bench_function("cosine_distance_384", |bench| {
        bench.iter(|| cosine_distance(black_box(&a), black_box(&b)));
    });
}

fn bench_hashing_embedder(c: &mut Criterion) {
    let embedder = HashingEmbedder::new(DIMENSION);
    let text = sample_text(42).repeat(8);

    c.bench_function("hashing_embed_text", |bench| {
        bench.iter(|| embedder.embed_text(black_box(&text)));
    });
}

fn bench_store_query(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let embedder = HashingEmbedder::new(DIMENSION);
    let mut group = c.benchmark_group("store_query");

    for size in [100usize, 1_000, 10_000].iter() {
        let dir = tempfile::tempdir().unwrap();
        let store = runtime.block_on(async {
            let store = VectorStore::open(dir.path(), "bench_docs").await.unwrap();
            let docs = (0..*size)
                .map(|i| {
                    let text = sample_text(i);
                    let embedding = embedder.embed_text(&text);
                    StoredDocument::new(format!("doc-{}", i), text, embedding, Metadata::new())
                })
                .collect();
            store.add_documents(docs).await.unwrap();
            store
        });
        let query = embedder.embed_text("escalation procedure for team 3");

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |bench, _| {
            bench.iter(|| runtime.block_on(store.query(black_box(&query), 3)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cosine_distance, bench_hashing_embedder, bench_store_query);
criterion_main!(benches);
