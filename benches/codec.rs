//! Benchmarks for lz11 compression and decompression throughput.
//!
//! Covers the two match-search strategies, overlap mode, and batch scaling.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lz11::{
    compress, BatchCodec, BatchConfig, CompressConfig, Compressor, Decompressor, SearchStrategy,
};

/// Generate random (incompressible) data
fn generate_random_data(size: usize) -> Vec<u8> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut data = Vec::with_capacity(size);
    let mut hasher = DefaultHasher::new();

    for i in 0..size {
        i.hash(&mut hasher);
        data.push((hasher.finish() & 0xFF) as u8);
    }
    data
}

/// Generate repetitive (highly compressible) data
fn generate_repetitive_data(size: usize) -> Vec<u8> {
    b"ABCDABCDABCDABCD".iter().cycle().take(size).copied().collect()
}

/// Generate resource-like data: short records with a shared layout and
/// varying fields
fn generate_resource_data(size: usize) -> Vec<u8> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut data = Vec::with_capacity(size);
    let mut hasher = DefaultHasher::new();
    let mut record = 0u32;

    while data.len() < size {
        data.extend_from_slice(b"SPRT");
        data.extend_from_slice(&record.to_le_bytes());
        record.hash(&mut hasher);
        let value = hasher.finish();
        data.extend_from_slice(&(value as u16).to_le_bytes());
        data.extend_from_slice(&[0, 0, 0, 0, 0x10, 0x10]);
        if value % 7 == 0 {
            data.extend_from_slice(b"palette entry: default");
        }
        record += 1;
    }
    data.truncate(size);
    data
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");

    for size in [1024, 64 * 1024, 256 * 1024].iter() {
        let data = generate_resource_data(*size);

        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("hash_chain", size), &data, |b, data| {
            let compressor = Compressor::default();
            b.iter(|| compressor.compress(data).unwrap());
        });
    }

    group.finish();
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategies");
    let size = 64 * 1024;
    let data = generate_resource_data(size);

    group.throughput(Throughput::Bytes(size as u64));

    for (name, strategy) in
        [("exhaustive", SearchStrategy::Exhaustive), ("hash_chain", SearchStrategy::HashChain)]
    {
        for allow_overlap in [false, true] {
            let id = BenchmarkId::new(name, if allow_overlap { "overlap" } else { "reference" });
            group.bench_with_input(id, &data, |b, data| {
                let compressor = Compressor::new(CompressConfig { strategy, allow_overlap });
                b.iter(|| compressor.compress(data).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_data_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("data_patterns");
    let size = 256 * 1024;

    let inputs = [
        ("random", generate_random_data(size)),
        ("repetitive", generate_repetitive_data(size)),
        ("resource", generate_resource_data(size)),
    ];

    group.throughput(Throughput::Bytes(size as u64));

    for (name, data) in &inputs {
        let compressed = compress(data).unwrap();
        group.bench_function(format!("{}_compress", name), |b| {
            let compressor = Compressor::default();
            b.iter(|| compressor.compress(data).unwrap());
        });
        group.bench_function(format!("{}_decompress", name), |b| {
            let decompressor = Decompressor::default();
            b.iter(|| decompressor.decompress(&compressed).unwrap());
        });
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");

    // 32 independent 64KB resources
    let inputs: Vec<Vec<u8>> = (0..32).map(|_| generate_resource_data(64 * 1024)).collect();
    let total: usize = inputs.iter().map(Vec::len).sum();

    group.throughput(Throughput::Bytes(total as u64));

    for threads in [1, 2, 4, 8].iter() {
        group.bench_with_input(BenchmarkId::new("threads", threads), &inputs, |b, inputs| {
            let batch = BatchCodec::new(BatchConfig { num_threads: *threads });
            let compressor = Compressor::default();
            b.iter(|| batch.process_all(&compressor, inputs).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compress, bench_strategies, bench_data_patterns, bench_batch);
criterion_main!(benches);
