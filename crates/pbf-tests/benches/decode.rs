use pbf_decoder::{BlockDecoder, DecodedBlock, DecoderConfig, PbfReader, decompress};
use pbf_tests::{BlockBuilder, Codec, compress_blob, samples};
use pbf_types::osmformat::PrimitiveBlock;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

fn count_entities(bytes: &[u8], config: &DecoderConfig) -> usize {
    PbfReader::new(bytes, config.clone())
        .map(|block| match block.unwrap() {
            DecodedBlock::Data { entities, .. } => entities.len(),
            _ => 0,
        })
        .sum()
}

fn bench_decode_sample(c: &mut Criterion) {
    let bytes = samples::file(Codec::Raw).unwrap();
    let config = DecoderConfig::default();

    c.bench_function("decode_sample", |b| {
        b.iter(|| count_entities(&bytes, &config));
    });
}

fn bench_decode_codecs(c: &mut Criterion) {
    let config = DecoderConfig::default();
    let mut group = c.benchmark_group("decode_codec");

    for codec in Codec::ALL {
        let bytes = samples::grid(codec, 8, 2000).unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(codec), &bytes, |b, bytes| {
            b.iter(|| count_entities(bytes, &config));
        });
    }

    group.finish();
}

fn bench_dense_batch(c: &mut Criterion) {
    let points = (1..=8000)
        .map(|id| pbf_types::Point {
            id,
            lat: 51.0 + (id % 100) as f64 * 1e-3,
            lon: -0.1 - (id % 100) as f64 * 1e-3,
            tags: Vec::new(),
            metadata: Some(samples::metadata(1, 1_600_000_000_000, 7, "alice", 500)),
        })
        .collect::<Vec<_>>();
    let block = BlockBuilder::new().dense_points(&points).build();
    let mut group = c.benchmark_group("dense_batch");
    group.throughput(Throughput::Elements(points.len() as u64));

    for (name, config) in [
        ("with_metadata", DecoderConfig::default()),
        ("without_metadata", DecoderConfig::default().with_metadata(false)),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| BlockDecoder::new(&block, &config).decode().unwrap().len());
        });
    }

    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let block: PrimitiveBlock = BlockBuilder::new().dense_points(&samples::points()).build();
    let payload = block.encode().repeat(64);
    let mut group = c.benchmark_group("decompress");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for codec in [Codec::Zlib, Codec::Lz4, Codec::Zstd] {
        let blob = compress_blob(&payload, codec).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(codec), &blob, |b, blob| {
            b.iter(|| decompress(blob.clone(), payload.len()).unwrap().0.len());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_decode_sample,
    bench_decode_codecs,
    bench_dense_batch,
    bench_decompress
);
criterion_main!(benches);
