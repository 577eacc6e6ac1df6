//! Throughput benchmarks for frame encode and decode.
//!
//! Measures the codec-dispatch and framing overhead over flat and nested
//! values under sustained load.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sigframe::{
    CodecError, CodecRegistry, FrameReader, FrameWriter, ObjectCodec, Result,
};

#[derive(Debug, Clone, PartialEq)]
struct Sample {
    name: String,
    value: i64,
}

struct SampleCodec;

impl ObjectCodec<Sample> for SampleCodec {
    fn serialize(&self, writer: &mut FrameWriter, value: &Sample) -> Result<()> {
        writer.write_object(&value.name)?;
        writer.write_i64(value.value)
    }

    fn deserialize(&self, reader: &mut FrameReader) -> Result<Sample> {
        let name = reader
            .read_string()?
            .ok_or_else(|| CodecError::custom("sample name must not be null"))?;
        let value = reader.read_i64()?;
        Ok(Sample { name, value })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Batch {
    samples: Vec<Sample>,
}

struct BatchCodec;

impl ObjectCodec<Batch> for BatchCodec {
    fn serialize(&self, writer: &mut FrameWriter, value: &Batch) -> Result<()> {
        writer.write_i32(value.samples.len() as i32)?;
        for sample in &value.samples {
            writer.write_object(sample)?;
        }
        Ok(())
    }

    fn deserialize(&self, reader: &mut FrameReader) -> Result<Batch> {
        let count = reader.read_i32()?;
        if count < 0 {
            return Err(CodecError::InvalidElementCount(count));
        }
        let mut samples = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let sample = reader
                .read_object::<Sample>()?
                .ok_or_else(|| CodecError::custom("batch samples must not be null"))?;
            samples.push(sample);
        }
        Ok(Batch { samples })
    }
}

fn registry() -> Arc<CodecRegistry> {
    CodecRegistry::builder()
        .register(0xAA, 128, SampleCodec)
        .unwrap()
        .register(0xA0, 16 * 1024, BatchCodec)
        .unwrap()
        .build()
}

fn batch(size: usize) -> Batch {
    Batch {
        samples: (0..size)
            .map(|i| Sample {
                name: format!("sample-{i}"),
                value: i as i64 * 31,
            })
            .collect(),
    }
}

fn bench_encode(c: &mut Criterion) {
    let registry = registry();
    let flat = Sample {
        name: "flat".to_owned(),
        value: 42,
    };
    let tree = batch(64);

    let mut group = c.benchmark_group("encode");
    group.bench_function("flat_object", |b| {
        b.iter(|| {
            let mut writer = registry.writer(256);
            writer.write_object(black_box(&flat)).unwrap();
            black_box(writer.finish())
        })
    });
    group.bench_function("object_tree_64", |b| {
        b.iter(|| {
            let mut writer = registry.writer(32 * 1024);
            writer.write_object(black_box(&tree)).unwrap();
            black_box(writer.finish())
        })
    });
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let registry = registry();

    let mut writer = registry.writer(256);
    writer
        .write_object(&Sample {
            name: "flat".to_owned(),
            value: 42,
        })
        .unwrap();
    let flat_bytes = writer.finish();

    let mut writer = registry.writer(32 * 1024);
    writer.write_object(&batch(64)).unwrap();
    let tree_bytes = writer.finish();

    let mut group = c.benchmark_group("decode");
    group.bench_function("flat_object", |b| {
        b.iter(|| {
            let mut reader = registry.reader(black_box(flat_bytes.clone()));
            black_box(reader.read_object::<Sample>().unwrap())
        })
    });
    group.bench_function("object_tree_64", |b| {
        b.iter(|| {
            let mut reader = registry.reader(black_box(tree_bytes.clone()));
            black_box(reader.read_object::<Batch>().unwrap())
        })
    });
    group.finish();
}

fn bench_sustained_round_trip(c: &mut Criterion) {
    let registry = registry();

    c.bench_function("sustained_round_trip_1000", |b| {
        b.iter(|| {
            let mut decoded = 0u64;
            for i in 0..1000 {
                let mut writer = registry.writer(256);
                writer
                    .write_object(&Sample {
                        name: "steady".to_owned(),
                        value: i,
                    })
                    .unwrap();
                let mut reader = registry.reader(writer.finish());
                if reader.read_object::<Sample>().unwrap().is_some() {
                    decoded += 1;
                }
            }
            black_box(decoded)
        })
    });
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_sustained_round_trip
);
criterion_main!(benches);
