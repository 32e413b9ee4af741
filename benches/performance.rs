// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance benchmarks for Progression
//!
//! Run with: cargo bench
//!
//! These benchmarks measure the work done on every selector change and
//! every pad press: pitch lists, harmonic fields, layout derivation and
//! chord dispatch.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use progression::control::{PadLayout, Selection};
use progression::midi::{Conductor, EndpointInfo, Endpoints, MemoryTransport, MidiSettings};
use progression::music::{HarmonicFieldKind, Key, Note, Scale, ScaleType, Spelling};

/// Benchmark pitch list generation across octave ranges
fn bench_pitches(c: &mut Criterion) {
    let mut group = c.benchmark_group("pitches");
    let scale = Scale::new(Key::new(Note::Ds, Spelling::Flats), ScaleType::Dorian);

    for octaves in [1usize, 5, 11].iter() {
        let range: Vec<i8> = (-1..10).take(*octaves).collect();
        group.bench_with_input(BenchmarkId::from_parameter(octaves), &range, |b, range| {
            b.iter(|| black_box(scale.pitches(black_box(range))))
        });
    }

    group.finish();
}

/// Benchmark harmonic field construction for every scale type
fn bench_harmonic_field(c: &mut Criterion) {
    let key = Key::new(Note::G, Spelling::Sharps);

    c.bench_function("harmonic_field_all_scales", |b| {
        b.iter(|| {
            for scale_type in ScaleType::ALL {
                let scale = Scale::new(key, scale_type);
                for kind in HarmonicFieldKind::ALL {
                    black_box(scale.harmonic_field(kind));
                }
            }
        })
    });
}

/// Benchmark a full layout derivation, as done on each selector change
fn bench_layout_derive(c: &mut Criterion) {
    let selection = Selection::default();

    c.bench_function("layout_derive", |b| {
        b.iter(|| black_box(PadLayout::derive(black_box(&selection))))
    });
}

/// Benchmark chord on/off through the conductor into memory
fn bench_chord_dispatch(c: &mut Criterion) {
    let layout = PadLayout::derive(&Selection::default());
    let chord = layout.chords()[7].chord;
    let transport = MemoryTransport::with_destinations(vec![
        EndpointInfo::new(1, "Synth A"),
        EndpointInfo::new(2, "Synth B"),
    ]);
    let log = transport.log();
    let mut conductor = Conductor::start(transport, &MidiSettings::default());

    c.bench_function("chord_on_off_all_endpoints", |b| {
        b.iter(|| {
            conductor
                .chord_on(&chord, 3, 90, 0, &Endpoints::All)
                .ok();
            conductor.chord_off(&chord, 3, 0, &Endpoints::All).ok();
            black_box(log.take().len())
        })
    });
}

criterion_group!(
    benches,
    bench_pitches,
    bench_harmonic_field,
    bench_layout_derive,
    bench_chord_dispatch,
);
criterion_main!(benches);
