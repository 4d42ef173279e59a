//! Benchmarks for the voice engine's control path.
//!
//! Run with: cargo bench
//!
//! The engine never renders samples, but every note-on builds a voice
//! graph and every knob drag re-aims all sounding voices, so these paths
//! sit inside interactive latency budgets. The offline graph stands in
//! for the renderer, which makes the numbers pure engine overhead.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use modsynth::audio::OfflineGraph;
use modsynth::patch;
use modsynth::sequencing::Song;
use modsynth::synth::{Param, Synth, SynthParams};

/// Polyphony levels worth measuring, up to two full hands.
const VOICE_COUNTS: &[u8] = &[1, 4, 10];

fn fresh_synth() -> Synth<OfflineGraph> {
    Synth::new(OfflineGraph::new(), SynthParams::default())
}

fn bench_note_on(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/note_on");

    for &voices in VOICE_COUNTS {
        group.bench_with_input(BenchmarkId::new("chord", voices), &voices, |b, &voices| {
            b.iter(|| {
                let mut synth = fresh_synth();
                for i in 0..voices {
                    synth.note_on(black_box(48 + i * 3), 1.0);
                }
                black_box(synth.voice_count())
            })
        });
    }
    group.finish();
}

fn bench_propagation(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/propagation");

    for &voices in VOICE_COUNTS {
        let mut synth = fresh_synth();
        for i in 0..voices {
            synth.note_on(48 + i * 3, 1.0);
        }

        group.bench_with_input(BenchmarkId::new("cutoff_drag", voices), &voices, |b, _| {
            let mut cutoff = 500.0;
            b.iter(|| {
                cutoff = if cutoff > 4000.0 { 500.0 } else { cutoff + 10.0 };
                synth.apply(black_box(Param::Cutoff(cutoff)));
            })
        });

        group.bench_with_input(BenchmarkId::new("sustain_edit", voices), &voices, |b, _| {
            b.iter(|| {
                synth.apply(black_box(Param::AmpSustain(55.0)));
            })
        });
    }
    group.finish();
}

fn bench_patch_load(c: &mut Criterion) {
    let bass = patch::builtin("bass").unwrap();
    let mut synth = fresh_synth();
    for note in [36, 48, 60] {
        synth.note_on(note, 1.0);
    }

    c.bench_function("engine/load_patch", |b| {
        b.iter(|| synth.load_patch(black_box(&bass)))
    });
}

fn bench_song_parse(c: &mut Criterion) {
    // A realistic take: a few hundred events plus header comments.
    let mut text = String::from("# Moog Modular Song\n# preset: lead\n");
    for i in 0..400u32 {
        text.push_str(&format!("{}:{}4:{}\n", i * 125, ["C", "E", "G"][i as usize % 3], 100));
    }

    c.bench_function("song/parse_400_events", |b| {
        b.iter(|| black_box(Song::parse(black_box(&text))).notes.len())
    });
}

criterion_group!(
    benches,
    bench_note_on,
    bench_propagation,
    bench_patch_load,
    bench_song_parse,
);
criterion_main!(benches);
