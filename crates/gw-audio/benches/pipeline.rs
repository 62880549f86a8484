//! Criterion benchmarks for the per-frame pipeline and the epoch vote.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use gw_audio::pipeline::FramePipeline;
use gw_audio::tone::ToneSource;
use gw_audio::vote::decide_tally;
use gw_core::config::DetectorConfig;
use gw_core::frame::Frame;
use gw_core::label::ClassLabel;
use gw_core::tally::EpochTally;
use gw_core::timing::{NoopCounter, TimingAccumulator};
use gw_core::traits::SampleSource;

fn bench_frame_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/frame");

    for frame_size in [256usize, 1024, 4096] {
        let config = DetectorConfig {
            frame_size,
            ..DetectorConfig::default()
        };
        let Ok(mut pipeline) = FramePipeline::new(&config) else {
            continue;
        };
        let mut frame = Frame::new(frame_size);
        let mut tone = ToneSource::new(3000.0, 0.5, config.sample_rate);
        let _ = tone.acquire(&mut frame);
        let mut timing = TimingAccumulator::default();

        group.bench_with_input(BenchmarkId::new("tone", frame_size), &frame, |b, frame| {
            b.iter(|| black_box(pipeline.process(black_box(frame), &mut timing, &NoopCounter)));
        });

        let silence = Frame::new(frame_size);
        group.bench_with_input(
            BenchmarkId::new("silence", frame_size),
            &silence,
            |b, frame| {
                b.iter(|| black_box(pipeline.process(black_box(frame), &mut timing, &NoopCounter)));
            },
        );
    }

    group.finish();
}

fn bench_decide(c: &mut Criterion) {
    let tally = EpochTally::from_counts(&[
        (ClassLabel::NoActivity, 10),
        (ClassLabel::Footsteps, 3),
        (ClassLabel::Voices, 3),
    ]);
    c.bench_function("vote/decide_tally", |b| {
        b.iter(|| black_box(decide_tally(black_box(tally), 5)));
    });
}

criterion_group!(benches, bench_frame_pipeline, bench_decide);
criterion_main!(benches);
