use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use polars::prelude::*;
use pythia_rust::cleaning::{seconds_to_nearest_midnight, MidnightRotation, DEFAULT_FORMAT};
use pythia_rust::learning::{BaseDataModule, DataModuleConfig, Split, SplitConfig};
use pythia_rust::physics::{diff_rot, RotationLaw, RotationModel};
use qtty::{Degrees, Seconds};
use std::hint::black_box;

fn bench_seconds_to_midnight(c: &mut Criterion) {
    let mut group = c.benchmark_group("midnight_rotation");

    let timestamps: Vec<String> = (0..1000)
        .map(|i| format!("2014-05-20 {:02}:{:02}:{:02}", i % 24, i % 60, (i * 7) % 60))
        .collect();
    group.bench_function("seconds_to_nearest_midnight_1000", |b| {
        b.iter(|| {
            for ts in &timestamps {
                black_box(seconds_to_nearest_midnight(black_box(ts), DEFAULT_FORMAT).ok());
            }
        });
    });

    let rotation = MidnightRotation::default();
    group.bench_function("longitude_at_nearest_midnight", |b| {
        b.iter(|| {
            rotation.longitude_at_nearest_midnight(
                black_box("2000-01-01 12:47:02"),
                black_box(Degrees::new(30.0)),
            )
        });
    });

    group.finish();
}

fn bench_diff_rot(c: &mut Criterion) {
    let mut group = c.benchmark_group("differential_rotation");

    for law in RotationLaw::ALL {
        let model = RotationModel::new(law, Default::default());
        group.bench_with_input(BenchmarkId::new("diff_rot", law), &model, |b, model| {
            b.iter(|| {
                for lat in -90..=90 {
                    black_box(diff_rot(
                        Seconds::new(43200.0),
                        Degrees::new(lat as f64),
                        model,
                    ));
                }
            });
        });
    }

    group.finish();
}

fn bench_datamodule_setup(c: &mut Criterion) {
    let mut group = c.benchmark_group("datamodule");

    for rows in [1_000usize, 10_000] {
        let x: Vec<f64> = (0..rows).map(|i| i as f64).collect();
        let y: Vec<i64> = (0..rows).map(|i| i64::from(i % 5 == 0)).collect();
        let df = DataFrame::new(vec![Column::new("x".into(), x), Column::new("y".into(), y)])
            .unwrap();

        group.bench_with_input(BenchmarkId::new("setup_and_train_epoch", rows), &df, |b, df| {
            b.iter(|| {
                let config = DataModuleConfig::new("y")
                    .with_x_col(["x"])
                    .with_batch_size(64)
                    .with_seed(1)
                    .with_split_config(Split::Train, SplitConfig::new())
                    .with_split_config(Split::Val, SplitConfig::new())
                    .with_split_config(Split::Test, SplitConfig::new());
                let mut module = BaseDataModule::new(df.clone(), config).unwrap();
                module.prepare_data().unwrap();
                module.setup().unwrap();
                for batch in module.train_dataloader().unwrap() {
                    black_box(batch.unwrap());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_seconds_to_midnight,
    bench_diff_rot,
    bench_datamodule_setup
);
criterion_main!(benches);
