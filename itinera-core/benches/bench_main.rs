use std::hint::black_box;

use chrono::NaiveDate;
use criterion::{Criterion, criterion_group, criterion_main};
use geo::Point;
use itinera_core::loading::TransitDataBuilder;
use itinera_core::routing::isochrone::isochrone_all;
use itinera_core::{PublicTransitData, RaptorEngine, SearchDirection, SearchParams, SeedPoint};

const GRID: usize = 12;

/// Square grid of stops with one line per row and per column, a trip every
/// ten minutes from 06:00 to 10:00 in both directions
fn grid_network() -> PublicTransitData {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut builder = TransitDataBuilder::new(start, 1);
    let uri = |x: usize, y: usize| format!("S{x}_{y}");
    for y in 0..GRID {
        for x in 0..GRID {
            let name = uri(x, y);
            builder.add_stop(&name, &name, Point::new(x as f64 * 0.005, y as f64 * 0.005));
        }
    }

    let mut lines: Vec<(String, Vec<String>)> = Vec::new();
    for i in 0..GRID {
        lines.push((format!("H{i}"), (0..GRID).map(|x| uri(x, i)).collect()));
        lines.push((format!("V{i}"), (0..GRID).map(|y| uri(i, y)).collect()));
    }
    for (line, stops) in &lines {
        builder.add_line(line, line, "bus");
        for (reversed, sequence) in [(false, stops.clone()), (true, stops.iter().rev().cloned().collect())] {
            for (k, departure) in (6 * 3600..10 * 3600).step_by(600).enumerate() {
                let calls: Vec<(&str, u32, u32)> = sequence
                    .iter()
                    .enumerate()
                    .map(|(pos, stop)| {
                        let t = departure + pos as u32 * 120;
                        (stop.as_str(), t, t)
                    })
                    .collect();
                builder
                    .add_trip(&format!("{line}-{reversed}-{k}"), line, &calls)
                    .unwrap();
            }
        }
    }
    builder.generate_transfers(600, 1.12);
    builder.build()
}

fn seed(stop: usize) -> Vec<SeedPoint> {
    vec![SeedPoint {
        stop,
        duration: 0,
        entry: 0,
    }]
}

fn routing_benchmark(c: &mut Criterion) {
    let data = grid_network();
    let origin = seed(0);
    let destination = seed(GRID * GRID - 1);
    let mut engine = RaptorEngine::new(&data);
    let forward = SearchParams::default();
    let backward = SearchParams::default().with_direction(SearchDirection::Backward);

    c.bench_function("raptor_forward", |b| {
        b.iter(|| {
            engine
                .compute_all(black_box(&origin), black_box(&destination), 7 * 3600, None, &forward)
                .unwrap()
        });
    });
    c.bench_function("raptor_backward", |b| {
        b.iter(|| {
            engine
                .compute_all(black_box(&origin), black_box(&destination), 9 * 3600, None, &backward)
                .unwrap()
        });
    });
    c.bench_function("isochrone_30min", |b| {
        b.iter(|| isochrone_all(&mut engine, black_box(&origin), 7 * 3600, 1800, &forward).unwrap());
    });
}

criterion_group!(benches, routing_benchmark);
criterion_main!(benches);
