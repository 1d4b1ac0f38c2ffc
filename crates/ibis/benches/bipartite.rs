use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ibis::{BipartiteOptions, Focus, Part, Row, bpmap, layout};
use std::hint::black_box;

fn rows(primary: usize, secondary: usize) -> Vec<Row> {
    let mut out = Vec::with_capacity(primary * 3);
    for p in 0..primary {
        for k in 0..3 {
            let s = (p * 7 + k * 13) % secondary;
            let value = ((p + 1) * (k + 2)) as f64 / 10.0;
            out.push(Row::new(format!("frame{p}.en"), format!("frame{s}.pt"), value));
        }
    }
    out
}

fn bench_bpmap(c: &mut Criterion) {
    let mut group = c.benchmark_group("bpmap");
    for n in [16usize, 128, 1024] {
        let values: Vec<f64> = (0..n).map(|i| ((i * 37) % 101) as f64 / 7.0).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| bpmap(black_box(values), 1.0, 12.0, 0.0, 20_000.0))
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("bipartite_layout");
    let options = BipartiteOptions {
        height: 4_000.0,
        min: 12.0,
        pad: 1.0,
        ..Default::default()
    };
    for n in [20usize, 100] {
        let data = rows(n, n / 2);
        group.bench_with_input(BenchmarkId::new("unfocused", n), &data, |b, data| {
            b.iter(|| layout(black_box(data), &options, None))
        });
        let focus = Focus::new(Part::Primary, "frame3.en");
        group.bench_with_input(BenchmarkId::new("focused", n), &data, |b, data| {
            b.iter(|| layout(black_box(data), &options, Some(&focus)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bpmap, bench_layout);
criterion_main!(benches);
