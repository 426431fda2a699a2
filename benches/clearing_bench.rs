use clearing::generate::NetworkGenerator;
use clearing::{
    clearing_p, clearing_p_lp, clearing_p_with_options, ClearingOptions, FixedPointMethod,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_solvers(c: &mut Criterion) {
    let mut group = c.benchmark_group("clearing");
    for nodes in [50usize, 200] {
        let network = NetworkGenerator::new(nodes)
            .density(10.0 / nodes as f64)
            .asset_range(0.1, 2.0)
            .generate(42)
            .expect("valid generator settings");

        group.bench_with_input(BenchmarkId::new("fixed_point", nodes), &network, |b, net| {
            b.iter(|| clearing_p(black_box(net)).expect("converged"))
        });
        let plain = ClearingOptions::default().with_method(FixedPointMethod::Iteration);
        group.bench_with_input(BenchmarkId::new("fixed_point_plain", nodes), &network, |b, net| {
            b.iter(|| clearing_p_with_options(black_box(net), &plain).expect("converged"))
        });
        group.bench_with_input(BenchmarkId::new("linear_program", nodes), &network, |b, net| {
            b.iter(|| clearing_p_lp(black_box(net)).expect("solved"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_solvers);
criterion_main!(benches);
