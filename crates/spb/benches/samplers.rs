use criterion::{Criterion, criterion_group, criterion_main};
use ndarray::Array2;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use spbsampling::{Hpwd, SpatialSampling, Swd};

fn line_distances(n: usize) -> Array2<f64> {
    Array2::from_shape_fn((n, n), |(i, j)| (i as f64 - j as f64).abs())
}

fn criterion_samplers(c: &mut Criterion) {
    let sizes = [(100, 10), (500, 50)];

    let mut group = c.benchmark_group("spb");
    group.sample_size(10);
    let rng = Xoshiro256Plus::seed_from_u64(42);
    for (npop, nsamp) in sizes {
        let dis = line_distances(npop);
        group.bench_function(format!("hpwd-{npop}-pop-{nsamp}-samp"), |b| {
            b.iter(|| {
                std::hint::black_box(
                    Hpwd::new(nsamp)
                        .n_replications(10)
                        .with_rng(rng.clone())
                        .sample(&dis),
                )
            });
        });
        group.bench_function(format!("swd-{npop}-pop-{nsamp}-samp"), |b| {
            b.iter(|| {
                std::hint::black_box(
                    Swd::new(nsamp)
                        .n_replications(10)
                        .n_iterations(5)
                        .with_rng(rng.clone())
                        .sample(&dis),
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_samplers);
criterion_main!(benches);
