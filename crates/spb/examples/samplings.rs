use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use ndarray::{Array, Array2, Zip};
use ndarray_npy::read_npy;
use ndarray_rand::{RandomExt, rand::SeedableRng, rand_distr::Uniform};
use ndarray_stats::DeviationExt;
use rand_xoshiro::Xoshiro256Plus;
use spbsampling::{Hpwd, SPB_LOG, SampleTable, SpatialSampling, Swd};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Distance matrix (.npy), random points in the unit square otherwise
    #[arg(short, long)]
    dist: Option<String>,
    #[arg(short = 'N', long, default_value_t = 100)]
    npop: usize,
    #[arg(short, long, default_value_t = 10)]
    nsamp: usize,
    #[arg(short = 'r', long, default_value_t = 5)]
    nrepl: usize,
    #[arg(short = 'i', long, default_value_t = 10)]
    niter: usize,
    #[arg(short, long, default_value_t = 10.)]
    bexp: f64,
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
}

/// Euclidean distances between rows of `x`
fn distances(x: &Array2<f64>) -> Array2<f64> {
    let n = x.nrows();
    let mut dis = Array2::zeros((n, n));
    Zip::indexed(&mut dis).for_each(|(i, j), d| {
        if i != j {
            *d = x.row(i).l2_dist(&x.row(j)).unwrap_or(f64::NAN);
        }
    });
    dis
}

fn report(name: &str, table: &SampleTable, dis: &Array2<f64>) {
    println!("*** using {name}");
    for r in 0..table.n_replications() {
        println!("sample {}: {}", r + 1, table.units(r));
    }
    println!("within sample distances: {}", table.spread(dis));
    println!(
        "inclusion frequencies: {}\n",
        table.inclusion_frequencies(dis.nrows())
    );
}

fn main() -> Result<()> {
    let env = Env::new().filter_or(SPB_LOG, "info");
    Builder::from_env(env).try_init().ok();
    let args = Args::parse();

    let dis: Array2<f64> = match &args.dist {
        Some(path) => read_npy(path)?,
        None => {
            let mut rng = Xoshiro256Plus::seed_from_u64(args.seed);
            let points = Array::random_using((args.npop, 2), Uniform::new(0., 1.), &mut rng);
            distances(&points)
        }
    };
    println!(
        "Take {} samples of {} units among {}\n",
        args.nrepl,
        args.nsamp,
        dis.nrows()
    );

    let table = Hpwd::new(args.nsamp)
        .n_replications(args.nrepl)
        .with_rng(Xoshiro256Plus::seed_from_u64(args.seed))
        .sample(&dis)?;
    report("heuristic product within distance", &table, &dis);

    let table = Swd::new(args.nsamp)
        .n_replications(args.nrepl)
        .n_iterations(args.niter)
        .bexp(args.bexp)
        .with_rng(Xoshiro256Plus::seed_from_u64(args.seed))
        .sample(&dis)?;
    report("sum within distance", &table, &dis);

    Ok(())
}
