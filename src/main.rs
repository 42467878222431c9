use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use sigmasat::cnf::Cnf;
use sigmasat::dimacs::{self, Dimacs};
use sigmasat::engine::Engine;
use sigmasat::options::SimpOptions;
use sigmasat::simplify::Simplifier;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sigmasat", version, about = "Parallel CNF simplifier")]
struct Cli {
    /// DIMACS file to simplify. Without one, the built-in formulas are run.
    input: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the simplified formula
    #[arg(long)]
    print: bool,

    /// Also simplify a random 3-CNF with this many variables
    #[arg(long, value_name = "VARS")]
    random: Option<u32>,

    /// Clause/variable ratio of the random formula
    #[arg(long, default_value_t = 4.0)]
    ratio: f64,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long = "no-perf-simp")]
    no_perf_report: bool,
    #[arg(long = "no-bve")]
    no_ve: bool,
    #[arg(long = "no-bve-plus")]
    no_ve_plus: bool,
    #[arg(long)]
    sub: bool,
    #[arg(long)]
    bce: bool,
    #[arg(long)]
    hre: bool,
    /// Enable every technique
    #[arg(long)]
    all: bool,

    #[arg(long, default_value_t = 32)]
    mu_pos: i64,
    #[arg(long, default_value_t = 32)]
    mu_neg: i64,
    #[arg(long, default_value_t = 2)]
    phases: i64,
    #[arg(long, default_value_t = 3)]
    cnf_free_freq: i64,
    #[arg(long, default_value_t = 512)]
    ce_pos_limit: i64,
    #[arg(long, default_value_t = 512)]
    ce_neg_limit: i64,
    #[arg(long, default_value_t = 2)]
    min_pvars: i64,
    #[arg(long, default_value_t = 10)]
    lit_rem_threshold: i64,
    #[arg(long = "bce-limit", default_value_t = 64)]
    fan_limit: i64,
    #[arg(long = "sh-bve-out", default_value_t = 125)]
    bve_out_limit: i64,
    #[arg(long = "sh-bce-in", default_value_t = 95)]
    bce_in_limit: i64,
    #[arg(long = "sh-hse-in", default_value_t = 180)]
    hse_in_limit: i64,
    #[arg(long = "sh-hre-in", default_value_t = 100)]
    hre_in_limit: i64,
    #[arg(long = "sh-hre-out", default_value_t = 250)]
    hre_out_limit: i64,
    /// Worker threads (0: one per core)
    #[arg(long, default_value_t = 0)]
    threads: i64,
}

impl Cli {
    fn options(&self) -> SimpOptions {
        SimpOptions {
            perf_report: !self.no_perf_report,
            ve: !self.no_ve,
            sub: self.sub,
            ve_plus: !self.no_ve_plus,
            bce: self.bce,
            hre: self.hre,
            all: self.all,
            mu_pos: self.mu_pos,
            mu_neg: self.mu_neg,
            phases: self.phases,
            cnf_free_freq: self.cnf_free_freq,
            ce_pos_limit: self.ce_pos_limit,
            ce_neg_limit: self.ce_neg_limit,
            min_pvars: self.min_pvars,
            lit_rem_threshold: self.lit_rem_threshold,
            fan_limit: self.fan_limit,
            bve_out_limit: self.bve_out_limit,
            bce_in_limit: self.bce_in_limit,
            hse_in_limit: self.hse_in_limit,
            hre_in_limit: self.hre_in_limit,
            hre_out_limit: self.hre_out_limit,
            threads: self.threads,
        }
    }
}

fn random_3cnf(num_vars: u32, ratio: f64, seed: u64) -> Dimacs {
    let mut rng = Pcg64::seed_from_u64(seed);
    let num_clauses = (num_vars as f64 * ratio).round() as usize;
    let clauses = (0..num_clauses)
        .map(|_| {
            (0..3)
                .map(|_| {
                    let v = rng.random_range(1..=num_vars as i32);
                    if rng.random_bool(0.5) {
                        -v
                    } else {
                        v
                    }
                })
                .collect()
        })
        .collect();
    Dimacs { num_vars, clauses }
}

fn simplify_and_print(engine: &Engine, name: &str, problem: &Dimacs, print: bool) {
    println!("c | {name}: {} variables, {} clauses", problem.num_vars, problem.clauses.len());
    let cnf: Cnf = problem.to_cnf();
    let mut simp = Simplifier::new(engine, cnf, problem.num_vars);
    let report = simp.simplify().clone();
    print!("{report}");
    let units = simp.units();
    if !units.is_empty() {
        println!("c | unit literals: {units:?}");
    }
    if print {
        let mut out = String::new();
        if simp.cnf().print_remaining(&mut out).is_ok() {
            print!("{out}");
        }
    }
}

fn run(cli: &Cli) -> sigmasat::Result<()> {
    let engine = Engine::new(cli.options())?;
    match &cli.input {
        Some(path) => {
            let problem = dimacs::read(std::fs::File::open(path)?)?;
            simplify_and_print(&engine, &path.display().to_string(), &problem, cli.print);
        }
        None => {
            for (name, text) in [
                ("fail_eg", dimacs::FAIL_EG),
                ("long_eg", dimacs::LONG_EG),
                ("succ_eg", dimacs::SUCC_EG),
            ] {
                simplify_and_print(&engine, name, &dimacs::read_string(text)?, cli.print);
            }
        }
    }
    if let Some(vars) = cli.random {
        let problem = random_3cnf(vars.max(1), cli.ratio, cli.seed);
        simplify_and_print(&engine, "random", &problem, cli.print);
    }
    Ok(())
}

pub fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
