use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::*;

use sigmasat::cnf::Cnf;
use sigmasat::engine::Engine;
use sigmasat::lit::Lit;
use sigmasat::model::satisfied;
use sigmasat::options::SimpOptions;
use sigmasat::simplify::Simplifier;

const MAX_VARS: u32 = 7;

#[derive(Clone, Debug)]
struct Formula {
    num_vars: u32,
    clauses: Vec<Vec<i32>>,
}

impl Arbitrary for Formula {
    fn arbitrary(g: &mut Gen) -> Self {
        let num_vars = u32::arbitrary(g) % MAX_VARS + 1;
        let n = usize::arbitrary(g) % 24 + 1;
        let clauses = (0..n)
            .map(|_| {
                let len = usize::arbitrary(g) % 3 + 1;
                (0..len)
                    .map(|_| {
                        let v = (u32::arbitrary(g) % num_vars) as i32 + 1;
                        if bool::arbitrary(g) {
                            v
                        } else {
                            -v
                        }
                    })
                    .collect()
            })
            .collect();
        Formula { num_vars, clauses }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let num_vars = self.num_vars;
        Box::new(
            self.clauses
                .shrink()
                .filter(|cs| cs.iter().all(|c| !c.is_empty() && !c.contains(&0)))
                .map(move |clauses| Formula { num_vars, clauses }),
        )
    }
}

fn to_lits(clause: &[i32]) -> Vec<Lit> {
    clause.iter().map(|&l| Lit::from_dimacs(l)).collect()
}

fn brute_force(num_vars: u32, clauses: &[Vec<Lit>]) -> Option<Vec<bool>> {
    (0..1u32 << num_vars)
        .map(|mask| (0..num_vars).map(|v| mask >> v & 1 == 1).collect::<Vec<_>>())
        .find(|model| clauses.iter().all(|c| satisfied(c, model)))
}

/// Same satisfiability before and after, and every model of the result
/// extends to a model of the input.
fn preserved(f: &Formula, opts: SimpOptions) -> bool {
    let engine = match Engine::new(SimpOptions {
        threads: 2,
        perf_report: false,
        min_pvars: 1,
        ..opts
    }) {
        Ok(engine) => engine,
        Err(_) => return false,
    };
    let original: Vec<Vec<Lit>> = f.clauses.iter().map(|c| to_lits(c)).collect();
    let mut simp = Simplifier::new(&engine, Cnf::from_dimacs(&f.clauses), f.num_vars);
    let report = simp.simplify().clone();
    let (cnf, units, model) = simp.into_parts();

    if report.clauses_after as usize != cnf.len() || report.lits_after != cnf.num_lits() {
        return false;
    }
    let mut remaining: Vec<Vec<Lit>> = cnf.iter().map(|(_, c)| c.to_vec()).collect();
    remaining.extend(units.iter().map(|&u| vec![u]));

    let before = brute_force(f.num_vars, &original);
    match brute_force(f.num_vars, &remaining) {
        None => before.is_none(),
        Some(mut m) => {
            model.extend(&mut m);
            before.is_some() && original.iter().all(|c| satisfied(c, &m))
        }
    }
}

#[quickcheck]
fn qc_elimination_preserves_models(f: Formula) -> bool {
    preserved(&f, SimpOptions::default())
}

#[quickcheck]
fn qc_all_techniques_preserve_models(f: Formula) -> bool {
    preserved(
        &f,
        SimpOptions {
            all: true,
            phases: 3,
            ..SimpOptions::default()
        },
    )
}

#[quickcheck]
fn qc_equivalence_passes_alone(f: Formula) -> bool {
    preserved(
        &f,
        SimpOptions {
            ve: false,
            sub: true,
            hre: true,
            cnf_free_freq: 1,
            ..SimpOptions::default()
        },
    )
}
