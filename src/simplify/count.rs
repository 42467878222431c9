use crate::cnf::{CRef, Cnf};
use crate::engine::Engine;
use crate::stats::GStats;
use rayon::prelude::*;

fn live_sizes(cnf: &Cnf) -> impl ParallelIterator<Item = usize> + '_ {
    (0..cnf.len() as CRef)
        .into_par_iter()
        .map(move |cref| cnf.clause(cref))
        .filter(|c| c.is_live())
        .map(|c| c.size())
}

pub fn count_cls(engine: &Engine, cnf: &Cnf, gstats: &mut GStats) {
    gstats.num_clauses = engine.install(|| live_sizes(cnf).count()) as u32;
}

pub fn count_lits(engine: &Engine, cnf: &Cnf, gstats: &mut GStats) {
    gstats.num_lits = engine.install(|| live_sizes(cnf).map(|n| n as u64).sum());
}

/// Variables that no longer occur in any live clause.
pub fn count_del_vars(engine: &Engine, cnf: &Cnf, gstats: &mut GStats) {
    gstats.seen.clear_all();
    let seen = &gstats.seen;
    engine.install(|| {
        (0..cnf.len() as CRef).into_par_iter().for_each(|cref| {
            let c = cnf.clause(cref);
            if c.is_live() {
                c.lits().for_each(|l| seen.set(l.var() as usize));
            }
        })
    });
    gstats.num_del_vars = (gstats.seen.capacity() - gstats.seen.count()) as u32;
}

/// Every count at once; sizes the next arena.
pub fn eval_reds(engine: &Engine, cnf: &Cnf, gstats: &mut GStats) {
    count_cls(engine, cnf, gstats);
    count_lits(engine, cnf, gstats);
    count_del_vars(engine, cnf, gstats);
    tracing::debug!(
        clauses = gstats.num_clauses,
        lits = gstats.num_lits,
        del_vars = gstats.num_del_vars,
        "formula counted"
    );
}
