use crate::cnf::{CRef, Cnf};
use crate::engine::Engine;
use crate::lit::{num_lits_for, Lit};
use crate::occurs::OccurTable;
use crate::stats::{PassParams, Score};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};

/// Occurrences of every literal code over the live clauses.
pub(crate) fn count_occurs(cnf: &Cnf, num_vars: u32) -> Vec<u32> {
    let hist: Vec<AtomicU32> = (0..num_lits_for(num_vars)).map(|_| AtomicU32::new(0)).collect();
    (0..cnf.len() as CRef).into_par_iter().for_each(|cref| {
        let c = cnf.clause(cref);
        if c.is_live() {
            for lit in c.lits() {
                hist[lit.index()].fetch_add(1, Ordering::Relaxed);
            }
        }
    });
    hist.into_iter().map(AtomicU32::into_inner).collect()
}

pub fn histogram(engine: &Engine, cnf: &Cnf, num_vars: u32) -> Vec<u32> {
    engine.install(|| count_occurs(cnf, num_vars))
}

/// Score every variable and store the scores in processing order. Counts
/// come from `ot` when one is current, from a histogram pass otherwise.
pub fn calc_var_scores(engine: &Engine, cnf: &Cnf, ot: Option<&OccurTable>, pv: &mut PassParams) {
    let num_vars = pv.num_vars();
    let mut scores = match ot {
        Some(ot) => (0..num_vars)
            .map(|v| Score::new(v, ot.len(Lit::positive(v)) as u32, ot.len(Lit::negative(v)) as u32))
            .collect::<Vec<_>>(),
        None => {
            let hist = histogram(engine, cnf, num_vars);
            (0..num_vars)
                .map(|v| Score::new(v, hist[Lit::positive(v).index()], hist[Lit::negative(v).index()]))
                .collect()
        }
    };
    scores.sort_unstable_by(Score::rank);
    tracing::trace!(num_vars, "scores computed");
    pv.scores = scores;
}
