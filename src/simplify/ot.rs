use super::scores::count_occurs;
use crate::cnf::{CRef, Cnf};
use crate::engine::Engine;
use crate::occurs::OccurTable;
use rayon::prelude::*;

fn build(cnf: &Cnf, ot: &mut OccurTable) {
    let caps = count_occurs(cnf, ot.num_vars());
    ot.assign_ptrs(&caps);
    let table = &*ot;
    (0..cnf.len() as CRef).into_par_iter().for_each(|cref| {
        let c = cnf.clause(cref);
        if c.is_live() {
            for lit in c.lits() {
                table.push(lit, cref);
            }
        }
    });
    // push order depends on scheduling
    table.lists().par_iter().for_each(|list| list.sort(table.store()));
    debug_assert!(!table.acc_violation());
}

/// Rebuild `ot` from scratch against the current arena.
pub fn create_ot(engine: &Engine, cnf: &Cnf, ot: &mut OccurTable) {
    engine.install(|| build(cnf, ot));
    tracing::debug!(entries = ot.capacity(), "occurrence table built");
}

/// Same as [`create_ot`], overlapped with `work`. Returns what `work` returns.
pub fn create_ot_async<R: Send>(
    engine: &Engine,
    cnf: &Cnf,
    ot: &mut OccurTable,
    work: impl FnOnce() -> R + Send,
) -> R {
    let ((), out) = engine.install(|| rayon::join(|| build(cnf, ot), work));
    tracing::debug!(entries = ot.capacity(), "occurrence table built (overlapped)");
    out
}

/// Drop entries of clauses that are no longer live. Returns the number of
/// entries removed.
pub fn reduce_ot(engine: &Engine, cnf: &Cnf, ot: &OccurTable) -> usize {
    let removed = engine.install(|| {
        ot.lists()
            .par_iter()
            .map(|list| list.retain(ot.store(), |cref| cnf.clause(cref).is_live()))
            .sum::<usize>()
    });
    tracing::trace!(removed, "occurrence table reduced");
    removed
}
