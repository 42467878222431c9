use crate::cnf::{CRef, Cnf};
use crate::engine::Engine;
use crate::lit::{Lit, Var};
use crate::occurs::OccurTable;
use crate::stats::PassParams;
use rayon::prelude::*;

/// Hidden literal addition on clause `cref`: for every binary `(l ∨ k)`
/// with `l` in the extended clause, add `!k`. True when the extension turns
/// into a tautology before growing past `out_limit` literals.
///
/// Binaries touching an elected variable other than `x` belong to another
/// task and are never used.
fn hidden_tautology(cnf: &Cnf, ot: &OccurTable, pv: &PassParams, cref: CRef, x: Var, out_limit: usize) -> bool {
    let usable = |v: Var| v == x || !pv.is_elected(v);
    let mut ext = cnf.clause(cref).to_vec();
    let mut i = 0;
    while i < ext.len() {
        let l = ext[i];
        for bref in ot.occurs(l) {
            let b = cnf.clause(bref);
            if bref == cref || b.size() != 2 {
                continue;
            }
            let k = if b.lit(0) == l { b.lit(1) } else { b.lit(0) };
            if !usable(k.var()) || !b.is_live() {
                continue;
            }
            if ext.contains(&k) {
                return true;
            }
            if !ext.contains(&!k) {
                if ext.len() == out_limit {
                    return false;
                }
                ext.push(!k);
            }
        }
        i += 1;
    }
    false
}

fn hre_var(cnf: &Cnf, ot: &OccurTable, pv: &PassParams, x: Var, in_limit: usize, out_limit: usize) -> u32 {
    let mut removed = 0;
    for lit in [Lit::positive(x), Lit::negative(x)] {
        for cref in ot.occurs(lit) {
            let c = cnf.clause(cref);
            if !c.is_live() || c.size() > in_limit {
                continue;
            }
            if hidden_tautology(cnf, ot, pv, cref, x, out_limit) {
                tracing::trace!(clause = cref, var = x + 1, "hidden tautology");
                c.melt();
                removed += 1;
            }
        }
    }
    removed
}

/// Hidden tautology elimination over the clauses of every elected variable.
/// Removed clauses are implied by the rest of the formula, so nothing goes to
/// the model stack. Returns the number of clauses melted.
pub fn hre(engine: &Engine, cnf: &Cnf, ot: &OccurTable, pv: &PassParams) -> u32 {
    let opts = engine.options();
    let (in_limit, out_limit) = (opts.hre_in_limit as usize, opts.hre_out_limit as usize);
    let p_vars = pv.p_vars();
    let removed = engine.install(|| {
        p_vars
            .par_iter()
            .map(|&x| hre_var(cnf, ot, pv, x, in_limit, out_limit))
            .sum::<u32>()
    });
    tracing::debug!(removed, "hidden redundancy elimination done");
    removed
}
