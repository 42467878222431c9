use crate::clause::{ClauseStatus, SClause};
use crate::cnf::{CRef, Cnf};
use crate::engine::Engine;
use crate::lit::{Lit, Var};
use crate::model::ModelStack;
use crate::occurs::OccurTable;
use crate::stats::PassParams;
use itertools::Itertools;
use rayon::prelude::*;

fn live_clauses<'a>(cnf: &'a Cnf, ot: &'a OccurTable, lit: Lit) -> Vec<(CRef, SClause<'a>)> {
    ot.occurs(lit)
        .map(|cref| (cref, cnf.clause(cref)))
        .filter(|(_, c)| c.is_live())
        .collect()
}

/// Resolvent of `p` (containing `pivot`) and `n` (containing `!pivot`),
/// sorted and duplicate-free, or `None` when it is a tautology.
pub(crate) fn resolve(p: &SClause, n: &SClause, pivot: Lit) -> Option<Vec<Lit>> {
    let out: Vec<Lit> = p
        .lits()
        .filter(|&l| l != pivot)
        .merge(n.lits().filter(|&l| l != !pivot))
        .dedup()
        .collect();
    // complementary literals sort next to each other
    if out.iter().tuple_windows().any(|(a, b)| a.var() == b.var()) {
        return None;
    }
    Some(out)
}

/// Every non-tautological resolvent on `x`, or `None` when eliminating `x`
/// would grow the formula, exceed `out_limit` literals, or derive the empty
/// clause.
fn resolvents(cnf: &Cnf, ot: &OccurTable, x: Var, out_limit: usize) -> Option<Vec<Vec<Lit>>> {
    let pos = live_clauses(cnf, ot, Lit::positive(x));
    let neg = live_clauses(cnf, ot, Lit::negative(x));
    if pos.is_empty() || neg.is_empty() {
        return Some(Vec::new());
    }
    let max_clauses = pos.len() + neg.len();
    let max_lits = pos.iter().chain(&neg).map(|(_, c)| c.size()).sum::<usize>().min(out_limit);
    let mut out = Vec::new();
    let mut added_lits = 0;
    for ((_, p), (_, n)) in pos.iter().cartesian_product(&neg) {
        let Some(r) = resolve(p, n, Lit::positive(x)) else {
            continue;
        };
        if r.is_empty() {
            return None;
        }
        added_lits += r.len();
        out.push(r);
        if out.len() > max_clauses || added_lits > max_lits {
            return None;
        }
    }
    Some(out)
}

/// Clauses and literals `ve` will append, so the arena can be sized first.
pub fn calc_added(engine: &Engine, cnf: &Cnf, ot: &OccurTable, pv: &PassParams) -> (u32, u64) {
    let out_limit = engine.options().bve_out_limit as usize;
    let p_vars = pv.p_vars();
    let (cls, lits) = engine.install(|| {
        p_vars
            .par_iter()
            .filter_map(|&x| resolvents(cnf, ot, x, out_limit))
            .map(|rs| (rs.len() as u32, rs.iter().map(|r| r.len() as u64).sum::<u64>()))
            .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1))
    });
    tracing::debug!(clauses = cls, lits, "resolvent space computed");
    (cls, lits)
}

/// Bounded variable elimination over the elected variables.
///
/// An eliminated variable's clauses are melted and pushed to `model` with
/// the pivot literal as witness; its resolvents are appended to the arena.
/// The arena must have room for everything [`calc_added`] reported.
/// Returns the number of eliminated variables.
pub fn ve(engine: &Engine, cnf: &Cnf, ot: &OccurTable, pv: &PassParams, model: &mut ModelStack) -> u32 {
    let out_limit = engine.options().bve_out_limit as usize;
    let p_vars = pv.p_vars();
    let removed: Vec<Vec<(Lit, Vec<Lit>)>> = engine.install(|| {
        p_vars
            .par_iter()
            .map(|&x| {
                let Some(rs) = resolvents(cnf, ot, x, out_limit) else {
                    return Vec::new();
                };
                for r in &rs {
                    cnf.push_sorted(r, ClauseStatus::Original);
                    if let [unit] = r.as_slice() {
                        pv.record_unit(*unit);
                    }
                }
                let mut gone = Vec::new();
                for lit in [Lit::positive(x), Lit::negative(x)] {
                    for (_, c) in live_clauses(cnf, ot, lit) {
                        gone.push((lit, c.to_vec()));
                        c.melt();
                    }
                }
                tracing::trace!(var = x + 1, resolvents = rs.len(), removed = gone.len(), "eliminated");
                gone
            })
            .collect()
    });
    let mut eliminated = 0;
    for gone in removed.into_iter().filter(|g| !g.is_empty()) {
        eliminated += 1;
        for (witness, clause) in gone {
            model.push(witness, clause);
        }
    }
    tracing::debug!(eliminated, "variable elimination done");
    eliminated
}
