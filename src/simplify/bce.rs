use crate::clause::SClause;
use crate::cnf::Cnf;
use crate::engine::Engine;
use crate::lit::{Lit, Var};
use crate::model::ModelStack;
use crate::occurs::OccurTable;
use crate::stats::PassParams;
use rayon::prelude::*;

/// Resolving `c` and `d` on `lit` yields a tautology.
fn taut_resolvent(c: &SClause, d: &SClause, lit: Lit) -> bool {
    c.lits().filter(|&l| l != lit).any(|l| d.has(!l))
}

fn bce_var(cnf: &Cnf, ot: &OccurTable, x: Var, fan_limit: usize, in_limit: usize) -> Vec<(Lit, Vec<Lit>)> {
    let mut blocked = Vec::new();
    let (pos, neg) = (Lit::positive(x), Lit::negative(x));
    if ot.len(pos) > fan_limit || ot.len(neg) > fan_limit {
        return blocked;
    }
    for lit in [pos, neg] {
        for cref in ot.occurs(lit) {
            let c = cnf.clause(cref);
            if !c.is_live() || c.size() > in_limit {
                continue;
            }
            let is_blocked = ot
                .occurs(!lit)
                .map(|dref| cnf.clause(dref))
                .filter(|d| d.is_live())
                .all(|d| taut_resolvent(&c, &d, lit));
            if is_blocked {
                blocked.push((lit, c.to_vec()));
                c.melt();
            }
        }
    }
    blocked
}

/// Blocked clause elimination on the elected variables. Blocked clauses are
/// melted and pushed to `model` with the blocking literal as witness.
/// Returns the number of clauses removed.
pub fn bce(engine: &Engine, cnf: &Cnf, ot: &OccurTable, pv: &PassParams, model: &mut ModelStack) -> u32 {
    let opts = engine.options();
    let (fan_limit, in_limit) = (opts.fan_limit as usize, opts.bce_in_limit as usize);
    let p_vars = pv.p_vars();
    let found: Vec<Vec<(Lit, Vec<Lit>)>> = engine.install(|| {
        p_vars
            .par_iter()
            .map(|&x| bce_var(cnf, ot, x, fan_limit, in_limit))
            .collect()
    });
    let mut removed = 0;
    for (witness, clause) in found.into_iter().flatten() {
        model.push(witness, clause);
        removed += 1;
    }
    tracing::debug!(removed, "blocked clause elimination done");
    removed
}
