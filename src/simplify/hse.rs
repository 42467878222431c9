use crate::clause::{ClauseStatus, SClause};
use crate::cnf::{CRef, Cnf};
use crate::engine::Engine;
use crate::lit::{signature, Lit, Var};
use crate::occurs::OccurTable;
use crate::stats::PassParams;
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HseCounts {
    pub subsumed: u32,
    pub strengthened: u32,
}

impl std::ops::Add for HseCounts {
    type Output = HseCounts;

    fn add(self, o: HseCounts) -> HseCounts {
        HseCounts {
            subsumed: self.subsumed + o.subsumed,
            strengthened: self.strengthened + o.strengthened,
        }
    }
}

/// `c ⊆ d`, ignoring `skip` in `c`. Both clauses must be sorted.
fn subset_except(c: &SClause, d: &SClause, skip: Lit) -> bool {
    c.lits().filter(|&l| l != skip).all(|l| d.has(l))
}

/// Strengthen clauses on `!lit` with clauses on `lit`: when `c \ {lit}` is a
/// subset of `d`, `!lit` is dropped from `d`.
fn self_subsume(cnf: &Cnf, ot: &OccurTable, lit: Lit) -> u32 {
    let mut strengthened = 0;
    let targets = ot.to_vec(!lit);
    for cref in ot.to_vec(lit) {
        let c = cnf.clause(cref);
        // a tautology on `lit` resolves back to `d` itself
        if !c.is_live() || c.has(!lit) {
            continue;
        }
        let sig = signature(c.lits().filter(|&l| l != lit));
        for &dref in &targets {
            let d = cnf.clause(dref);
            if dref == cref || !d.is_live() || d.size() <= 2 || d.size() < c.size() {
                continue;
            }
            if sig & !d.sig() != 0 || !d.has(!lit) {
                continue;
            }
            if subset_except(&c, &d, lit) {
                d.remove_lit(!lit);
                ot.remove(!lit, dref);
                strengthened += 1;
            }
        }
    }
    strengthened
}

/// Melt every clause on `lit` subsumed by a smaller (or earlier equal) one.
fn subsume(cnf: &Cnf, ot: &OccurTable, lit: Lit) -> u32 {
    let mut list: Vec<CRef> = ot.to_vec(lit);
    list.sort_by_key(|&cref| (cnf.clause(cref).size(), cref));
    let mut subsumed = 0;
    for (i, &cref) in list.iter().enumerate() {
        let c = cnf.clause(cref);
        if !c.is_live() {
            continue;
        }
        for &dref in &list[i + 1..] {
            let d = cnf.clause(dref);
            if !d.is_live() || c.sig() & !d.sig() != 0 {
                continue;
            }
            if subset_except(&c, &d, lit) {
                if c.status() == ClauseStatus::Learnt && d.status() == ClauseStatus::Original {
                    c.set_status(ClauseStatus::Original);
                }
                d.melt();
                subsumed += 1;
            }
        }
    }
    subsumed
}

fn hse_var(cnf: &Cnf, ot: &OccurTable, x: Var, in_limit: usize) -> HseCounts {
    let (pos, neg) = (Lit::positive(x), Lit::negative(x));
    let total: usize = ot
        .occurs(pos)
        .chain(ot.occurs(neg))
        .map(|cref| cnf.clause(cref).size())
        .sum();
    if total > in_limit {
        return HseCounts::default();
    }
    let strengthened = self_subsume(cnf, ot, pos) + self_subsume(cnf, ot, neg);
    let subsumed = subsume(cnf, ot, pos) + subsume(cnf, ot, neg);
    HseCounts {
        subsumed,
        strengthened,
    }
}

/// Subsumption and self-subsuming strengthening around every elected
/// variable. Subsumed clauses are melted; strengthened clauses lose the
/// elected literal in place and leave its occurrence list.
pub fn hse(engine: &Engine, cnf: &Cnf, ot: &OccurTable, pv: &PassParams) -> HseCounts {
    let in_limit = engine.options().hse_in_limit as usize;
    let p_vars = pv.p_vars();
    let counts = engine.install(|| {
        p_vars
            .par_iter()
            .map(|&x| hse_var(cnf, ot, x, in_limit))
            .reduce(HseCounts::default, |a, b| a + b)
    });
    tracing::debug!(subsumed = counts.subsumed, strengthened = counts.strengthened, "subsumption done");
    counts
}
