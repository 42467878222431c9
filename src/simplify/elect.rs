use crate::atomic_bitset::AtomicBitSet;
use crate::cnf::Cnf;
use crate::lit::{Lit, Var};
use crate::occurs::OccurTable;
use crate::options::SimpOptions;
use crate::stats::PassParams;

fn temperature(mu: i64, inc: u32) -> u64 {
    (mu as u64).saturating_mul(1u64 << inc.min(63))
}

/// Least-constrained variable election.
///
/// Walks the scored variables in order and elects each one that passes the
/// occurrence limits and is not frozen. Electing `x` freezes every variable
/// sharing a clause with `x`, so no two elected variables ever meet in one
/// clause and each owns its clauses for the rest of the phase.
///
/// Expects scores from [`super::calc_var_scores`] and an occurrence table
/// built against `cnf`. Returns the number of elected variables.
pub fn elect(opts: &SimpOptions, cnf: &Cnf, ot: &OccurTable, pv: &mut PassParams) -> usize {
    let pos_limit = temperature(opts.mu_pos, pv.mu_inc).min(opts.ce_pos_limit as u64);
    let neg_limit = temperature(opts.mu_neg, pv.mu_inc).min(opts.ce_neg_limit as u64);
    let frozen = AtomicBitSet::new(pv.num_vars() as usize);
    let mut elected: Vec<Var> = Vec::new();

    for score in &pv.scores {
        let x = score.var;
        let (p, n) = (ot.len(Lit::positive(x)) as u64, ot.len(Lit::negative(x)) as u64);
        if p + n == 0 || p > pos_limit || n > neg_limit {
            continue;
        }
        if frozen.contains(x as usize) {
            continue;
        }
        elected.push(x);
        frozen.set(x as usize);
        for lit in [Lit::positive(x), Lit::negative(x)] {
            for cref in ot.occurs(lit) {
                let c = cnf.clause(cref);
                if c.is_live() {
                    c.lits().for_each(|l| frozen.set(l.var() as usize));
                }
            }
        }
    }

    pv.set_p_vars(&elected);
    tracing::debug!(elected = elected.len(), mu_inc = pv.mu_inc, "variables elected");
    elected.len()
}
