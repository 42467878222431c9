use crate::cnf::{CRef, Cnf};
use crate::engine::Engine;
use crate::stats::PassParams;
use rayon::prelude::*;

/// Move every live unit clause into the unit list and melt it. Returns the
/// number of unit clauses taken out of the arena.
pub fn collect_units(engine: &Engine, cnf: &Cnf, pv: &PassParams) -> u32 {
    let melted = engine.install(|| {
        (0..cnf.len() as CRef)
            .into_par_iter()
            .filter(|&cref| {
                let c = cnf.clause(cref);
                if !c.is_live() || c.size() != 1 {
                    return false;
                }
                pv.record_unit(c.lit(0));
                c.melt();
                true
            })
            .count()
    });
    tracing::debug!(melted, units = pv.units.len(), "units collected");
    melted as u32
}
