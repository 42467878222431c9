//! The simplification pipeline.
//!
//! Every stage takes the [`Engine`] it runs on plus the arena, occurrence
//! table and pass parameters it reads. Stages that melt clauses leave the
//! table stale; [`reduce_ot`] must run before it is read again.
//! [`Simplifier`] strings the stages together into phases.

mod bce;
mod count;
mod elect;
mod hre;
mod hse;
mod ot;
mod scores;
mod units;
mod ve;

pub use bce::bce;
pub use count::{count_cls, count_del_vars, count_lits, eval_reds};
pub use elect::elect;
pub use hre::hre;
pub use hse::{hse, HseCounts};
pub use ot::{create_ot, create_ot_async, reduce_ot};
pub use scores::{calc_var_scores, histogram};
pub use units::collect_units;
pub use ve::{calc_added, ve};

use crate::cnf::Cnf;
use crate::engine::Engine;
use crate::lit::Lit;
use crate::model::ModelStack;
use crate::occurs::OccurTable;
use crate::options::SimpOptions;
use crate::stats::PassParams;
use std::fmt;
use std::time::Instant;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimpReport {
    pub phases: u32,
    /// Phase bodies run, repeats included.
    pub rounds: u32,
    pub eliminated: u32,
    pub subsumed: u32,
    pub strengthened: u32,
    pub blocked: u32,
    pub hidden: u32,
    pub units: u32,
    pub clauses_before: u32,
    pub lits_before: u64,
    pub clauses_after: u32,
    pub lits_after: u64,
    pub del_vars: u32,
}

impl fmt::Display for SimpReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "c | phases: {} ({} rounds)", self.phases, self.rounds)?;
        writeln!(f, "c | clauses: {} -> {}", self.clauses_before, self.clauses_after)?;
        writeln!(f, "c | literals: {} -> {}", self.lits_before, self.lits_after)?;
        writeln!(f, "c | eliminated variables: {}", self.eliminated)?;
        writeln!(f, "c | removed variables: {}", self.del_vars)?;
        writeln!(f, "c | subsumed: {}, strengthened: {}", self.subsumed, self.strengthened)?;
        writeln!(f, "c | blocked: {}, hidden: {}", self.blocked, self.hidden)?;
        writeln!(f, "c | units: {}", self.units)
    }
}

/// Owns one formula through a full simplification run.
pub struct Simplifier<'e> {
    engine: &'e Engine,
    cnf: Cnf,
    ot: OccurTable,
    pv: PassParams,
    model: ModelStack,
    report: SimpReport,
    compactions: u32,
}

impl<'e> Simplifier<'e> {
    /// `num_vars` must cover every variable occurring in `cnf`.
    pub fn new(engine: &'e Engine, cnf: Cnf, num_vars: u32) -> Self {
        debug_assert!(cnf.iter().all(|(_, c)| c.lits().all(|l| l.var() < num_vars)));
        Simplifier {
            engine,
            cnf,
            ot: OccurTable::new(num_vars),
            pv: PassParams::new(num_vars),
            model: ModelStack::new(),
            report: SimpReport::default(),
            compactions: 0,
        }
    }

    pub fn cnf(&self) -> &Cnf {
        &self.cnf
    }

    pub fn occurs(&self) -> &OccurTable {
        &self.ot
    }

    pub fn params(&self) -> &PassParams {
        &self.pv
    }

    pub fn model(&self) -> &ModelStack {
        &self.model
    }

    pub fn units(&self) -> Vec<Lit> {
        self.pv.units()
    }

    pub fn report(&self) -> &SimpReport {
        &self.report
    }

    pub fn into_parts(self) -> (Cnf, Vec<Lit>, ModelStack) {
        let units = self.pv.units();
        (self.cnf, units, self.model)
    }

    /// Run every configured phase, then hand unit clauses over to the unit
    /// list and compact a last time.
    pub fn simplify(&mut self) -> &SimpReport {
        let opts = self.engine.options().clone();
        eval_reds(self.engine, &self.cnf, &mut self.pv.gstats);
        self.report.clauses_before = self.pv.gstats.num_clauses;
        self.report.lits_before = self.pv.gstats.num_lits;

        for phase in 0..opts.phases {
            let started = Instant::now();
            let mut exhausted = false;
            loop {
                let before = self.pv.gstats.num_lits;
                if !self.round(&opts) {
                    exhausted = true;
                    break;
                }
                self.compact(&opts);
                self.report.rounds += 1;
                let removed = before.saturating_sub(self.pv.gstats.num_lits);
                if !opts.ve_plus || removed <= opts.lit_rem_threshold as u64 {
                    break;
                }
            }
            self.pv.mu_inc += 1;
            if exhausted {
                tracing::debug!(phase, "too few candidates, stopping");
                break;
            }
            self.report.phases += 1;
            if opts.perf_report {
                tracing::info!(
                    phase,
                    clauses = self.pv.gstats.num_clauses,
                    lits = self.pv.gstats.num_lits,
                    del_vars = self.pv.gstats.num_del_vars,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "phase done"
                );
            }
        }

        self.report.units = collect_units(self.engine, &self.cnf, &self.pv);
        eval_reds(self.engine, &self.cnf, &mut self.pv.gstats);
        self.cnf.shrink();
        self.report.clauses_after = self.pv.gstats.num_clauses;
        self.report.lits_after = self.pv.gstats.num_lits;
        self.report.del_vars = self.pv.gstats.num_del_vars;
        &self.report
    }

    /// One phase body. Returns false when too few variables were elected
    /// for the phase to be worth running.
    fn round(&mut self, opts: &SimpOptions) -> bool {
        let engine = self.engine;
        let (cnf, pv) = (&self.cnf, &mut self.pv);
        create_ot_async(engine, cnf, &mut self.ot, || calc_var_scores(engine, cnf, None, pv));
        if elect(opts, &self.cnf, &self.ot, &mut self.pv) < opts.min_pvars as usize {
            return false;
        }

        if opts.ve {
            let (cls, lits) = calc_added(engine, &self.cnf, &self.ot, &self.pv);
            self.reserve(cls, lits);
            self.report.eliminated += ve(engine, &self.cnf, &self.ot, &self.pv, &mut self.model);
            reduce_ot(engine, &self.cnf, &self.ot);
        }
        if opts.sub_enabled() {
            let counts = hse(engine, &self.cnf, &self.ot, &self.pv);
            self.report.subsumed += counts.subsumed;
            self.report.strengthened += counts.strengthened;
            reduce_ot(engine, &self.cnf, &self.ot);
        }
        if opts.bce_enabled() {
            self.report.blocked += bce(engine, &self.cnf, &self.ot, &self.pv, &mut self.model);
            reduce_ot(engine, &self.cnf, &self.ot);
        }
        if opts.hre_enabled() {
            self.report.hidden += hre(engine, &self.cnf, &self.ot, &self.pv);
            reduce_ot(engine, &self.cnf, &self.ot);
        }

        eval_reds(engine, &self.cnf, &mut self.pv.gstats);
        true
    }

    /// Make room for `cls` more clauses and `lits` more literals. Moving to a
    /// bigger arena renumbers clauses, so the table is rebuilt.
    fn reserve(&mut self, cls: u32, lits: u64) {
        if self.cnf.free_clauses() >= cls as usize && self.cnf.free_lits() >= lits {
            return;
        }
        eval_reds(self.engine, &self.cnf, &mut self.pv.gstats);
        let gstats = &self.pv.gstats;
        let mut grown = Cnf::allocate((gstats.num_clauses + cls).max(1), (gstats.num_lits + lits).max(1));
        grown.copy_from(&self.cnf);
        tracing::debug!(clauses = grown.capacity(), lits = grown.lits_capacity(), "arena regrown");
        self.cnf = grown;
        create_ot(self.engine, &self.cnf, &mut self.ot);
    }

    /// Compact in place, or into a freshly sized arena every
    /// `cnf_free_freq` compactions. Needs counts from [`eval_reds`].
    fn compact(&mut self, opts: &SimpOptions) {
        self.compactions += 1;
        let freq = opts.cnf_free_freq as u32;
        if freq > 0 && self.compactions % freq == 0 {
            let gstats = &self.pv.gstats;
            let mut exact = Cnf::allocate(gstats.num_clauses.max(1), gstats.num_lits.max(1));
            exact.copy_from(&self.cnf);
            self.cnf = exact;
            tracing::debug!(clauses = self.cnf.capacity(), "arena reallocated");
        } else {
            self.cnf.shrink();
        }
    }
}

impl fmt::Debug for Simplifier<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simplifier")
            .field("cnf", &self.cnf)
            .field("model", &self.model.len())
            .field("report", &self.report)
            .finish()
    }
}
