use crate::atomic_bitset::AtomicBitSet;
use crate::bounded_vec::FixedVec;
use crate::lit::{num_lits_for, Lit, Var};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;

/// Aggregate counts of one arena generation, used to size the next one.
pub struct GStats {
    /// Scratch marks, one per variable.
    pub seen: AtomicBitSet,
    pub num_lits: u64,
    pub num_del_vars: u32,
    pub num_clauses: u32,
}

impl GStats {
    pub fn new(num_vars: u32) -> Self {
        GStats {
            seen: AtomicBitSet::new(num_vars as usize),
            num_lits: 0,
            num_del_vars: 0,
            num_clauses: 0,
        }
    }
}

impl std::fmt::Debug for GStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GStats")
            .field("num_lits", &self.num_lits)
            .field("num_del_vars", &self.num_del_vars)
            .field("num_clauses", &self.num_clauses)
            .finish()
    }
}

/// Elimination priority of a variable. Cheaper variables score higher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Score {
    pub var: Var,
    pub pos: u32,
    pub neg: u32,
    pub score: OrderedFloat<f64>,
}

impl Score {
    pub fn new(var: Var, pos: u32, neg: u32) -> Self {
        let cost = if pos == 0 || neg == 0 {
            pos.max(neg) as f64
        } else {
            pos as f64 * neg as f64
        };
        Score {
            var,
            pos,
            neg,
            score: OrderedFloat(1.0 / (1.0 + cost)),
        }
    }

    pub fn occurs(&self) -> u32 {
        self.pos + self.neg
    }

    /// Processing order: higher score first, ties by variable index.
    pub fn rank(a: &Score, b: &Score) -> Ordering {
        b.score.cmp(&a.score).then(a.var.cmp(&b.var))
    }
}

/// Working set of one simplification phase.
pub struct PassParams {
    /// Candidate variables elected for this phase.
    pub p_vars: FixedVec,
    /// Literals found to be forced this round.
    pub units: FixedVec,
    unit_marks: AtomicBitSet,
    elected: AtomicBitSet,
    pub scores: Vec<Score>,
    pub gstats: GStats,
    pub num_pvs: u32,
    /// Freezing-temperature increment, raised every phase.
    pub mu_inc: u32,
}

impl PassParams {
    pub fn new(num_vars: u32) -> Self {
        PassParams {
            p_vars: FixedVec::with_capacity(num_vars as usize),
            units: FixedVec::with_capacity(num_lits_for(num_vars)),
            unit_marks: AtomicBitSet::new(num_lits_for(num_vars)),
            elected: AtomicBitSet::new(num_vars as usize),
            scores: Vec::new(),
            gstats: GStats::new(num_vars),
            num_pvs: 0,
            mu_inc: 0,
        }
    }

    pub fn num_vars(&self) -> u32 {
        self.gstats.seen.capacity() as u32
    }

    /// Record a unit literal once; returns whether it was new.
    pub fn record_unit(&self, lit: Lit) -> bool {
        if self.unit_marks.test_and_set(lit.index()) {
            return false;
        }
        let pushed = self.units.push(lit.code());
        assert!(pushed, "unit list overflow");
        true
    }

    pub fn units(&self) -> Vec<Lit> {
        self.units.iter().map(Lit::from_code).collect()
    }

    pub fn p_vars(&self) -> Vec<Var> {
        self.p_vars.to_vec()
    }

    pub fn set_p_vars(&mut self, vars: &[Var]) {
        self.elected.clear_all();
        for &v in vars {
            self.elected.set(v as usize);
        }
        self.p_vars.assign_from(vars);
        self.num_pvs = vars.len() as u32;
    }

    pub fn is_elected(&self, var: Var) -> bool {
        self.elected.contains(var as usize)
    }
}
