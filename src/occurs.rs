use crate::bounded_vec::{backing, Backing, BoundedVec};
use crate::cnf::{CRef, Cnf};
use crate::lit::{num_lits_for, Lit, Var};
use std::fmt;
use std::sync::atomic::AtomicU32;

/// Occurrence table: one bounded list of clause references per literal, all
/// laid out over a single entry region.
///
/// Valid for one arena generation. Entries are only ever removed between
/// rebuilds.
pub struct OccurTable {
    lists: Box<[BoundedVec]>,
    occurs: Backing,
    max_entries: u64,
    num_vars: u32,
}

impl OccurTable {
    pub fn new(num_vars: u32) -> Self {
        let lists = (0..num_lits_for(num_vars)).map(|_| BoundedVec::new()).collect();
        OccurTable {
            lists,
            occurs: backing(0),
            max_entries: 0,
            num_vars,
        }
    }

    /// Lay out every list with the given per-literal capacities, indexed by
    /// literal code, and empty them all.
    pub fn assign_ptrs(&mut self, caps: &[u32]) {
        assert_eq!(caps.len(), self.lists.len(), "one capacity per literal expected");
        let mut base = 0usize;
        for (list, &cap) in self.lists.iter_mut().zip(caps) {
            list.assign(base, cap);
            base += cap as usize;
        }
        if base > self.occurs.len() {
            self.occurs = backing(base);
        }
        self.max_entries = base as u64;
    }

    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    /// Number of lists.
    pub fn size(&self) -> usize {
        self.lists.len()
    }

    /// Total entry capacity over all lists.
    pub fn capacity(&self) -> u64 {
        self.max_entries
    }

    pub fn list(&self, lit: Lit) -> &BoundedVec {
        &self.lists[lit.index()]
    }

    pub(crate) fn lists(&self) -> &[BoundedVec] {
        &self.lists
    }

    pub(crate) fn store(&self) -> &[AtomicU32] {
        &self.occurs
    }

    pub fn push(&self, lit: Lit, cref: CRef) -> bool {
        self.list(lit).push(&self.occurs, cref)
    }

    pub fn remove(&self, lit: Lit, cref: CRef) -> bool {
        self.list(lit).remove(&self.occurs, cref)
    }

    pub fn len(&self, lit: Lit) -> usize {
        self.list(lit).len()
    }

    pub fn occurs(&self, lit: Lit) -> impl Iterator<Item = CRef> + '_ {
        self.list(lit).iter(&self.occurs)
    }

    pub fn to_vec(&self, lit: Lit) -> Vec<CRef> {
        self.list(lit).to_vec(&self.occurs)
    }

    /// Scan for lists that outgrew their capacity. Any hit means the sizing
    /// pass was wrong; callers treat `true` as fatal.
    pub fn acc_violation(&self) -> bool {
        let mut violated = false;
        for v in 0..self.num_vars {
            for lit in [Lit::positive(v), Lit::negative(v)] {
                let list = self.list(lit);
                if list.overflowed() {
                    tracing::error!(
                        list = lit.to_dimacs(),
                        cap = list.capacity(),
                        size = list.raw_len(),
                        "occurrence list exceeded its allocated capacity"
                    );
                    violated = true;
                }
            }
        }
        violated
    }

    pub fn print(&self, f: &mut impl fmt::Write) -> fmt::Result {
        for v in 0..self.num_vars {
            for lit in [Lit::positive(v), Lit::negative(v)] {
                let list = self.list(lit);
                write!(f, "c | list[{}][cap = {}]", lit.to_dimacs(), list.capacity())?;
                list.write(&self.occurs, f, false)?;
            }
        }
        Ok(())
    }

    /// Print every clause containing `var` in either polarity.
    pub fn print_clause_set(&self, cnf: &Cnf, var: Var, f: &mut impl fmt::Write) -> fmt::Result {
        for lit in [Lit::positive(var), Lit::negative(var)] {
            for cref in self.occurs(lit) {
                write!(f, "c | ")?;
                cnf.clause(cref).write(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for OccurTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OccurTable")
            .field("lists", &self.lists.len())
            .field("capacity", &self.max_entries)
            .finish()
    }
}
