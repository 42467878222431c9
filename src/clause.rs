use crate::lit::Lit;
use itertools::Itertools;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClauseStatus {
    Original,
    Learnt,
    Deleted,
}

impl ClauseStatus {
    fn to_u8(self) -> u8 {
        match self {
            ClauseStatus::Original => 0,
            ClauseStatus::Learnt => 1,
            ClauseStatus::Deleted => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => ClauseStatus::Original,
            1 => ClauseStatus::Learnt,
            2 => ClauseStatus::Deleted,
            _ => panic!("corrupted clause status byte {v}"),
        }
    }

    fn tag(self) -> char {
        match self {
            ClauseStatus::Original => 'O',
            ClauseStatus::Learnt => 'A',
            ClauseStatus::Deleted => 'X',
        }
    }
}

/// Per-clause record stored in the arena's clause region.
///
/// The literal block is addressed by an offset into the arena's literal
/// region, never by address. The staged-for-deletion flag (`molten`) is kept
/// apart from the status so melting and freezing never disturb it.
pub struct ClauseHeader {
    start: AtomicU64,
    size: AtomicU32,
    sig: AtomicU32,
    status: AtomicU8,
    molten: AtomicBool,
}

impl ClauseHeader {
    /// A slot that holds no clause yet; compaction drops it.
    pub fn empty() -> Self {
        ClauseHeader {
            start: AtomicU64::new(0),
            size: AtomicU32::new(0),
            sig: AtomicU32::new(0),
            status: AtomicU8::new(ClauseStatus::Deleted.to_u8()),
            molten: AtomicBool::new(false),
        }
    }

    pub(crate) fn install(&self, start: u64, size: u32, sig: u32, status: ClauseStatus) {
        self.start.store(start, Ordering::Relaxed);
        self.size.store(size, Ordering::Relaxed);
        self.sig.store(sig, Ordering::Relaxed);
        self.molten.store(false, Ordering::Relaxed);
        self.status.store(status.to_u8(), Ordering::Release);
    }

    pub(crate) fn start(&self) -> u64 {
        self.start.load(Ordering::Relaxed)
    }

    pub(crate) fn encode(&self) -> [u32; 5] {
        let start = self.start();
        let state = self.status.load(Ordering::Acquire) as u32
            | (self.molten.load(Ordering::Relaxed) as u32) << 7;
        [
            start as u32,
            (start >> 32) as u32,
            self.size.load(Ordering::Relaxed),
            self.sig.load(Ordering::Relaxed),
            state,
        ]
    }

    pub(crate) fn decode(words: &[u32]) -> Self {
        let header = ClauseHeader::empty();
        header.start.store(words[0] as u64 | (words[1] as u64) << 32, Ordering::Relaxed);
        header.size.store(words[2], Ordering::Relaxed);
        header.sig.store(words[3], Ordering::Relaxed);
        header.status.store((words[4] & 0x7f) as u8, Ordering::Relaxed);
        header.molten.store(words[4] >> 7 != 0, Ordering::Relaxed);
        header
    }
}

/// A view of one clause: its header plus the arena's literal region.
///
/// All state lives in atomics, so views are freely shared between tasks. A
/// task may only mutate clauses it owns for the current stage.
#[derive(Clone, Copy)]
pub struct SClause<'a> {
    header: &'a ClauseHeader,
    lits: &'a [AtomicU32],
}

impl<'a> SClause<'a> {
    pub(crate) fn new(header: &'a ClauseHeader, lits: &'a [AtomicU32]) -> Self {
        SClause { header, lits }
    }

    pub fn size(&self) -> usize {
        self.header.size.load(Ordering::Acquire) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn start(&self) -> u64 {
        self.header.start()
    }

    pub(crate) fn set_start(&self, start: u64) {
        self.header.start.store(start, Ordering::Relaxed);
    }

    pub fn resize(&self, size: usize) {
        self.header.size.store(size as u32, Ordering::Release);
    }

    pub fn sig(&self) -> u32 {
        self.header.sig.load(Ordering::Relaxed)
    }

    pub fn set_sig(&self, sig: u32) {
        self.header.sig.store(sig, Ordering::Relaxed);
    }

    /// Recompute the signature from the current literals.
    pub fn calc_sig(&self) -> u32 {
        let sig = crate::lit::signature(self.lits());
        self.set_sig(sig);
        sig
    }

    pub fn status(&self) -> ClauseStatus {
        ClauseStatus::from_u8(self.header.status.load(Ordering::Acquire))
    }

    /// Change the status of a clause that has not been deleted.
    pub fn set_status(&self, status: ClauseStatus) {
        let prev = self.header.status.swap(status.to_u8(), Ordering::AcqRel);
        assert_ne!(
            ClauseStatus::from_u8(prev),
            ClauseStatus::Deleted,
            "status change on a deleted clause"
        );
    }

    pub fn mark_deleted(&self) {
        self.header
            .status
            .store(ClauseStatus::Deleted.to_u8(), Ordering::Release);
    }

    pub fn is_deleted(&self) -> bool {
        self.status() == ClauseStatus::Deleted
    }

    pub fn molten(&self) -> bool {
        self.header.molten.load(Ordering::Acquire)
    }

    /// Stage for deletion.
    pub fn melt(&self) {
        self.header.molten.store(true, Ordering::Release);
    }

    /// Unstage.
    pub fn freeze(&self) {
        self.header.molten.store(false, Ordering::Release);
    }

    /// Neither deleted nor staged for deletion.
    pub fn is_live(&self) -> bool {
        !self.is_deleted() && !self.molten()
    }

    fn cell(&self, i: usize) -> &'a AtomicU32 {
        &self.lits[self.start() as usize + i]
    }

    pub fn lit(&self, i: usize) -> Lit {
        assert!(i < self.size(), "literal {i} out of clause of size {}", self.size());
        Lit::from_code(self.cell(i).load(Ordering::Relaxed))
    }

    pub fn set_lit(&self, i: usize, lit: Lit) {
        self.cell(i).store(lit.code(), Ordering::Relaxed);
    }

    pub fn lits(&self) -> impl Iterator<Item = Lit> + 'a {
        let start = self.start() as usize;
        self.lits[start..start + self.size()]
            .iter()
            .map(|cell| Lit::from_code(cell.load(Ordering::Relaxed)))
    }

    pub fn to_vec(&self) -> Vec<Lit> {
        self.lits().collect()
    }

    pub fn is_sorted(&self) -> bool {
        self.lits().tuple_windows().all(|(a, b)| a <= b)
    }

    /// Membership test. Binary clauses compare directly; longer clauses must
    /// be sorted and are binary searched, bailing out early when `lit` lies
    /// outside the clause's value range.
    pub fn has(&self, lit: Lit) -> bool {
        let size = self.size();
        if size == 0 {
            return false;
        }
        if size == 2 {
            return self.lit(0) == lit || self.lit(1) == lit;
        }
        debug_assert!(self.is_sorted(), "has() on unsorted clause");
        let (mut low, mut high) = (0usize, size - 1);
        if lit < self.lit(low) || lit > self.lit(high) {
            return false;
        }
        while low <= high {
            let mid = (low + high) >> 1;
            let m = self.lit(mid);
            if m < lit {
                low = mid + 1;
            } else if m > lit {
                if mid == 0 {
                    return false;
                }
                high = mid - 1;
            } else {
                return true;
            }
        }
        false
    }

    /// Remove adjacent duplicates of a sorted clause and recompute the signature.
    pub fn filter(&self) {
        let size = self.size();
        if size == 0 {
            self.set_sig(0);
            return;
        }
        let mut prev = self.lit(0);
        let mut sig = prev.hash_bit();
        let mut new_size = 1;
        for k in 1..size {
            let next = self.lit(k);
            if next != prev {
                self.set_lit(new_size, next);
                new_size += 1;
                sig |= next.hash_bit();
                prev = next;
            }
        }
        self.resize(new_size);
        self.set_sig(sig);
    }

    /// Copy literals, size, signature and status of `src`. The destination
    /// block must already be large enough.
    pub fn copy_from(&self, src: &SClause) {
        assert!(!src.is_deleted(), "copy from a deleted clause");
        for (i, lit) in src.lits().enumerate() {
            self.set_lit(i, lit);
        }
        self.resize(src.size());
        self.set_sig(src.sig());
        self.header
            .status
            .store(src.status().to_u8(), Ordering::Release);
        self.header.molten.store(false, Ordering::Release);
    }

    /// Copy a raw literal buffer; the signature is left untouched.
    pub fn copy_from_lits(&self, src: &[Lit]) {
        for (i, &lit) in src.iter().enumerate() {
            self.set_lit(i, lit);
        }
        self.resize(src.len());
    }

    /// Copy a sorted scratch buffer back into the clause, dropping adjacent
    /// duplicates and recomputing the signature on the way.
    pub fn copy_shared(&self, src: &[Lit]) {
        let Some(&first) = src.first() else {
            self.resize(0);
            self.set_sig(0);
            return;
        };
        self.set_lit(0, first);
        let mut sig = first.hash_bit();
        let mut size = 1;
        for w in src.windows(2) {
            if w[0] != w[1] {
                self.set_lit(size, w[1]);
                sig |= w[1].hash_bit();
                size += 1;
            }
        }
        self.resize(size);
        self.set_sig(sig);
    }

    /// Append the literals to a task-local scratch buffer.
    pub fn share_to(&self, dest: &mut Vec<Lit>) {
        assert!(self.size() > 1, "sharing a clause of size {}", self.size());
        dest.extend(self.lits());
    }

    /// Remove one literal, keeping the others in order.
    pub fn remove_lit(&self, lit: Lit) -> bool {
        let size = self.size();
        let Some(pos) = self.lits().position(|l| l == lit) else {
            return false;
        };
        for k in pos + 1..size {
            self.set_lit(k - 1, self.lit(k));
        }
        self.resize(size - 1);
        self.calc_sig();
        true
    }

    pub fn write(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "(")?;
        for lit in self.lits() {
            write!(f, "{:4} ", lit.to_dimacs())?;
        }
        writeln!(f, ") {}, s={:#x}", self.status().tag(), self.sig())
    }
}

impl fmt::Debug for SClause<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SClause")
            .field("lits", &self.to_vec())
            .field("status", &self.status())
            .field("molten", &self.molten())
            .finish()
    }
}
