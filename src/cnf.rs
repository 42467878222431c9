use crate::bounded_vec::{backing, Backing};
use crate::clause::{ClauseHeader, ClauseStatus, SClause};
use crate::lit::{signature, Lit};
use crate::stats::GStats;
use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Index of a clause slot in a [`Cnf`].
pub type CRef = u32;

const HEADER_WORDS: usize = 5;
const META_WORDS: usize = 6;

/// Clause arena: a clause-header region followed by a literal region, both
/// pre-sized at allocation and never grown.
///
/// Appends reserve slots with [`Cnf::jump_cls`] / [`Cnf::jump_lits`], which are
/// plain `fetch_add`s, so any number of tasks can append concurrently. Each
/// reserved range belongs to its reserving task for the rest of the stage.
pub struct Cnf {
    headers: Box<[ClauseHeader]>,
    lits: Backing,
    n_cls: AtomicU32,
    n_lits: AtomicU64,
}

impl Cnf {
    /// Allocate an arena for `clause_cap` clauses and `lits_cap` literals.
    pub fn allocate(clause_cap: u32, lits_cap: u64) -> Self {
        assert!(clause_cap > 0, "clause capacity must be positive");
        assert!(lits_cap > 0, "literal capacity must be positive");
        Cnf {
            headers: (0..clause_cap).map(|_| ClauseHeader::empty()).collect(),
            lits: backing(lits_cap as usize),
            n_cls: AtomicU32::new(0),
            n_lits: AtomicU64::new(0),
        }
    }

    /// Build an arena holding exactly `clauses` (DIMACS literals).
    pub fn from_dimacs(clauses: &[Vec<i32>]) -> Self {
        let n_lits: usize = clauses.iter().map(Vec::len).sum();
        let cnf = Cnf::allocate(clauses.len().max(1) as u32, n_lits.max(1) as u64);
        for clause in clauses {
            let lits = clause.iter().map(|&l| Lit::from_dimacs(l)).collect::<Vec<_>>();
            cnf.new_clause(&lits);
        }
        cnf
    }

    pub fn len(&self) -> usize {
        (self.n_cls.load(Ordering::Acquire) as usize).min(self.capacity())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.headers.len()
    }

    pub fn num_lits(&self) -> u64 {
        self.n_lits.load(Ordering::Acquire).min(self.lits_capacity())
    }

    pub fn lits_capacity(&self) -> u64 {
        self.lits.len() as u64
    }

    pub fn free_clauses(&self) -> usize {
        self.capacity() - self.len()
    }

    pub fn free_lits(&self) -> u64 {
        self.lits_capacity() - self.num_lits()
    }

    /// Reserve `n` clause slots, returning the first.
    pub fn jump_cls(&self, n: u32) -> CRef {
        let start = self.n_cls.fetch_add(n, Ordering::AcqRel);
        if start as usize + n as usize > self.capacity() {
            tracing::error!(start, n, cap = self.capacity(), "clause region exhausted");
            panic!(
                "clause region exhausted: {} + {} > {}",
                start,
                n,
                self.capacity()
            );
        }
        start
    }

    /// Reserve `n` literal slots, returning the first.
    pub fn jump_lits(&self, n: u64) -> u64 {
        let start = self.n_lits.fetch_add(n, Ordering::AcqRel);
        if start + n > self.lits_capacity() {
            tracing::error!(start, n, cap = self.lits_capacity(), "literal region exhausted");
            panic!(
                "literal region exhausted: {} + {} > {}",
                start,
                n,
                self.lits_capacity()
            );
        }
        start
    }

    /// Append an original clause. Literals are sorted and deduplicated first.
    pub fn new_clause(&self, lits: &[Lit]) -> CRef {
        self.new_clause_with(lits, ClauseStatus::Original)
    }

    pub fn new_clause_with(&self, lits: &[Lit], status: ClauseStatus) -> CRef {
        let mut sorted = lits.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        self.push_sorted(&sorted, status)
    }

    /// Append literals that are already sorted and free of duplicates.
    pub fn push_sorted(&self, lits: &[Lit], status: ClauseStatus) -> CRef {
        debug_assert!(lits.windows(2).all(|w| w[0] < w[1]));
        let cref = self.jump_cls(1);
        let start = self.jump_lits(lits.len() as u64);
        for (cell, lit) in self.lits[start as usize..].iter().zip(lits) {
            cell.store(lit.code(), Ordering::Relaxed);
        }
        self.headers[cref as usize].install(start, lits.len() as u32, signature(lits.iter().copied()), status);
        cref
    }

    pub fn clause(&self, cref: CRef) -> SClause<'_> {
        SClause::new(&self.headers[cref as usize], &self.lits)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CRef, SClause<'_>)> + '_ {
        (0..self.len() as CRef).map(move |c| (c, self.clause(c)))
    }

    /// Clauses that are neither deleted nor staged for deletion.
    pub fn live(&self) -> impl Iterator<Item = (CRef, SClause<'_>)> + '_ {
        self.iter().filter(|(_, c)| c.is_live())
    }

    pub fn resize(&mut self, n_cls: u32) {
        assert!(n_cls as usize <= self.capacity());
        *self.n_cls.get_mut() = n_cls;
    }

    pub fn resize_data(&mut self, n_lits: u64) {
        assert!(n_lits <= self.lits_capacity());
        *self.n_lits.get_mut() = n_lits;
    }

    /// Compact `src` into this arena: keep original and learnt clauses that
    /// are not staged for deletion, in order, with contiguous literal blocks.
    pub fn copy_from(&mut self, src: &Cnf) {
        let (mut n_cls, mut n_lits) = (0u32, 0u64);
        for (_, s) in src.iter() {
            if !s.is_live() {
                continue;
            }
            assert!((n_cls as usize) < self.capacity(), "compaction overflows clause region");
            assert!(n_lits + s.size() as u64 <= self.lits_capacity(), "compaction overflows literal region");
            let d = self.clause(n_cls);
            d.set_start(n_lits);
            d.copy_from(&s);
            n_cls += 1;
            n_lits += s.size() as u64;
        }
        self.clear_tail(n_cls);
        *self.n_cls.get_mut() = n_cls;
        *self.n_lits.get_mut() = n_lits;
    }

    /// In-place compaction, see [`Cnf::copy_from`].
    ///
    /// Concurrent appends reserve clause and literal slots separately, so a
    /// later clause may own an earlier literal block. Such arenas are moved
    /// through a scratch copy of the surviving literals.
    pub fn shrink(&mut self) {
        let survivors: Vec<CRef> = self.live().map(|(i, _)| i).collect();
        let in_order = survivors.windows(2).all(|w| {
            let (a, b) = (self.clause(w[0]), self.clause(w[1]));
            a.start() + a.size() as u64 <= b.start()
        });
        let scratch: Vec<u32> = if in_order {
            Vec::new()
        } else {
            survivors
                .iter()
                .flat_map(|&i| self.clause(i).lits().map(Lit::code))
                .collect()
        };
        let (mut n_cls, mut n_lits) = (0u32, 0u64);
        for &i in &survivors {
            let c = self.clause(i);
            let size = c.size() as u64;
            let (start, sig, status) = (c.start(), c.sig(), c.status());
            if !in_order || n_cls != i || n_lits != start {
                let dest = &self.lits[n_lits as usize..(n_lits + size) as usize];
                if in_order {
                    // blocks ascend, so the destination never lies past the source
                    for (k, cell) in dest.iter().enumerate() {
                        let v = self.lits[start as usize + k].load(Ordering::Relaxed);
                        cell.store(v, Ordering::Relaxed);
                    }
                } else {
                    let from = &scratch[n_lits as usize..(n_lits + size) as usize];
                    for (cell, &v) in dest.iter().zip(from) {
                        cell.store(v, Ordering::Relaxed);
                    }
                }
                self.headers[n_cls as usize].install(n_lits, size as u32, sig, status);
            }
            n_cls += 1;
            n_lits += size;
        }
        self.clear_tail(n_cls);
        *self.n_cls.get_mut() = n_cls;
        *self.n_lits.get_mut() = n_lits;
    }

    fn clear_tail(&self, from: CRef) {
        for header in &self.headers[from as usize..self.len().max(from as usize)] {
            header.install(0, 0, 0, ClauseStatus::Deleted);
        }
    }

    /// Raw copy of the used literal region.
    pub fn copy_lits_to(&self, out: &mut Vec<u32>) {
        out.clear();
        out.extend(
            self.lits[..self.num_lits() as usize]
                .iter()
                .map(|cell| cell.load(Ordering::Relaxed)),
        );
    }

    /// Flatten live clauses as `size, lit, lit, ...` records. `stats` must
    /// come from a counting pass over this arena and fixes the output length.
    pub fn copy_if(&self, out: &mut Vec<u32>, stats: &GStats) {
        let expected = stats.num_clauses as usize + stats.num_lits as usize;
        out.clear();
        out.reserve_exact(expected);
        for (_, c) in self.live() {
            out.push(c.size() as u32);
            out.extend(c.lits().map(Lit::code));
        }
        assert_eq!(out.len(), expected, "copy_if disagrees with the counting pass");
    }

    /// Export the whole arena, capacities included, as one word vector.
    pub fn to_blob(&self) -> CnfBlob {
        let cap = self.capacity();
        let lits_cap = self.lits_capacity();
        let n_lits = self.num_lits();
        let mut words = Vec::with_capacity(META_WORDS + cap * HEADER_WORDS + lits_cap as usize);
        words.extend([
            cap as u32,
            lits_cap as u32,
            (lits_cap >> 32) as u32,
            self.len() as u32,
            n_lits as u32,
            (n_lits >> 32) as u32,
        ]);
        for header in self.headers.iter() {
            words.extend(header.encode());
        }
        words.extend(self.lits.iter().map(|cell| cell.load(Ordering::Relaxed)));
        CnfBlob(words)
    }

    /// Rebuild an arena from an exported blob. Offsets are re-derived from
    /// the capacities; clause headers need no fix-up.
    pub fn from_blob(blob: &CnfBlob) -> Self {
        let words = &blob.0;
        assert!(words.len() >= META_WORDS, "truncated arena blob");
        let cap = words[0] as usize;
        let lits_cap = words[1] as u64 | (words[2] as u64) << 32;
        let header_base = META_WORDS;
        let lit_base = header_base + cap * HEADER_WORDS;
        assert_eq!(words.len(), lit_base + lits_cap as usize, "arena blob size mismatch");
        let headers = words[header_base..lit_base]
            .chunks_exact(HEADER_WORDS)
            .map(ClauseHeader::decode)
            .collect();
        let lits = words[lit_base..].iter().map(|&w| AtomicU32::new(w)).collect();
        Cnf {
            headers,
            lits,
            n_cls: AtomicU32::new(words[3]),
            n_lits: AtomicU64::new(words[4] as u64 | (words[5] as u64) << 32),
        }
    }

    pub fn print_all(&self, f: &mut impl fmt::Write) -> fmt::Result {
        for (i, c) in self.iter().filter(|(_, c)| !c.is_empty()) {
            write!(f, "c | C({i})->")?;
            c.write(f)?;
        }
        Ok(())
    }

    pub fn print_remaining(&self, f: &mut impl fmt::Write) -> fmt::Result {
        for (i, c) in self.iter().filter(|(_, c)| !c.is_empty() && !c.is_deleted()) {
            write!(f, "c | C({i})->")?;
            c.write(f)?;
        }
        Ok(())
    }

    pub fn print_sigs(&self, f: &mut impl fmt::Write) -> fmt::Result {
        for (i, c) in self.iter().filter(|(_, c)| !c.is_empty()) {
            writeln!(f, "c | C({i})->sig({})", c.sig())?;
        }
        Ok(())
    }

    pub fn print_deleted(&self, f: &mut impl fmt::Write) -> fmt::Result {
        for (i, c) in self.iter().filter(|(_, c)| c.is_deleted()) {
            write!(f, "c | C({i})->")?;
            c.write(f)?;
        }
        Ok(())
    }

    /// Raw literal region, four entries per line.
    pub fn dump(&self, f: &mut impl fmt::Write) -> fmt::Result {
        writeln!(f, "c | CNF raw data:")?;
        let n = self.num_lits() as usize;
        for (i, cell) in self.lits[..n].iter().enumerate() {
            let lit = Lit::from_code(cell.load(Ordering::Relaxed));
            write!(f, "({i}): {:6}, ", lit.to_dimacs())?;
            if i % 4 == 3 && i + 1 < n {
                writeln!(f)?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Debug for Cnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cnf")
            .field("clauses", &self.len())
            .field("capacity", &self.capacity())
            .field("lits", &self.num_lits())
            .field("lits_capacity", &self.lits_capacity())
            .finish()
    }
}

/// An arena serialized as metadata, clause headers, then literals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CnfBlob(Vec<u32>);

impl CnfBlob {
    pub fn words(&self) -> &[u32] {
        &self.0
    }

    pub fn from_words(words: Vec<u32>) -> Self {
        CnfBlob(words)
    }
}
