use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Backing cells shared by every [`BoundedVec`] laid out over them.
pub type Backing = Box<[AtomicU32]>;

pub fn backing(len: usize) -> Backing {
    (0..len).map(|_| AtomicU32::new(0)).collect()
}

/// A growable sequence of `u32` living in a window `[base, base + cap)` of a
/// backing store it does not own.
///
/// The window is fixed when the owner lays out its storage. `push` reserves a
/// slot with a `fetch_add` on the length, so concurrent pushers never receive
/// the same slot. A push past the capacity is not written but still counted,
/// which lets the owner detect the sizing bug afterwards (see
/// [`BoundedVec::overflowed`]).
pub struct BoundedVec {
    base: usize,
    cap: u32,
    len: AtomicU32,
}

impl BoundedVec {
    pub fn new() -> Self {
        BoundedVec {
            base: 0,
            cap: 0,
            len: AtomicU32::new(0),
        }
    }

    /// Point this vector at `[base, base + cap)` and empty it.
    pub fn assign(&mut self, base: usize, cap: u32) {
        self.base = base;
        self.cap = cap;
        *self.len.get_mut() = 0;
    }

    pub fn base(&self) -> usize {
        self.base
    }

    /// Number of pushes so far. Exceeds `capacity()` only after an overflow.
    pub fn raw_len(&self) -> usize {
        self.len.load(Ordering::Acquire) as usize
    }

    pub fn len(&self) -> usize {
        self.raw_len().min(self.cap as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.cap as usize
    }

    pub fn overflowed(&self) -> bool {
        self.raw_len() > self.capacity()
    }

    /// Append `value`; returns false (and records the overflow) when full.
    pub fn push(&self, store: &[AtomicU32], value: u32) -> bool {
        let idx = self.len.fetch_add(1, Ordering::AcqRel);
        if idx >= self.cap {
            return false;
        }
        store[self.base + idx as usize].store(value, Ordering::Release);
        true
    }

    pub fn get(&self, store: &[AtomicU32], idx: usize) -> u32 {
        assert!(idx < self.len(), "index {idx} out of bounds ({})", self.len());
        store[self.base + idx].load(Ordering::Acquire)
    }

    pub fn iter<'a>(&'a self, store: &'a [AtomicU32]) -> impl Iterator<Item = u32> + 'a {
        store[self.base..self.base + self.len()]
            .iter()
            .map(|cell| cell.load(Ordering::Acquire))
    }

    pub fn to_vec(&self, store: &[AtomicU32]) -> Vec<u32> {
        self.iter(store).collect()
    }

    /// Set the length to `n`, which must fit the capacity.
    pub fn resize(&self, n: usize) {
        assert!(n <= self.capacity(), "resize to {n} beyond capacity {}", self.cap);
        self.len.store(n as u32, Ordering::Release);
    }

    pub fn clear(&self) {
        self.len.store(0, Ordering::Release);
    }

    /// Keep only the entries for which `keep` holds, preserving order.
    /// Only the owner of this list may call it during a stage.
    pub fn retain(&self, store: &[AtomicU32], mut keep: impl FnMut(u32) -> bool) -> usize {
        let cells = &store[self.base..self.base + self.len()];
        let mut kept = 0;
        for i in 0..cells.len() {
            let value = cells[i].load(Ordering::Acquire);
            if keep(value) {
                cells[kept].store(value, Ordering::Release);
                kept += 1;
            }
        }
        let removed = cells.len() - kept;
        self.resize(kept);
        removed
    }

    /// Remove the first occurrence of `value`; returns whether one was found.
    pub fn remove(&self, store: &[AtomicU32], value: u32) -> bool {
        let mut found = false;
        self.retain(store, |x| {
            if !found && x == value {
                found = true;
                false
            } else {
                true
            }
        });
        found
    }

    pub fn sort(&self, store: &[AtomicU32]) {
        let mut values = self.to_vec(store);
        values.sort_unstable();
        for (cell, v) in store[self.base..].iter().zip(values) {
            cell.store(v, Ordering::Release);
        }
    }

    /// Overwrite this vector with `src`'s contents.
    pub fn copy_from(&self, store: &[AtomicU32], src: &BoundedVec, src_store: &[AtomicU32]) {
        let n = src.len();
        assert!(n <= self.capacity(), "copy of {n} entries into capacity {}", self.cap);
        for (i, v) in src.iter(src_store).enumerate() {
            store[self.base + i].store(v, Ordering::Release);
        }
        self.resize(n);
    }

    pub fn write(&self, store: &[AtomicU32], f: &mut impl fmt::Write, as_lits: bool) -> fmt::Result {
        write!(f, "->(size = {})[", self.len())?;
        for (i, v) in self.iter(store).enumerate() {
            if as_lits {
                write!(f, "{:2}  ", crate::lit::Lit::from_code(v))?;
            } else {
                write!(f, "{v:2}  ")?;
            }
            if i > 0 && i + 1 < self.len() && i % 10 == 0 {
                write!(f, "\nc |\t\t")?;
            }
        }
        writeln!(f, "]")
    }
}

impl Default for BoundedVec {
    fn default() -> Self {
        BoundedVec::new()
    }
}

/// A [`BoundedVec`] that owns its backing store.
pub struct FixedVec {
    store: Backing,
    vec: BoundedVec,
}

impl FixedVec {
    pub fn with_capacity(cap: usize) -> Self {
        let mut vec = BoundedVec::new();
        vec.assign(0, cap as u32);
        FixedVec {
            store: backing(cap),
            vec,
        }
    }

    pub fn push(&self, value: u32) -> bool {
        self.vec.push(&self.store, value)
    }

    pub fn len(&self) -> usize {
        self.vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.vec.capacity()
    }

    pub fn overflowed(&self) -> bool {
        self.vec.overflowed()
    }

    pub fn get(&self, idx: usize) -> u32 {
        self.vec.get(&self.store, idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.vec.iter(&self.store)
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.vec.to_vec(&self.store)
    }

    pub fn clear(&self) {
        self.vec.clear()
    }

    /// Replace the contents with `values`.
    pub fn assign_from(&self, values: &[u32]) {
        assert!(values.len() <= self.capacity());
        for (cell, &v) in self.store.iter().zip(values) {
            cell.store(v, Ordering::Release);
        }
        self.vec.resize(values.len());
    }
}

impl fmt::Debug for FixedVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
