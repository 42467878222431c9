use std::iter;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A fixed-size bitset whose bits can be set and cleared through a shared
/// reference, so that parallel tasks can mark variables without locks.
///
/// Capacity is fixed at construction; out-of-range bits are a caller bug.
pub struct AtomicBitSet {
    words: Box<[AtomicUsize]>,
    bits: usize,
}

const WORD_BITS: usize = usize::BITS as usize;

impl AtomicBitSet {
    /// Create a zeroed bitset able to hold `bits` bits.
    pub fn new(bits: usize) -> Self {
        let words = (bits + WORD_BITS - 1) / WORD_BITS;
        AtomicBitSet {
            words: (0..words).map(|_| AtomicUsize::new(0)).collect(),
            bits,
        }
    }

    pub fn capacity(&self) -> usize {
        self.bits
    }

    #[inline]
    fn locate(&self, bit: usize) -> (usize, usize) {
        assert!(bit < self.bits, "bit {bit} out of range ({})", self.bits);
        (bit / WORD_BITS, bit % WORD_BITS)
    }

    /// Set a bit, returning whether it was already set.
    pub fn test_and_set(&self, bit: usize) -> bool {
        let (w, o) = self.locate(bit);
        self.words[w].fetch_or(1 << o, Ordering::Relaxed) & (1 << o) != 0
    }

    pub fn set(&self, bit: usize) {
        self.test_and_set(bit);
    }

    pub fn clear(&self, bit: usize) {
        let (w, o) = self.locate(bit);
        self.words[w].fetch_and(!(1 << o), Ordering::Relaxed);
    }

    pub fn contains(&self, bit: usize) -> bool {
        let (w, o) = self.locate(bit);
        (self.words[w].load(Ordering::Relaxed) >> o) & 1 != 0
    }

    pub fn clear_all(&self) {
        for w in self.words.iter() {
            w.store(0, Ordering::Relaxed);
        }
    }

    pub fn count(&self) -> usize {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Relaxed).count_ones() as usize)
            .sum()
    }

    /// Find the first set bit ≥ `bit`.
    pub fn first_set_ge(&self, bit: usize) -> Option<usize> {
        if bit >= self.bits {
            return None;
        }
        let (start_w, offset) = (bit / WORD_BITS, bit % WORD_BITS);
        let mask = self.words[start_w].load(Ordering::Relaxed) & (!0usize << offset);
        if mask != 0 {
            return Some(start_w * WORD_BITS + mask.trailing_zeros() as usize);
        }
        self.words[start_w + 1..]
            .iter()
            .enumerate()
            .find_map(|(i, w)| {
                let w = w.load(Ordering::Relaxed);
                (w != 0).then(|| (start_w + 1 + i) * WORD_BITS + w.trailing_zeros() as usize)
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        let mut after = 0;
        iter::from_fn(move || {
            let res = self.first_set_ge(after)?;
            after = res + 1;
            Some(res)
        })
    }
}

impl std::fmt::Debug for AtomicBitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
