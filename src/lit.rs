use std::fmt;

/// 0-based variable index.
pub type Var = u32;

/// A literal in doubled encoding: `code = 2 * var + neg` where `var` is 0-based
/// (so DIMACS `v` maps to `2 * (v - 1)`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Lit(u32);

impl Lit {
    pub fn new(var: Var, negated: bool) -> Self {
        Lit((var << 1) | negated as u32)
    }

    pub fn positive(var: Var) -> Self {
        Self::new(var, false)
    }

    pub fn negative(var: Var) -> Self {
        Self::new(var, true)
    }

    pub fn from_dimacs(value: i32) -> Self {
        assert_ne!(value, 0, "zero is not a literal");
        Self::new(value.unsigned_abs() - 1, value < 0)
    }

    pub fn from_code(code: u32) -> Self {
        Lit(code)
    }

    pub fn code(self) -> u32 {
        self.0
    }

    pub fn var(self) -> Var {
        self.0 >> 1
    }

    pub fn is_neg(self) -> bool {
        self.0 & 1 != 0
    }

    pub fn to_dimacs(self) -> i32 {
        let v = self.var() as i32 + 1;
        if self.is_neg() {
            -v
        } else {
            v
        }
    }

    /// One bit of the 32-bit clause signature.
    pub fn hash_bit(self) -> u32 {
        1u32 << (self.0 & 31)
    }

    /// Index of this literal in per-literal tables.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::ops::Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        Lit(self.0 ^ 1)
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

/// Signature of a literal sequence: OR of each literal's hash bit.
pub fn signature(lits: impl IntoIterator<Item = Lit>) -> u32 {
    lits.into_iter().fold(0, |sig, lit| sig | lit.hash_bit())
}

/// Number of literal codes needed to index both polarities of `num_vars` variables.
pub fn num_lits_for(num_vars: u32) -> usize {
    2 * (num_vars as usize + 1)
}
