use crate::lit::Lit;

/// Clauses removed by satisfiability-preserving (not equivalence-preserving)
/// passes, each with the literal that may be flipped to satisfy it.
#[derive(Clone, Debug, Default)]
pub struct ModelStack {
    entries: Vec<(Lit, Vec<Lit>)>,
}

impl ModelStack {
    pub fn new() -> Self {
        ModelStack::default()
    }

    pub fn push(&mut self, witness: Lit, clause: Vec<Lit>) {
        debug_assert!(clause.contains(&witness), "witness {witness} not in clause {clause:?}");
        self.entries.push((witness, clause));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Lit, Vec<Lit>)> {
        self.entries.iter()
    }

    /// Turn a model of the simplified formula into a model of the input
    /// formula. `model[v]` is the value of 0-based variable `v`.
    pub fn extend(&self, model: &mut [bool]) {
        for (witness, clause) in self.entries.iter().rev() {
            if !satisfied(clause, model) {
                model[witness.var() as usize] = !witness.is_neg();
            }
        }
    }
}

pub fn satisfied(clause: &[Lit], model: &[bool]) -> bool {
    clause.iter().any(|l| model[l.var() as usize] != l.is_neg())
}
