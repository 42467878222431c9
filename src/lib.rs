pub mod atomic_bitset;
pub mod bounded_vec;
pub mod clause;
pub mod cnf;
pub mod dimacs;
pub mod engine;
pub mod error;
pub mod lit;
pub mod model;
pub mod occurs;
pub mod options;
pub mod restart;
pub mod simplify;
pub mod stats;

pub use error::{ConfigError, Error, Result};
