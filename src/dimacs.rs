//! DIMACS CNF input.

use crate::cnf::Cnf;
use crate::error::{Error, Result};
use std::io::{BufRead, BufReader, Read};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dimacs {
    pub num_vars: u32,
    pub clauses: Vec<Vec<i32>>,
}

impl Dimacs {
    /// Arena holding exactly these clauses.
    pub fn to_cnf(&self) -> Cnf {
        Cnf::from_dimacs(&self.clauses)
    }
}

fn parse_err(line: usize, msg: impl Into<String>) -> Error {
    Error::Parse {
        line,
        msg: msg.into(),
    }
}

/// Parse a `p cnf` problem. Comment lines start with `c`; a clause may span
/// lines and ends at `0`. The variable count grows to cover every literal
/// actually used.
pub fn read<R: Read>(reader: R) -> Result<Dimacs> {
    let mut out = Dimacs::default();
    let mut header = false;
    let mut clause = Vec::new();
    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        let lineno = idx + 1;
        if line.is_empty() || line.starts_with('c') || line.starts_with('%') {
            continue;
        }
        if line.starts_with('p') {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 || parts[1] != "cnf" {
                return Err(parse_err(lineno, "expected `p cnf <vars> <clauses>`"));
            }
            out.num_vars = parts[2]
                .parse()
                .map_err(|e| parse_err(lineno, format!("invalid variable count: {e}")))?;
            let num_clauses: usize = parts[3]
                .parse()
                .map_err(|e| parse_err(lineno, format!("invalid clause count: {e}")))?;
            out.clauses.reserve(num_clauses);
            header = true;
            continue;
        }
        if !header {
            return Err(parse_err(lineno, "clause before the `p cnf` header"));
        }
        for token in line.split_whitespace() {
            let lit: i32 = token
                .parse()
                .map_err(|e| parse_err(lineno, format!("invalid literal `{token}`: {e}")))?;
            if lit == i32::MIN {
                return Err(parse_err(lineno, "literal out of range"));
            }
            if lit == 0 {
                out.clauses.push(std::mem::take(&mut clause));
            } else {
                out.num_vars = out.num_vars.max(lit.unsigned_abs());
                clause.push(lit);
            }
        }
    }
    if !clause.is_empty() {
        out.clauses.push(clause);
    }
    tracing::debug!(vars = out.num_vars, clauses = out.clauses.len(), "DIMACS read");
    Ok(out)
}

pub fn read_string(s: &str) -> Result<Dimacs> {
    read(s.as_bytes())
}

pub const FAIL_EG: &str = "\
c unsatisfiable: every assignment of 1 and 2 is excluded
p cnf 2 4
1 2 0
1 -2 0
-1 2 0
-1 -2 0
";

pub const LONG_EG: &str = "\
c unsatisfiable whichever way 1 is decided
p cnf 6 8
1 2 3 0
1 2 -3 0
-2 4 0
1 -2 -4 0
-1 5 6 0
-1 5 -6 0
-5 -6 0
-1 -5 6 0
";

pub const SUCC_EG: &str = "\
c satisfiable
p cnf 12 8
1 4 0
1 -3 -8 0
1 8 12 0
2 11 0
-3 -7 9 0
-7 8 -9 0
7 8 -10 0
7 10 -12 0
";
