//! Restart triggers consumed by a search loop, fed once per conflict.

use crate::error::ConfigError;
use crate::options::{RestartOptions, RestartPolicy};

/// s(n): Luby sequence term, 1-based (1,1,2,1,1,2,4,...)
pub fn luby_term(n: u64) -> u64 {
    let mut k = 1u64;
    while (1u64 << k) - 1 < n {
        k += 1;
    }
    if n == (1u64 << k) - 1 {
        1u64 << (k - 1)
    } else {
        let prev_block = (1u64 << (k - 1)) - 1;
        luby_term(n - prev_block)
    }
}

/// Exponential moving average whose step starts at 1 and halves on updates
/// 1, 3, 7, 15, ... until it reaches `1 / window`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ema {
    val: f64,
    a: f64,
    b: f64,
    c: i64,
    p: i64,
}

impl Ema {
    pub fn new(window: u32) -> Self {
        assert!(window > 0, "EMA window must be positive");
        Ema {
            val: 0.0,
            a: 1.0 / window as f64,
            b: 1.0,
            c: 0,
            p: 0,
        }
    }

    pub fn value(&self) -> f64 {
        self.val
    }

    pub fn update(&mut self, x: f64) {
        self.val += self.b * (x - self.val);
        if self.b <= self.a {
            return;
        }
        let count = self.c;
        self.c -= 1;
        if count != 0 {
            return;
        }
        self.p = (self.p << 1) + 1;
        self.c = self.p;
        self.b = (self.b * 0.5).max(self.a);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct LbdPair {
    fast: Ema,
    slow: Ema,
}

/// Restart when the fast LBD average overtakes the scaled slow one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LbdRestart {
    current: LbdPair,
    saved: LbdPair,
    rate: f64,
    fast: u32,
    slow: u32,
}

impl LbdRestart {
    pub fn init(&mut self, rate: f64, fast: u32, slow: u32) {
        self.rate = rate;
        self.fast = fast;
        self.slow = slow;
    }

    /// Fresh averages for both pairs. Needs a prior [`LbdRestart::init`].
    pub fn reset(&mut self) {
        assert!(self.rate != 0.0 && self.fast > 0 && self.slow > 0, "LBD restart used before init");
        let pair = LbdPair {
            fast: Ema::new(self.fast),
            slow: Ema::new(self.slow),
        };
        self.current = pair;
        self.saved = pair;
    }

    pub fn update(&mut self, lbd: f64) {
        self.current.fast.update(lbd);
        self.current.slow.update(lbd);
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.saved);
    }

    pub fn restart(&self) -> bool {
        self.rate * self.current.slow.value() <= self.current.fast.value()
    }

    pub fn fast(&self) -> f64 {
        self.current.fast.value()
    }

    pub fn slow(&self) -> f64 {
        self.current.slow.value()
    }
}

/// Restart after `factor · s(i)` updates for the i-th Luby term `s(i)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LubyRestart {
    u: i64,
    v: i64,
    limit: i64,
    factor: i64,
    bound: i64,
    pending: bool,
}

impl LubyRestart {
    /// `limit` of 0 lets the sequence grow unbounded.
    pub fn init(&mut self, factor: i64, limit: i64) {
        assert!(factor > 0, "Luby factor must be positive");
        self.limit = limit;
        self.factor = factor;
        self.bound = factor;
        self.pending = false;
        self.reset();
        tracing::debug!(factor, limit, "Luby restarts initialized");
    }

    pub fn reset(&mut self) {
        self.u = 1;
        self.v = 1;
    }

    pub fn disable(&mut self) {
        self.factor = 0;
        self.pending = false;
    }

    pub fn limit_reached(&self) -> bool {
        self.limit > 0 && self.v >= self.limit
    }

    /// Current term, then advance to the next one.
    pub fn next_luby(&mut self) -> i64 {
        let term = self.v;
        if self.u & -self.u == self.v {
            self.u += 1;
            self.v = 1;
        } else {
            self.v <<= 1;
        }
        if self.limit_reached() {
            self.reset();
        }
        term
    }

    pub fn update(&mut self) {
        if self.factor == 0 || self.pending {
            return;
        }
        self.bound -= 1;
        if self.bound != 0 {
            return;
        }
        self.bound = self.next_luby() * self.factor;
        self.pending = true;
    }

    /// Consume a pending restart.
    pub fn restart(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

/// The trigger selected by [`RestartOptions::policy`].
#[derive(Clone, Debug, PartialEq)]
pub enum Restarts {
    Ema(LbdRestart),
    Luby(LubyRestart),
}

impl Restarts {
    pub fn new(opts: &RestartOptions) -> Result<Self, ConfigError> {
        opts.validate()?;
        Ok(match opts.policy {
            RestartPolicy::Ema => {
                let mut lbd = LbdRestart::default();
                lbd.init(opts.lbd_rate, opts.lbd_fast as u32, opts.lbd_slow as u32);
                lbd.reset();
                Restarts::Ema(lbd)
            }
            RestartPolicy::Luby => {
                let mut luby = LubyRestart::default();
                luby.init(opts.luby_factor, opts.luby_limit);
                Restarts::Luby(luby)
            }
        })
    }

    /// Feed one conflict with the LBD of its learnt clause.
    pub fn update(&mut self, lbd: u32) {
        match self {
            Restarts::Ema(r) => r.update(lbd as f64),
            Restarts::Luby(r) => r.update(),
        }
    }

    pub fn restart(&mut self) -> bool {
        match self {
            Restarts::Ema(r) => r.restart(),
            Restarts::Luby(r) => r.restart(),
        }
    }
}
