//! Tunables for the simplifier and the restart triggers, with the ranges
//! every value is checked against before use.

use crate::error::ConfigError;
use std::fmt::Display;

/// Inclusive integer range check.
fn check_int<T: PartialOrd + Display>(name: &'static str, value: T, min: T, max: T) -> Result<(), ConfigError> {
    if value > max {
        return Err(ConfigError::AboveMax {
            name,
            value: value.to_string(),
            max: max.to_string(),
        });
    }
    if value < min {
        return Err(ConfigError::BelowMin {
            name,
            value: value.to_string(),
            min: min.to_string(),
        });
    }
    Ok(())
}

/// Exclusive floating-point range check.
fn check_float(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value >= max {
        return Err(ConfigError::AboveMax {
            name,
            value: value.to_string(),
            max: max.to_string(),
        });
    }
    if value <= min {
        return Err(ConfigError::BelowMin {
            name,
            value: value.to_string(),
            min: min.to_string(),
        });
    }
    Ok(())
}

const I32_MAX: i64 = i32::MAX as i64;

#[derive(Clone, Debug, PartialEq)]
pub struct SimpOptions {
    /// Log a per-phase performance report.
    pub perf_report: bool,
    /// Bounded variable elimination.
    pub ve: bool,
    /// Subsumption elimination (with self-subsuming strengthening).
    pub sub: bool,
    /// Repeat elimination + subsumption until few literals are removed.
    pub ve_plus: bool,
    /// Blocked clause elimination.
    pub bce: bool,
    /// Hidden redundancy elimination.
    pub hre: bool,
    /// Turns on every technique.
    pub all: bool,
    /// Positive freezing temperature.
    pub mu_pos: i64,
    /// Negative freezing temperature.
    pub mu_neg: i64,
    pub phases: i64,
    /// Reallocate the arena to its exact size every this many phases (0: never).
    pub cnf_free_freq: i64,
    pub ce_pos_limit: i64,
    pub ce_neg_limit: i64,
    pub min_pvars: i64,
    pub lit_rem_threshold: i64,
    /// BCE fan-in/out bound on both occurrence lists.
    pub fan_limit: i64,
    /// Total resolvent literals a variable may produce.
    pub bve_out_limit: i64,
    pub bce_in_limit: i64,
    pub hse_in_limit: i64,
    pub hre_in_limit: i64,
    pub hre_out_limit: i64,
    /// Worker threads, 0 for one per core.
    pub threads: i64,
}

impl Default for SimpOptions {
    fn default() -> Self {
        SimpOptions {
            perf_report: true,
            ve: true,
            sub: false,
            ve_plus: true,
            bce: false,
            hre: false,
            all: false,
            mu_pos: 32,
            mu_neg: 32,
            phases: 2,
            cnf_free_freq: 3,
            ce_pos_limit: 512,
            ce_neg_limit: 512,
            min_pvars: 2,
            lit_rem_threshold: 10,
            fan_limit: 64,
            bve_out_limit: 125,
            bce_in_limit: 95,
            hse_in_limit: 180,
            hre_in_limit: 100,
            hre_out_limit: 250,
            threads: 0,
        }
    }
}

impl SimpOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_int("mu-pos", self.mu_pos, 10, I32_MAX)?;
        check_int("mu-neg", self.mu_neg, 10, I32_MAX)?;
        check_int("phases", self.phases, 0, I32_MAX)?;
        check_int("cnf-free-freq", self.cnf_free_freq, 0, 5)?;
        check_int("ce-pos-limit", self.ce_pos_limit, 1, I32_MAX)?;
        check_int("ce-neg-limit", self.ce_neg_limit, 1, I32_MAX)?;
        check_int("min-pvars", self.min_pvars, 1, I32_MAX)?;
        check_int("lit-rem-threshold", self.lit_rem_threshold, 0, I32_MAX)?;
        check_int("fan-limit", self.fan_limit, 1, I32_MAX)?;
        check_int("bve-out-limit", self.bve_out_limit, 1, I32_MAX)?;
        check_int("bce-in-limit", self.bce_in_limit, 1, I32_MAX)?;
        check_int("hse-in-limit", self.hse_in_limit, 1, I32_MAX)?;
        check_int("hre-in-limit", self.hre_in_limit, 1, I32_MAX)?;
        check_int("hre-out-limit", self.hre_out_limit, 1, I32_MAX)?;
        check_int("threads", self.threads, 0, 4096)?;
        Ok(())
    }

    pub fn sub_enabled(&self) -> bool {
        self.sub || self.all
    }

    pub fn bce_enabled(&self) -> bool {
        self.bce || self.all
    }

    pub fn hre_enabled(&self) -> bool {
        self.hre || self.all
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestartPolicy {
    Ema,
    Luby,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RestartOptions {
    pub policy: RestartPolicy,
    pub lbd_fast: i64,
    pub lbd_slow: i64,
    pub lbd_rate: f64,
    pub luby_factor: i64,
    /// Reset the Luby sequence when a term reaches this value (0: never).
    pub luby_limit: i64,
}

impl Default for RestartOptions {
    fn default() -> Self {
        RestartOptions {
            policy: RestartPolicy::Ema,
            lbd_fast: 50,
            lbd_slow: 100_000,
            lbd_rate: 1.1,
            luby_factor: 100,
            luby_limit: 0,
        }
    }
}

impl RestartOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_int("lbd-fast", self.lbd_fast, 1, I32_MAX)?;
        check_int("lbd-slow", self.lbd_slow, 1, I32_MAX)?;
        check_float("lbd-rate", self.lbd_rate, 0.0, 10.0)?;
        check_int("luby-factor", self.luby_factor, 1, I32_MAX)?;
        check_int("luby-limit", self.luby_limit, 0, i64::MAX)?;
        Ok(())
    }
}
