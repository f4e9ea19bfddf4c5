//! Deterministic random number generation for synthetic ledgers.
//!
//! RULE: Synthetic data never touches a platform RNG.
//! Every store draws from its own stream, seeded from
//! (master_seed XOR stream_index * golden-ratio constant). This means:
//!   - Adding stores never changes the rows of existing stores.
//!   - Each store's rows are reproducible in isolation.

use crate::types::Seed;
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct LedgerRng {
    inner: Pcg64Mcg,
}

impl LedgerRng {
    /// Stream `stream_index` of the ledger seeded by `master_seed`.
    pub fn new(master_seed: Seed, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Uniform draw in `[lo, hi)`. An empty range yields `lo`.
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if lo < hi {
            self.inner.gen_range(lo..hi)
        } else {
            lo
        }
    }

    /// Day offset in `[0, span_days)`; a zero span means day 0.
    pub fn day_offset(&mut self, span_days: u32) -> u64 {
        if span_days == 0 {
            0
        } else {
            self.inner.gen_range(0..u64::from(span_days))
        }
    }

    pub fn chance(&mut self, p: f64) -> bool {
        self.inner.gen::<f64>() < p
    }

    /// Inverse-transform Pareto draw: `x_min * u^(-1/alpha)`, u in (0, 1].
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = 1.0 - self.inner.gen::<f64>();
        x_min * u.powf(-1.0 / alpha)
    }

    pub fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }
}
