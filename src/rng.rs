use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{LdaError, Result};

/// A fixed block of uniform `[0, 1)` variates that the sampler reuses.
///
/// The block is drawn once and then permuted in place before every sweep,
/// which avoids one generator call per token. Indexing wraps around, so a
/// block shorter than the token stream is reused cyclically.
#[derive(Debug, Clone)]
pub struct VariateBuffer {
    rng: StdRng,
    values: Vec<f64>,
}

impl VariateBuffer {
    pub fn new(len: usize, seed: Option<u64>) -> Self {
        let mut rng = seeded_rng(seed);
        let values = (0..len).map(|_| rng.gen::<f64>()).collect();
        VariateBuffer { rng, values }
    }

    /// Wraps explicit values; `reshuffle` permutes them with a generator seeded by `seed`.
    pub fn from_values(values: Vec<f64>, seed: u64) -> Result<Self> {
        if values.is_empty() {
            return Err(LdaError::invalid_config("variates", 0, "must hold at least one value"));
        }
        Ok(VariateBuffer {
            rng: StdRng::seed_from_u64(seed),
            values,
        })
    }

    /// Copy of the current block whose shuffle generator starts over from `seed`.
    /// Two copies made with the same seed permute identically.
    pub fn restarted(&self, seed: Option<u64>) -> Self {
        VariateBuffer {
            rng: seeded_rng(seed),
            values: self.values.clone(),
        }
    }

    pub fn reshuffle(&mut self) {
        self.values.shuffle(&mut self.rng);
    }

    /// Variate for token `i`.
    #[inline]
    pub fn get(&self, i: usize) -> f64 {
        self.values[i % self.values.len()]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
