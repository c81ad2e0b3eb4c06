use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LdaError, Result};

/// Hyper-parameters for [`crate::EmbeddedLda`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LdaConfig {
    pub n_topics: usize,
    pub n_iter: usize,
    pub alpha: f64,  // Document-topic concentration
    pub eta: f64,    // Topic-word concentration
    pub lamda: f64,  // Weight of the count-based distribution against the adjusted one
    pub refresh: usize,  // Log-likelihood snapshot cadence
    pub seed: Option<u64>,
    pub coherence_every: usize,
    pub top_words: usize,       // Words per topic inspected by the coherence adjuster
    pub reweight_words: usize,  // Least relevant top words reshaped per adjustment
    pub variate_block: usize,   // Length of the reusable uniform variate buffer
    pub transform_max_iter: usize,
    pub transform_tol: f64,
}

impl Default for LdaConfig {
    fn default() -> Self {
        LdaConfig {
            n_topics: 10,
            n_iter: 2000,
            alpha: 0.1,
            eta: 0.01,
            lamda: 0.5,
            refresh: 10,
            seed: None,
            coherence_every: 2,
            top_words: 12,
            reweight_words: 5,
            variate_block: 1024 * 1024 / 8,  // 1 MiB of f64 variates
            transform_max_iter: 20,
            transform_tol: 1e-16,
        }
    }
}

impl LdaConfig {
    pub fn new(n_topics: usize) -> Self {
        LdaConfig {
            n_topics,
            ..Default::default()
        }
    }

    pub fn with_n_iter(mut self, n_iter: usize) -> Self {
        self.n_iter = n_iter;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_eta(mut self, eta: f64) -> Self {
        self.eta = eta;
        self
    }

    pub fn with_lamda(mut self, lamda: f64) -> Self {
        self.lamda = lamda;
        self
    }

    pub fn with_refresh(mut self, refresh: usize) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_variate_block(mut self, variate_block: usize) -> Self {
        self.variate_block = variate_block;
        self
    }

    /// Reads a JSON config; missing fields fall back to the defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: LdaConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_topics == 0 {
            return Err(LdaError::invalid_config("n_topics", self.n_topics, "must be greater than zero"));
        }
        if self.n_iter == 0 {
            return Err(LdaError::invalid_config("n_iter", self.n_iter, "must be greater than zero"));
        }
        // NaN fails these comparisons too
        if !(self.alpha > 0.0) {
            return Err(LdaError::invalid_config("alpha", self.alpha, "must be greater than zero"));
        }
        if !(self.eta > 0.0) {
            return Err(LdaError::invalid_config("eta", self.eta, "must be greater than zero"));
        }
        if !(0.0..=1.0).contains(&self.lamda) {
            return Err(LdaError::invalid_config("lamda", self.lamda, "must lie in [0, 1]"));
        }
        if self.refresh == 0 {
            return Err(LdaError::invalid_config("refresh", self.refresh, "must be greater than zero"));
        }
        if self.coherence_every == 0 {
            return Err(LdaError::invalid_config("coherence_every", self.coherence_every, "must be greater than zero"));
        }
        if self.variate_block == 0 {
            return Err(LdaError::invalid_config("variate_block", self.variate_block, "must be greater than zero"));
        }
        if self.reweight_words >= self.top_words {
            return Err(LdaError::invalid_config(
                "reweight_words",
                self.reweight_words,
                "must be smaller than top_words",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = LdaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.variate_block, 131_072);
        assert_eq!(config.top_words, 12);
    }

    #[test]
    fn rejects_non_positive_priors() {
        let err = LdaConfig::new(2).with_alpha(0.0).validate().unwrap_err();
        assert!(matches!(err, LdaError::InvalidConfig { ref param, .. } if param == "alpha"));

        let err = LdaConfig::new(2).with_eta(-1.0).validate().unwrap_err();
        assert!(matches!(err, LdaError::InvalidConfig { ref param, .. } if param == "eta"));

        let err = LdaConfig::new(2).with_alpha(f64::NAN).validate().unwrap_err();
        assert!(matches!(err, LdaError::InvalidConfig { .. }));
    }

    #[test]
    fn rejects_zero_topics_and_bad_lamda() {
        assert!(LdaConfig::new(0).validate().is_err());
        assert!(LdaConfig::new(3).with_lamda(1.5).validate().is_err());
        assert!(LdaConfig::new(3).with_refresh(0).validate().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"n_topics": 4, "alpha": 0.5, "seed": 7}}"#).unwrap();

        let config = LdaConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.n_topics, 4);
        assert_eq!(config.alpha, 0.5);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.eta, 0.01);
        assert_eq!(config.n_iter, 2000);
    }
}
