use crate::error::{LdaError, Result};
use crate::state::CountState;

/// Dirichlet smoothing: a scalar document-topic prior and a per-word topic-word prior.
#[derive(Debug, Clone, PartialEq)]
pub struct Priors {
    pub alpha: f64,
    pub eta: Vec<f64>,
    pub eta_sum: f64,
}

impl Priors {
    /// Broadcasts a scalar `eta` over the vocabulary.
    pub fn symmetric(alpha: f64, eta: f64, n_words: usize) -> Self {
        Priors {
            alpha,
            eta: vec![eta; n_words],
            eta_sum: eta * n_words as f64,
        }
    }

    pub fn with_word_prior(alpha: f64, eta: Vec<f64>) -> Result<Self> {
        if let Some((word_id, value)) = eta.iter().enumerate().find(|(_, v)| !(**v > 0.0)) {
            return Err(LdaError::invalid_config(
                &format!("eta[{}]", word_id),
                value,
                "must be greater than zero",
            ));
        }
        let eta_sum = eta.iter().sum();
        Ok(Priors { alpha, eta, eta_sum })
    }

    pub fn n_words(&self) -> usize {
        self.eta.len()
    }

    /// The topic-word distribution before any token is counted: `eta[w] / sum(eta)` in every row.
    pub fn uniform_topic_word(&self, n_topics: usize) -> Vec<Vec<f64>> {
        let row: Vec<f64> = self.eta.iter().map(|&e| e / self.eta_sum).collect();
        vec![row; n_topics]
    }

    /// Row-normalised `nzw + eta`.
    pub fn topic_word(&self, nzw: &[Vec<usize>]) -> Vec<Vec<f64>> {
        nzw.iter()
            .map(|counts| {
                let total: usize = counts.iter().sum();
                let norm = total as f64 + self.eta_sum;
                counts
                    .iter()
                    .zip(&self.eta)
                    .map(|(&count, &eta)| (count as f64 + eta) / norm)
                    .collect()
            })
            .collect()
    }

    /// Row-normalised `ndz + alpha`.
    pub fn doc_topic(&self, ndz: &[Vec<usize>]) -> Vec<Vec<f64>> {
        ndz.iter()
            .map(|counts| {
                let total: usize = counts.iter().sum();
                let norm = total as f64 + counts.len() as f64 * self.alpha;
                counts.iter().map(|&count| (count as f64 + self.alpha) / norm).collect()
            })
            .collect()
    }

    pub fn smoothed_topic_word(&self, state: &CountState) -> Vec<Vec<f64>> {
        self.topic_word(state.nzw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothed_rows_sum_to_one() {
        let priors = Priors::symmetric(0.1, 0.01, 3);
        let topic_word = priors.topic_word(&[vec![3, 0, 1], vec![0, 0, 0]]);
        for row in &topic_word {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
        assert!((topic_word[1][0] - 1.0 / 3.0).abs() < 1e-12);

        let doc_topic = priors.doc_topic(&[vec![2, 0], vec![0, 0]]);
        assert!((doc_topic[0][0] - 2.1 / 2.2).abs() < 1e-12);
        assert!((doc_topic[1][1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn word_prior_must_be_positive() {
        assert!(Priors::with_word_prior(0.1, vec![0.1, 0.0]).is_err());
        let priors = Priors::with_word_prior(0.1, vec![0.1, 0.3]).unwrap();
        assert!((priors.eta_sum - 0.4).abs() < 1e-12);
        let uniform = priors.uniform_topic_word(2);
        assert!((uniform[1][1] - 0.75).abs() < 1e-12);
    }
}
