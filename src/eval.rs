//! Log-likelihood of the sampler state and perplexity of fitted distributions.

use statrs::function::gamma::ln_gamma;

use crate::error::{LdaError, Result};
use crate::matrix::DocTermMatrix;
use crate::priors::Priors;
use crate::state::CountState;

/// Complete log likelihood `log p(w, z) = log p(w | z) + log p(z)` of the
/// current assignment, with the topic-word and document-topic parameters
/// integrated out.
pub fn loglikelihood(state: &CountState, priors: &Priors) -> f64 {
    let n_topics = state.n_topics();
    let alpha = priors.alpha;
    let lgamma_eta: Vec<f64> = priors.eta.iter().map(|&eta| ln_gamma(eta)).collect();
    let lgamma_alpha = ln_gamma(alpha);

    // log p(w | z)
    let mut ll = n_topics as f64 * ln_gamma(priors.eta_sum);
    for (counts, &total) in state.nzw().iter().zip(state.nz()) {
        ll -= ln_gamma(priors.eta_sum + total as f64);
        for (w, &count) in counts.iter().enumerate() {
            // zero counts cancel out
            if count > 0 {
                ll += ln_gamma(priors.eta[w] + count as f64) - lgamma_eta[w];
            }
        }
    }

    // log p(z)
    let alpha_sum = alpha * n_topics as f64;
    let lgamma_alpha_sum = ln_gamma(alpha_sum);
    for counts in state.ndz() {
        let length: usize = counts.iter().sum();
        ll += lgamma_alpha_sum - ln_gamma(alpha_sum + length as f64);
        for &count in counts {
            if count > 0 {
                ll += ln_gamma(alpha + count as f64) - lgamma_alpha;
            }
        }
    }
    ll
}

/// `exp(-sum(count * ln p(w | d)) / N)` with `p(w | d) = sum_k doc_topic[d][k] * topic_word[k][w]`.
pub fn perplexity(dtm: &DocTermMatrix, doc_topic: &[Vec<f64>], topic_word: &[Vec<f64>]) -> Result<f64> {
    if doc_topic.len() != dtm.n_docs() {
        return Err(LdaError::shape(
            format!("{} documents", doc_topic.len()),
            format!("{} documents", dtm.n_docs()),
        ));
    }
    if let Some(row) = topic_word.iter().find(|row| row.len() != dtm.n_words()) {
        return Err(LdaError::shape(
            format!("{} vocabulary columns", row.len()),
            format!("{} columns", dtm.n_words()),
        ));
    }
    let total = dtm.total();
    if total == 0 {
        return Err(LdaError::NumericDegeneracy("perplexity of an empty matrix".to_string()));
    }

    let mut log_sum = 0.0;
    for (d, w, count) in dtm.nonzero() {
        let p: f64 = doc_topic[d]
            .iter()
            .zip(topic_word)
            .map(|(theta, phi)| theta * phi[w])
            .sum();
        if !(p > 0.0) {
            return Err(LdaError::NumericDegeneracy(format!(
                "word {} has probability {} in document {}",
                w, p, d
            )));
        }
        log_sum += count as f64 * p.ln();
    }
    Ok((-log_sum / total as f64).exp())
}
