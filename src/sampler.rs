//! One sweep of collapsed Gibbs sampling over the token stream.

use crate::priors::Priors;
use crate::rng::VariateBuffer;
use crate::state::CountState;

/// Resamples the topic of every token, in index order.
///
/// Each token is taken out of the counts, a topic is drawn from
///
/// ```text
/// lamda * (ndz[d][k] + alpha) * (nzw[k][w] + eta[w]) / (nz[k] + sum(eta))
///   + (1 - lamda) * (ndz[d][k] + alpha) * adjusted[k][w]
/// ```
///
/// by inverse-CDF lookup with variate `i`, and the token is added back
/// under the drawn topic. Later tokens see the counts left by earlier ones.
pub fn sample_pass(
    state: &mut CountState,
    variates: &VariateBuffer,
    priors: &Priors,
    lamda: f64,
    adjusted: &[Vec<f64>],
) {
    let n_topics = state.n_topics();
    let mut cumulative = vec![0.0; n_topics];

    for i in 0..state.n_tokens() {
        state.remove(i);

        let (w, d) = (state.word(i), state.doc(i));
        let doc_counts = &state.ndz()[d];
        let mut total = 0.0;
        for k in 0..n_topics {
            let doc_weight = doc_counts[k] as f64 + priors.alpha;
            let base = doc_weight * (state.nzw()[k][w] as f64 + priors.eta[w])
                / (state.nz()[k] as f64 + priors.eta_sum);
            let reweighted = doc_weight * adjusted[k][w];
            total += lamda * base + (1.0 - lamda) * reweighted;
            cumulative[k] = total;
        }

        let topic = draw(&cumulative, variates.get(i) * total);
        state.assign(i, topic);
    }
}

/// Smallest index whose cumulative weight exceeds `u`; the last index absorbs round-off.
fn draw(cumulative: &[f64], u: f64) -> usize {
    cumulative
        .iter()
        .position(|&c| c > u)
        .unwrap_or(cumulative.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::DocTermMatrix;

    fn reference_state(n_topics: usize) -> (CountState, Priors) {
        let dtm = DocTermMatrix::from_dense(&[
            vec![1, 1],
            vec![2, 1],
            vec![3, 1],
            vec![4, 1],
            vec![5, 8],
            vec![6, 1],
        ])
        .unwrap();
        let state = CountState::initialize(&dtm, n_topics).unwrap();
        (state, Priors::symmetric(0.1, 0.01, dtm.n_words()))
    }

    #[test]
    fn draw_is_inverse_cdf() {
        let cumulative = [0.2, 0.5, 1.0];
        assert_eq!(draw(&cumulative, 0.0), 0);
        assert_eq!(draw(&cumulative, 0.2), 1);
        assert_eq!(draw(&cumulative, 0.75), 2);
        assert_eq!(draw(&cumulative, 1.0), 2);
    }

    #[test]
    fn zero_variates_select_topic_zero() {
        let (mut state, priors) = reference_state(3);
        let adjusted = priors.uniform_topic_word(3);
        let variates = VariateBuffer::from_values(vec![0.0; 16], 1).unwrap();

        sample_pass(&mut state, &variates, &priors, 0.5, &adjusted);

        assert!(state.topics().iter().all(|&z| z == 0));
        assert_eq!(state.nz(), &[33, 0, 0]);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn counts_stay_consistent_across_passes() {
        let (mut state, priors) = reference_state(2);
        let adjusted = priors.uniform_topic_word(2);
        let mut variates = VariateBuffer::new(7, Some(42));

        for _ in 0..25 {
            variates.reshuffle();
            sample_pass(&mut state, &variates, &priors, 0.5, &adjusted);
            assert!(state.check_invariants().is_ok());
            assert_eq!(state.ndz().iter().flatten().sum::<usize>(), 33);
        }
    }

    #[test]
    fn pure_adjusted_weights_follow_the_adjusted_rows() {
        let (mut state, priors) = reference_state(2);
        // Topic 1 carries no mass for either word, so lamda = 0 pins every token to topic 0.
        let adjusted = vec![vec![0.5, 0.5], vec![0.0, 0.0]];
        let variates = VariateBuffer::new(64, Some(9));

        sample_pass(&mut state, &variates, &priors, 0.0, &adjusted);

        assert!(state.topics().iter().all(|&z| z == 0));
    }
}
