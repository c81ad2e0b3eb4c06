//! Embedding-driven reshaping of the least coherent topic.
//!
//! Every few sweeps the adjuster scores each topic by document
//! co-occurrence of its top words, picks the topic that scores worst
//! against the mean of the others, and moves probability mass away from
//! the top words whose embeddings sit furthest from the topic centroid.
//! The three steps are separate functions so each can be checked on its own:
//! [`score_coherence`], [`select_outlier_topic`] and [`reweight_topic`].

use std::collections::HashMap;

use tracing::debug;

use crate::embedding::{cosine_similarity, Vocabulary, WordEmbeddings};
use crate::error::{LdaError, Result};
use crate::matrix::DocTermMatrix;
use crate::priors::Priors;
use crate::state::CountState;

/// Word ids of the `n` most probable words of every topic, most probable first.
/// Equal probabilities keep the lower word id first.
pub fn top_words(topic_word: &[Vec<f64>], n: usize) -> Vec<Vec<usize>> {
    topic_word
        .iter()
        .map(|row| {
            let mut ids: Vec<usize> = (0..row.len()).collect();
            ids.sort_by(|&a, &b| row[b].partial_cmp(&row[a]).unwrap_or(std::cmp::Ordering::Equal));
            ids.truncate(n);
            ids
        })
        .collect()
}

/// Co-occurrence coherence of every topic's top words.
///
/// A word counts as present in a document for topic `z` only when at least
/// one of its tokens there is assigned to `z`. For each rank pair `l < m`
/// the score gains `ln((joint + 1) / marginal)`, where `joint` counts
/// documents holding both words and `marginal` documents holding word `l`.
/// A zero marginal is floored to one; the pair then adds `ln(1) = 0`.
pub fn score_coherence(state: &CountState, top: &[Vec<usize>]) -> Vec<f64> {
    let n_docs = state.n_docs();
    let ranks: Vec<HashMap<usize, usize>> = top
        .iter()
        .map(|words| words.iter().enumerate().map(|(rank, &w)| (w, rank)).collect())
        .collect();

    // presence[topic][rank][doc]
    let mut presence: Vec<Vec<Vec<bool>>> = top
        .iter()
        .map(|words| vec![vec![false; n_docs]; words.len()])
        .collect();
    for i in 0..state.n_tokens() {
        let z = state.topic(i);
        if let Some(&rank) = ranks[z].get(&state.word(i)) {
            presence[z][rank][state.doc(i)] = true;
        }
    }

    presence
        .iter()
        .map(|by_rank| {
            let mut score = 0.0;
            for m in 1..by_rank.len() {
                for l in 0..m {
                    let mut joint = 0usize;
                    let mut marginal = 0usize;
                    for d in 0..n_docs {
                        if by_rank[l][d] {
                            marginal += 1;
                            if by_rank[m][d] {
                                joint += 1;
                            }
                        }
                    }
                    score += ((joint + 1) as f64 / marginal.max(1) as f64).ln();
                }
            }
            score
        })
        .collect()
}

/// Co-occurrence coherence of `words` over the whole corpus, using the same
/// pair formula as [`score_coherence`] but with every occurrence counted.
pub fn corpus_coherence(dtm: &DocTermMatrix, words: &[usize]) -> f64 {
    let presence: Vec<Vec<bool>> = words
        .iter()
        .map(|&w| (0..dtm.n_docs()).map(|d| dtm.get(d, w) > 0).collect())
        .collect();

    let mut score = 0.0;
    for m in 1..presence.len() {
        for l in 0..m {
            let marginal = presence[l].iter().filter(|&&present| present).count();
            let joint = presence[l]
                .iter()
                .zip(&presence[m])
                .filter(|(a, b)| **a && **b)
                .count();
            score += ((joint + 1) as f64 / marginal.max(1) as f64).ln();
        }
    }
    score
}

/// Topic whose score falls furthest below the mean of all other topics.
/// Ties go to the lower index. `None` with fewer than two topics.
pub fn select_outlier_topic(scores: &[f64]) -> Option<usize> {
    if scores.len() < 2 {
        return None;
    }
    let total: f64 = scores.iter().sum();
    let others = (scores.len() - 1) as f64;
    let gap = |score: f64| score - (total - score) / others;

    let mut best = 0;
    let mut best_gap = gap(scores[0]);
    for (topic, &score) in scores.iter().enumerate().skip(1) {
        let g = gap(score);
        if g < best_gap {
            best_gap = g;
            best = topic;
        }
    }
    Some(best)
}

/// Cosine similarity of each word's embedding to the centroid of all of them.
pub fn relevance(
    words: &[usize],
    vocabulary: &Vocabulary,
    embeddings: &dyn WordEmbeddings,
) -> Result<Vec<f64>> {
    let dimension = embeddings.dimension();
    let mut vectors = Vec::with_capacity(words.len());
    for &word_id in words {
        let token = vocabulary.token(word_id).ok_or(LdaError::UnknownWord(word_id))?;
        let vector = embeddings.vector(token).ok_or_else(|| LdaError::MissingEmbedding {
            word_id,
            token: token.to_string(),
        })?;
        if vector.len() != dimension {
            return Err(LdaError::shape(
                format!("{}-dimensional embedding", dimension),
                format!("{} components for {:?}", vector.len(), token),
            ));
        }
        vectors.push(vector);
    }

    let mut centroid = vec![0.0; dimension];
    for vector in &vectors {
        for (c, v) in centroid.iter_mut().zip(vector.iter()) {
            *c += v;
        }
    }
    let n = vectors.len().max(1) as f64;
    centroid.iter_mut().for_each(|c| *c /= n);

    Ok(vectors.iter().map(|v| cosine_similarity(v, &centroid)).collect())
}

/// Shrinks the `n_reweight` least relevant of `words` within `row` and hands
/// the freed mass to the others in proportion to their probability.
///
/// A word with positive relevance `r` keeps `p * r`; one with `r <= 0` is
/// zeroed. Each retained word is scaled by `1 + pool / S`, where `S` is the
/// retained mass, so it gains `pool * p / S` and the row total is unchanged.
/// (Scaling by `1 + pool * p / S` would leak mass.) Returns the mass moved.
pub fn reweight_topic(
    row: &mut [f64],
    words: &[usize],
    relevance: &[f64],
    n_reweight: usize,
) -> Result<f64> {
    let mut order: Vec<usize> = (0..words.len()).collect();
    order.sort_by(|&a, &b| relevance[a].partial_cmp(&relevance[b]).unwrap_or(std::cmp::Ordering::Equal));
    let (selected, kept) = order.split_at(n_reweight.min(order.len()));

    let mut pool = 0.0;
    for &rank in selected {
        let w = words[rank];
        let r = relevance[rank];
        if r > 0.0 {
            pool += row[w] * (1.0 - r);
            row[w] *= r;
        } else {
            pool += row[w];
            row[w] = 0.0;
        }
    }

    let kept_mass: f64 = kept.iter().map(|&rank| row[words[rank]]).sum();
    if !(kept_mass > 0.0) {
        return Err(LdaError::NumericDegeneracy(format!(
            "no probability mass left on the {} retained top words",
            kept.len()
        )));
    }
    let scale = 1.0 + pool / kept_mass;
    for &rank in kept {
        row[words[rank]] *= scale;
    }
    Ok(pool)
}

/// Periodic reshaping of the adjusted topic-word distribution.
#[derive(Debug, Clone, Copy)]
pub struct CoherenceAdjuster {
    pub top_n: usize,
    pub n_reweight: usize,
}

impl CoherenceAdjuster {
    pub fn new(top_n: usize, n_reweight: usize) -> Self {
        CoherenceAdjuster { top_n, n_reweight }
    }

    /// Resets `adjusted` to the smoothed counts and reshapes the outlier topic's row.
    /// Returns the adjusted topic, if any.
    pub fn adjust(
        &self,
        state: &CountState,
        priors: &Priors,
        vocabulary: &Vocabulary,
        embeddings: &dyn WordEmbeddings,
        adjusted: &mut Vec<Vec<f64>>,
    ) -> Result<Option<usize>> {
        let topic_word = priors.smoothed_topic_word(state);
        let top = top_words(&topic_word, self.top_n);
        let scores = score_coherence(state, &top);
        *adjusted = topic_word;

        let Some(topic) = select_outlier_topic(&scores) else {
            return Ok(None);
        };
        let relevance = relevance(&top[topic], vocabulary, embeddings)?;
        let moved = reweight_topic(&mut adjusted[topic], &top[topic], &relevance, self.n_reweight)?;
        debug!(topic, score = scores[topic], moved, "reshaped least coherent topic");
        Ok(Some(topic))
    }
}
