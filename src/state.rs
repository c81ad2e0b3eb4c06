//! Sufficient statistics of a collapsed Gibbs sampler.

use crate::error::{LdaError, Result};
use crate::matrix::DocTermMatrix;

/// Token stream plus the topic-word, document-topic and topic-total counts
/// derived from it.
///
/// Every mutation goes through [`CountState::remove`] and
/// [`CountState::assign`], which keep `sum_w nzw[z][w] == nz[z] == sum_d ndz[d][z]`.
#[derive(Debug, Clone)]
pub struct CountState {
    words: Vec<usize>,   // WS: word id of token i
    docs: Vec<usize>,    // DS: document id of token i
    topics: Vec<usize>,  // ZS: current topic of token i
    nzw: Vec<Vec<usize>>,  // Topics x Words
    ndz: Vec<Vec<usize>>,  // Documents x Topics
    nz: Vec<usize>,
}

impl CountState {
    /// Expands `dtm` into a token stream and assigns token `i` topic `i % n_topics`.
    pub fn initialize(dtm: &DocTermMatrix, n_topics: usize) -> Result<Self> {
        if n_topics == 0 {
            return Err(LdaError::invalid_config("n_topics", n_topics, "must be greater than zero"));
        }

        let (words, docs) = dtm.to_token_lists();
        let mut state = CountState {
            topics: Vec::with_capacity(words.len()),
            words,
            docs,
            nzw: vec![vec![0; dtm.n_words()]; n_topics],
            ndz: vec![vec![0; n_topics]; dtm.n_docs()],
            nz: vec![0; n_topics],
        };

        for i in 0..state.words.len() {
            let topic = i % n_topics;
            state.topics.push(topic);
            state.increment(i, topic);
        }

        Ok(state)
    }

    pub fn n_tokens(&self) -> usize {
        self.words.len()
    }

    pub fn n_topics(&self) -> usize {
        self.nz.len()
    }

    pub fn n_docs(&self) -> usize {
        self.ndz.len()
    }

    pub fn n_words(&self) -> usize {
        self.nzw.first().map(|row| row.len()).unwrap_or(0)
    }

    pub fn word(&self, i: usize) -> usize {
        self.words[i]
    }

    pub fn doc(&self, i: usize) -> usize {
        self.docs[i]
    }

    pub fn topic(&self, i: usize) -> usize {
        self.topics[i]
    }

    pub fn words(&self) -> &[usize] {
        &self.words
    }

    pub fn docs(&self) -> &[usize] {
        &self.docs
    }

    pub fn topics(&self) -> &[usize] {
        &self.topics
    }

    pub fn nzw(&self) -> &[Vec<usize>] {
        &self.nzw
    }

    pub fn ndz(&self) -> &[Vec<usize>] {
        &self.ndz
    }

    pub fn nz(&self) -> &[usize] {
        &self.nz
    }

    /// Token count of every document.
    pub fn doc_lengths(&self) -> Vec<usize> {
        self.ndz.iter().map(|row| row.iter().sum()).collect()
    }

    /// Takes token `i` out of the counts of its current topic.
    pub fn remove(&mut self, i: usize) {
        let (w, d, z) = (self.words[i], self.docs[i], self.topics[i]);
        self.nzw[z][w] -= 1;
        self.ndz[d][z] -= 1;
        self.nz[z] -= 1;
    }

    /// Assigns token `i` to `topic` and adds it back into the counts.
    /// Must follow a [`CountState::remove`] of the same token.
    pub fn assign(&mut self, i: usize, topic: usize) {
        self.topics[i] = topic;
        self.increment(i, topic);
    }

    fn increment(&mut self, i: usize, topic: usize) {
        let (w, d) = (self.words[i], self.docs[i]);
        self.nzw[topic][w] += 1;
        self.ndz[d][topic] += 1;
        self.nz[topic] += 1;
    }

    /// Snapshot of the counts, dropping the token stream.
    pub fn into_counts(self) -> (Vec<Vec<usize>>, Vec<Vec<usize>>, Vec<usize>) {
        (self.nzw, self.ndz, self.nz)
    }

    /// Returns a description of the first broken count invariant, if any.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        for (z, &total) in self.nz.iter().enumerate() {
            let by_word: usize = self.nzw[z].iter().sum();
            let by_doc: usize = self.ndz.iter().map(|row| row[z]).sum();
            if by_word != total || by_doc != total {
                return Err(format!(
                    "topic {}: nz = {}, sum over words = {}, sum over documents = {}",
                    z, total, by_word, by_doc
                ));
            }
        }

        let mut lengths = vec![0; self.ndz.len()];
        for &d in &self.docs {
            lengths[d] += 1;
        }
        if lengths != self.doc_lengths() {
            return Err("document-topic rows do not match document lengths".to_string());
        }

        let assigned: usize = self.nz.iter().sum();
        if assigned != self.n_tokens() {
            return Err(format!("{} tokens assigned, {} in the stream", assigned, self.n_tokens()));
        }
        Ok(())
    }
}
