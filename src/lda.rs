//! Collapsed Gibbs LDA with embedding-driven coherence adjustment.
//!
//! # Quick Start
//!
//! ```
//! use embed_lda::{DocTermMatrix, EmbeddedLda, LdaConfig};
//!
//! let dtm = DocTermMatrix::from_dense(&[
//!     vec![1, 1],
//!     vec![2, 1],
//!     vec![3, 1],
//!     vec![4, 1],
//!     vec![5, 8],
//!     vec![6, 1],
//! ]).expect("rows have equal length");
//!
//! let config = LdaConfig::new(2).with_n_iter(100).with_seed(1).with_lamda(1.0);
//! let mut lda = EmbeddedLda::new(config).expect("valid config");
//! let model = lda.fit(&dtm).expect("fit succeeds");
//! assert_eq!(model.topic_word.len(), 2);
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::coherence::{top_words, CoherenceAdjuster};
use crate::config::LdaConfig;
use crate::embedding::{Vocabulary, WordEmbeddings};
use crate::error::{LdaError, Result};
use crate::eval;
use crate::inference;
use crate::matrix::DocTermMatrix;
use crate::priors::Priors;
use crate::rng::VariateBuffer;
use crate::sampler::sample_pass;
use crate::state::CountState;

/// Public state of a fitted model.
#[derive(Debug, Clone, Serialize)]
pub struct FittedModel {
    pub n_topics: usize,
    pub n_words: usize,
    pub topic_word: Vec<Vec<f64>>,  // Topics x Words, blended with the adjusted distribution
    pub doc_topic: Vec<Vec<f64>>,   // Documents x Topics
    pub nzw: Vec<Vec<usize>>,
    pub ndz: Vec<Vec<usize>>,
    pub nz: Vec<usize>,
    pub loglikelihoods: Vec<f64>,
    pub perplexity: Option<f64>,
}

impl FittedModel {
    /// The `n` most probable word ids of `topic` with their probabilities.
    pub fn top_words(&self, topic: usize, n: usize) -> Vec<(usize, f64)> {
        let row = &self.topic_word[topic];
        top_words(std::slice::from_ref(row), n)
            .remove(0)
            .into_iter()
            .map(|w| (w, row[w]))
            .collect()
    }
}

struct EmbeddingSource {
    embeddings: Box<dyn WordEmbeddings + Send + Sync>,
    vocabulary: Vocabulary,
}

pub struct EmbeddedLda {
    config: LdaConfig,
    variates: VariateBuffer,
    embeddings: Option<EmbeddingSource>,
    word_prior: Option<Vec<f64>>,
    model: Option<FittedModel>,
}

impl EmbeddedLda {
    pub fn new(config: LdaConfig) -> Result<Self> {
        config.validate()?;
        let variates = VariateBuffer::new(config.variate_block, config.seed);
        Ok(EmbeddedLda {
            config,
            variates,
            embeddings: None,
            word_prior: None,
            model: None,
        })
    }

    /// Enables the coherence adjuster. `vocabulary` maps the matrix's word ids to embedding tokens.
    pub fn with_embeddings<E>(mut self, embeddings: E, vocabulary: Vocabulary) -> Self
    where
        E: WordEmbeddings + Send + Sync + 'static,
    {
        self.embeddings = Some(EmbeddingSource {
            embeddings: Box::new(embeddings),
            vocabulary,
        });
        self
    }

    /// Replaces the scalar `eta` with one prior per vocabulary word.
    pub fn with_word_prior(mut self, eta: Vec<f64>) -> Self {
        self.word_prior = Some(eta);
        self
    }

    pub fn config(&self) -> &LdaConfig {
        &self.config
    }

    pub fn model(&self) -> Option<&FittedModel> {
        self.model.as_ref()
    }

    fn fitted(&self) -> Result<&FittedModel> {
        self.model.as_ref().ok_or(LdaError::NotFitted)
    }

    fn priors(&self, n_words: usize) -> Result<Priors> {
        match &self.word_prior {
            Some(eta) if eta.len() != n_words => Err(LdaError::shape(
                format!("{} word priors", n_words),
                format!("{} word priors", eta.len()),
            )),
            Some(eta) => Priors::with_word_prior(self.config.alpha, eta.clone()),
            None => Ok(Priors::symmetric(self.config.alpha, self.config.eta, n_words)),
        }
    }

    fn check_embeddings(&self, n_words: usize) -> Result<()> {
        let Some(source) = &self.embeddings else {
            return Ok(());
        };
        if source.vocabulary.len() != n_words {
            return Err(LdaError::shape(
                format!("{} vocabulary entries", n_words),
                format!("{} vocabulary entries", source.vocabulary.len()),
            ));
        }
        if n_words < self.config.top_words {
            return Err(LdaError::invalid_config(
                "top_words",
                self.config.top_words,
                &format!("coherence adjustment needs a vocabulary of at least top_words words, got {}", n_words),
            ));
        }
        Ok(())
    }

    /// Fits the model to `dtm` and returns the fitted state.
    pub fn fit(&mut self, dtm: &DocTermMatrix) -> Result<&FittedModel> {
        let n_words = dtm.n_words();
        let n_topics = self.config.n_topics;
        self.check_embeddings(n_words)?;
        let priors = self.priors(n_words)?;

        info!(
            n_documents = dtm.n_docs(),
            vocab_size = n_words,
            n_words = dtm.total(),
            n_topics,
            n_iter = self.config.n_iter,
            "fitting"
        );

        let mut state = CountState::initialize(dtm, n_topics)?;
        let mut adjusted = priors.uniform_topic_word(n_topics);
        let adjuster = CoherenceAdjuster::new(self.config.top_words, self.config.reweight_words);
        let mut loglikelihoods = Vec::new();

        let mut variates = self.variates.restarted(self.config.seed);
        for it in 0..self.config.n_iter {
            variates.reshuffle();
            if it % self.config.refresh == 0 {
                let ll = eval::loglikelihood(&state, &priors);
                debug!(iteration = it, loglikelihood = ll, "snapshot");
                loglikelihoods.push(ll);
            }
            sample_pass(&mut state, &variates, &priors, self.config.lamda, &adjusted);

            if let Some(source) = &self.embeddings {
                if it % self.config.coherence_every == 0 {
                    let topic = adjuster.adjust(
                        &state,
                        &priors,
                        &source.vocabulary,
                        source.embeddings.as_ref(),
                        &mut adjusted,
                    )?;
                    if topic.is_none() {
                        warn!(iteration = it, "no outlier topic to adjust");
                    }
                }
            }
        }

        let ll = eval::loglikelihood(&state, &priors);
        info!(iteration = self.config.n_iter - 1, loglikelihood = ll, "final log likelihood");
        loglikelihoods.push(ll);

        let lamda = self.config.lamda;
        let topic_word: Vec<Vec<f64>> = priors
            .smoothed_topic_word(&state)
            .into_iter()
            .zip(&adjusted)
            .map(|(row, adjusted_row)| {
                row.iter()
                    .zip(adjusted_row)
                    .map(|(p, q)| lamda * p + (1.0 - lamda) * q)
                    .collect()
            })
            .collect();
        let doc_topic = priors.doc_topic(state.ndz());

        let perplexity = match eval::perplexity(dtm, &doc_topic, &topic_word) {
            Ok(score) => {
                info!(perplexity = score, "training perplexity");
                Some(score)
            }
            Err(e) => {
                warn!(error = %e, "training perplexity unavailable");
                None
            }
        };

        let (nzw, ndz, nz) = state.into_counts();
        self.model = Some(FittedModel {
            n_topics,
            n_words,
            topic_word,
            doc_topic,
            nzw,
            ndz,
            nz,
            loglikelihoods,
            perplexity,
        });
        self.fitted()
    }

    /// Fits the model and returns the document-topic distribution of `dtm`.
    pub fn fit_transform(&mut self, dtm: &DocTermMatrix) -> Result<Vec<Vec<f64>>> {
        Ok(self.fit(dtm)?.doc_topic.clone())
    }

    /// Topic mixtures of new documents, using the configured iteration bound and tolerance.
    pub fn transform(&self, dtm: &DocTermMatrix) -> Result<Vec<Vec<f64>>> {
        self.transform_with(dtm, self.config.transform_max_iter, self.config.transform_tol)
    }

    pub fn transform_with(&self, dtm: &DocTermMatrix, max_iter: usize, tol: f64) -> Result<Vec<Vec<f64>>> {
        let model = self.fitted()?;
        inference::transform(&model.topic_word, dtm, self.config.alpha, max_iter, tol)
    }

    /// Perplexity of `dtm` under the fitted document-topic and topic-word distributions.
    /// `dtm` must describe the fitted documents.
    pub fn perplexity(&self, dtm: &DocTermMatrix) -> Result<f64> {
        let model = self.fitted()?;
        eval::perplexity(dtm, &model.doc_topic, &model.topic_word)
    }

    /// Last recorded log likelihood.
    pub fn loglikelihood(&self) -> Result<f64> {
        self.fitted()?
            .loglikelihoods
            .last()
            .copied()
            .ok_or(LdaError::NotFitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::WordVectors;

    fn reference_matrix() -> DocTermMatrix {
        DocTermMatrix::from_dense(&[
            vec![1, 1],
            vec![2, 1],
            vec![3, 1],
            vec![4, 1],
            vec![5, 8],
            vec![6, 1],
        ])
        .unwrap()
    }

    #[test]
    fn seeded_refit_repeats_the_first_fit() {
        let config = LdaConfig::new(2).with_n_iter(100).with_seed(0).with_lamda(1.0);
        let mut lda = EmbeddedLda::new(config.clone()).unwrap();
        let first = lda.fit(&reference_matrix()).unwrap().clone();
        let second = lda.fit(&reference_matrix()).unwrap().clone();
        assert_eq!(first.nzw, second.nzw);
        assert_eq!(first.loglikelihoods, second.loglikelihoods);

        let fresh = EmbeddedLda::new(config).unwrap().fit(&reference_matrix()).unwrap().nzw.clone();
        assert_eq!(first.nzw, fresh);
    }

    #[test]
    fn rejects_invalid_priors_at_construction() {
        assert!(matches!(
            EmbeddedLda::new(LdaConfig::new(2).with_alpha(0.0)),
            Err(LdaError::InvalidConfig { .. })
        ));
        assert!(matches!(
            EmbeddedLda::new(LdaConfig::new(2).with_eta(0.0)),
            Err(LdaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn queries_before_fit_fail() {
        let lda = EmbeddedLda::new(LdaConfig::new(2)).unwrap();
        assert!(matches!(lda.transform(&reference_matrix()), Err(LdaError::NotFitted)));
        assert!(matches!(lda.perplexity(&reference_matrix()), Err(LdaError::NotFitted)));
        assert!(lda.model().is_none());
    }

    #[test]
    fn trace_has_one_entry_per_refresh_plus_final() {
        let config = LdaConfig::new(2).with_n_iter(25).with_refresh(10).with_seed(3);
        let mut lda = EmbeddedLda::new(config).unwrap();
        let model = lda.fit(&reference_matrix()).unwrap();
        // iterations 0, 10, 20 plus the final snapshot
        assert_eq!(model.loglikelihoods.len(), 4);
    }

    #[test]
    fn fitted_distributions_are_row_stochastic() {
        let config = LdaConfig::new(3).with_n_iter(30).with_seed(8);
        let mut lda = EmbeddedLda::new(config).unwrap();
        let model = lda.fit(&reference_matrix()).unwrap();

        for row in model.topic_word.iter().chain(&model.doc_topic) {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
        assert_eq!(model.nz.iter().sum::<usize>(), 33);
        assert!(model.perplexity.unwrap() > 1.0);
    }

    #[test]
    fn same_seed_same_fit() {
        let config = LdaConfig::new(2).with_n_iter(40).with_seed(21);
        let mut a = EmbeddedLda::new(config.clone()).unwrap();
        let mut b = EmbeddedLda::new(config).unwrap();
        let nzw_a = a.fit(&reference_matrix()).unwrap().nzw.clone();
        let nzw_b = b.fit(&reference_matrix()).unwrap().nzw.clone();
        assert_eq!(nzw_a, nzw_b);
    }

    #[test]
    fn embeddings_need_a_large_enough_vocabulary() {
        let mut vectors = WordVectors::new(1);
        vectors.insert("a", vec![1.0]).unwrap();
        vectors.insert("b", vec![1.0]).unwrap();
        let vocabulary = Vocabulary::new(vec!["a".into(), "b".into()]);

        let mut lda = EmbeddedLda::new(LdaConfig::new(2).with_n_iter(2))
            .unwrap()
            .with_embeddings(vectors, vocabulary);
        let err = lda.fit(&reference_matrix()).unwrap_err();
        assert!(matches!(err, LdaError::InvalidConfig { .. }));
    }

    #[test]
    fn word_prior_length_must_match() {
        let mut lda = EmbeddedLda::new(LdaConfig::new(2).with_n_iter(2))
            .unwrap()
            .with_word_prior(vec![0.01; 3]);
        assert!(matches!(lda.fit(&reference_matrix()), Err(LdaError::ShapeMismatch { .. })));
    }

    #[test]
    fn top_words_are_sorted() {
        let config = LdaConfig::new(2).with_n_iter(20).with_seed(2);
        let mut lda = EmbeddedLda::new(config).unwrap();
        let model = lda.fit(&reference_matrix()).unwrap();
        let top = model.top_words(0, 2);
        assert_eq!(top.len(), 2);
        assert!(top[0].1 >= top[1].1);
    }
}
