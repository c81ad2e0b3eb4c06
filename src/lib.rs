//! Latent Dirichlet Allocation by collapsed Gibbs sampling, with a periodic
//! embedding-driven reshaping of the least coherent topic.
//!
//! The sampler keeps the classical count statistics ([`CountState`]) and draws
//! each token's topic from a blend of the collapsed conditional and an
//! adjusted topic-word distribution maintained by the [`CoherenceAdjuster`].
//! [`EmbeddedLda`] drives the fit; [`inference`] projects unseen documents
//! onto the fitted topics.

pub mod coherence;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod eval;
pub mod inference;
pub mod lda;
pub mod matrix;
pub mod priors;
pub mod report;
pub mod rng;
pub mod sampler;
pub mod state;

pub use coherence::CoherenceAdjuster;
pub use config::LdaConfig;
pub use corpus::{Corpus, CorpusConfig};
pub use embedding::{Vocabulary, WordEmbeddings, WordVectors};
pub use error::{LdaError, Result};
pub use lda::{EmbeddedLda, FittedModel};
pub use matrix::DocTermMatrix;
pub use priors::Priors;
pub use report::{ModeledTopic, TopicReport};
pub use rng::VariateBuffer;
pub use state::CountState;
