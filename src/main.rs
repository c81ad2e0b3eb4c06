use std::fs;
use std::path::PathBuf;

use clap::Parser;
use embed_lda::{Corpus, CorpusConfig, EmbeddedLda, LdaConfig, TopicReport, WordEmbeddings, WordVectors};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Fit an embedding-adjusted LDA topic model to a text corpus", long_about = None)]
struct Args {
    #[clap(help = "Corpus file with one document per line")]
    corpus: PathBuf,
    #[clap(short, long, help = "Word vectors in word2vec text format; enables coherence adjustment")]
    embeddings: Option<PathBuf>,
    #[clap(short, long, help = "JSON file with model hyper-parameters; flags below override it")]
    config: Option<PathBuf>,
    #[clap(short = 'k', long)]
    topics: Option<usize>,
    #[clap(short = 'n', long)]
    iterations: Option<usize>,
    #[clap(long)]
    alpha: Option<f64>,
    #[clap(long)]
    eta: Option<f64>,
    #[clap(long, help = "Weight of the count-based distribution in [0, 1]")]
    lamda: Option<f64>,
    #[clap(long, help = "Record the log likelihood every N iterations")]
    refresh: Option<usize>,
    #[clap(short, long)]
    seed: Option<u64>,
    #[clap(long, default_value_t = 10, help = "Words listed per topic in the report")]
    top_words: usize,
    #[clap(long, default_value_t = 2)]
    min_word_freq: usize,
    #[clap(long, default_value_t = 10_000)]
    max_vocab_size: usize,
    #[clap(long, help = "Keep common English stop words")]
    keep_stop_words: bool,
    #[clap(short, long, help = "Write the topic report as JSON to this path")]
    output: Option<PathBuf>,
}

impl Args {
    fn lda_config(&self) -> Result<LdaConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => LdaConfig::from_json_file(path)?,
            None => LdaConfig::default(),
        };
        if let Some(topics) = self.topics {
            config.n_topics = topics;
        }
        if let Some(iterations) = self.iterations {
            config.n_iter = iterations;
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(eta) = self.eta {
            config.eta = eta;
        }
        if let Some(lamda) = self.lamda {
            config.lamda = lamda;
        }
        if let Some(refresh) = self.refresh {
            config.refresh = refresh;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.lda_config()?;
    println!("Corpus: {}", args.corpus.display());

    let text = fs::read_to_string(&args.corpus)?;
    let texts: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    let corpus_config = CorpusConfig {
        min_word_freq: args.min_word_freq,
        max_vocab_size: args.max_vocab_size,
        remove_stop_words: !args.keep_stop_words,
    };
    let corpus = Corpus::from_texts(&texts, &corpus_config)?;
    println!("Loaded {} documents, {} vocabulary words, {} tokens",
             corpus.matrix.n_docs(), corpus.vocabulary.len(), corpus.matrix.total());

    let mut lda = EmbeddedLda::new(config.clone())?;
    if let Some(path) = &args.embeddings {
        let vectors = WordVectors::from_word2vec_text(path)?;
        println!("Loaded {} word vectors of dimension {}", vectors.len(), vectors.dimension());
        lda = lda.with_embeddings(vectors, corpus.vocabulary.clone());
    } else {
        println!("No embeddings given, coherence adjustment disabled");
    }

    let model = lda.fit(&corpus.matrix)?;
    let report = TopicReport::build(model, &corpus.vocabulary, &corpus.matrix, &config, args.top_words)?;

    report.print_summary();
    if let Some(path) = &args.output {
        report.write_json(path)?;
        println!("✅ Report written to {}", path.display());
    }
    Ok(())
}
