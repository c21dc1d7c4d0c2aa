use crate::common_io::write_lines;
use crate::corpus::Corpus;
use log::info;
use rand::SeedableRng;
use rand_distr::{weighted::WeightedIndex, Distribution, Gamma, Poisson};

/// Size and sparsity of a simulated corpus
pub struct SimArgs {
    /// number of documents
    pub n_doc: usize,
    /// vocabulary size
    pub n_word: usize,
    /// number of true topics
    pub n_topic: usize,
    /// expected number of tokens per document
    pub doc_length: f64,
    /// Gamma shape of the topic-word weights; small values give sparse topics
    pub word_shape: f64,
    /// Gamma shape of the document-topic weights
    pub topic_shape: f64,
    /// random seed
    pub rseed: u64,
}

impl Default for SimArgs {
    fn default() -> Self {
        SimArgs {
            n_doc: 100,
            n_word: 50,
            n_topic: 5,
            doc_length: 50.0,
            word_shape: 0.1,
            topic_shape: 0.2,
            rseed: 42,
        }
    }
}

/// Simulated corpus with its true topic counts
pub struct SimOut {
    /// the tokens
    pub corpus: Corpus,
    /// `topic_word[k][w]`: tokens of word `w` drawn from topic `k`
    pub topic_word: Vec<Vec<usize>>,
    /// `doc_topic[d][k]`: tokens of document `d` drawn from topic `k`
    pub doc_topic: Vec<Vec<usize>>,
}

/// Draw a corpus from a finite topic model
///
/// ```text
/// phi(k,w)   ~ Gamma(word_shape, 1)
/// theta(d,k) ~ Gamma(topic_shape, 1)
/// N(d)       ~ Poisson(doc_length)
/// z ~ Categorical(theta(d,.)),  w ~ Categorical(phi(z,.))
/// ```
///
pub fn generate_corpus(args: &SimArgs) -> anyhow::Result<SimOut> {
    if args.n_word == 0 || args.n_topic == 0 {
        return Err(anyhow::anyhow!("need at least one word and one topic"));
    }

    let mut rng = rand::rngs::StdRng::seed_from_u64(args.rseed);

    let rgamma_phi = Gamma::new(args.word_shape, 1.0)?;
    let rgamma_theta = Gamma::new(args.topic_shape, 1.0)?;
    let rpois = Poisson::new(args.doc_length)?;

    // tiny shapes can round every weight of a row to zero
    let floor = |x: f64| x.max(f64::MIN_POSITIVE);

    let word_dists = (0..args.n_topic)
        .map(|_| {
            let phi: Vec<f64> = (0..args.n_word)
                .map(|_| floor(rgamma_phi.sample(&mut rng)))
                .collect();
            WeightedIndex::new(phi)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut topic_word = vec![vec![0usize; args.n_word]; args.n_topic];
    let mut doc_topic = vec![vec![0usize; args.n_topic]; args.n_doc];
    let mut docs = Vec::with_capacity(args.n_doc);

    for counts in doc_topic.iter_mut() {
        let theta: Vec<f64> = (0..args.n_topic)
            .map(|_| floor(rgamma_theta.sample(&mut rng)))
            .collect();
        let topic_dist = WeightedIndex::new(theta)?;
        let len = rpois.sample(&mut rng) as usize;

        let doc: Vec<usize> = (0..len)
            .map(|_| {
                let k = topic_dist.sample(&mut rng);
                let w = word_dists[k].sample(&mut rng);
                counts[k] += 1;
                topic_word[k][w] += 1;
                w
            })
            .collect();
        docs.push(doc);
    }

    let corpus = Corpus::from_documents(docs, args.n_word)?;
    info!(
        "simulated {} documents, {} tokens from {} topics",
        corpus.n_doc(),
        corpus.n_token(),
        args.n_topic
    );

    Ok(SimOut {
        corpus,
        topic_word,
        doc_topic,
    })
}

/// Write the simulated data
/// * `out`: simulation output
/// * `data_file`: lda-c corpus
/// * `topic_file`: true topic-word counts, one topic per line
/// * `assignment_file`: true document-topic counts, one document per line
pub fn write_simulation(
    out: &SimOut,
    data_file: &str,
    topic_file: &str,
    assignment_file: &str,
) -> anyhow::Result<()> {
    out.corpus.write_lda_c(data_file)?;
    write_lines(&tsv_lines(&out.topic_word), topic_file)?;
    write_lines(&tsv_lines(&out.doc_topic), assignment_file)?;
    Ok(())
}

fn tsv_lines(rows: &[Vec<usize>]) -> Vec<Box<str>> {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|x| x.to_string())
                .collect::<Vec<_>>()
                .join("\t")
                .into_boxed_str()
        })
        .collect()
}
