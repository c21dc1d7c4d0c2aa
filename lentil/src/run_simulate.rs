use lentil::common_io::mkdir;
use lentil::simulate::{generate_corpus, write_simulation, SimArgs};

use clap::Args;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// output file header: {out}.lda.gz, {out}.topics.tsv.gz, {out}.assignments.tsv.gz
    #[arg(long, short, required = true)]
    out: Box<str>,

    /// number of documents
    #[arg(long, default_value_t = 100)]
    ndoc: usize,

    /// vocabulary size
    #[arg(long, default_value_t = 50)]
    nword: usize,

    /// number of true topics
    #[arg(long, short = 'k', default_value_t = 5)]
    ntopic: usize,

    /// expected number of tokens per document
    #[arg(long, default_value_t = 50.0)]
    doc_length: f64,

    /// Gamma shape of topic-word weights (smaller is sparser)
    #[arg(long, default_value_t = 0.1)]
    word_shape: f64,

    /// Gamma shape of document-topic weights (smaller is sparser)
    #[arg(long, default_value_t = 0.2)]
    topic_shape: f64,

    /// random seed
    #[arg(long, default_value_t = 42)]
    rseed: u64,
}

pub fn simulate_corpus(args: &SimulateArgs) -> anyhow::Result<()> {
    let data_file = format!("{}.lda.gz", args.out);
    let topic_file = format!("{}.topics.tsv.gz", args.out);
    let assignment_file = format!("{}.assignments.tsv.gz", args.out);
    mkdir(&data_file)?;

    let sim = generate_corpus(&SimArgs {
        n_doc: args.ndoc,
        n_word: args.nword,
        n_topic: args.ntopic,
        doc_length: args.doc_length,
        word_shape: args.word_shape,
        topic_shape: args.topic_shape,
        rseed: args.rseed,
    })?;

    write_simulation(&sim, &data_file, &topic_file, &assignment_file)?;
    Ok(())
}
