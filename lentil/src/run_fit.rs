use lentil::common_io::{mkdir, open_buf_writer};
use lentil::snapshot::{write_assignments, write_topics};
use lentil::{Corpus, Hdp, HdpOptions};

use clap::Args;
use indicatif::{ProgressBar, ProgressDrawTarget};
use log::info;
use std::io::Write;

#[derive(Args, Debug)]
pub struct FitArgs {
    /// lda-c corpus file: one document per line, `k w:c w:c ...`
    #[arg(long, short = 'd', required = true)]
    data: Box<str>,

    /// number of documents to read (default: every line)
    #[arg(long)]
    ndoc: Option<usize>,

    /// vocabulary size (default: largest word index + 1)
    #[arg(long)]
    nword: Option<usize>,

    /// output directory for snapshots and `params.json`
    #[arg(long, short = 'o', default_value = ".")]
    outdir: Box<str>,

    /// propensity to open a new table within a document
    #[arg(long, default_value_t = 1.0)]
    alpha: f64,

    /// Dirichlet smoothing of topic-word distributions
    #[arg(long, default_value_t = 0.5)]
    beta: f64,

    /// propensity to open a new dish across the franchise
    #[arg(long, default_value_t = 1.0)]
    gamma: f64,

    /// number of Gibbs iterations
    #[arg(long, default_value_t = 100)]
    max_iter: usize,

    /// write snapshots every this many iterations (default: max-iter)
    #[arg(long)]
    out_iter: Option<usize>,

    /// random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// memoized entries per log table
    #[arg(long, default_value_t = 1 << 16)]
    table_size: usize,

    /// verify every count invariant after each iteration (slow)
    #[arg(long, default_value_t = false)]
    check: bool,
}

pub fn fit_hdp(args: &FitArgs, verbose: bool) -> anyhow::Result<()> {
    if args.max_iter == 0 {
        anyhow::bail!("max-iter must be positive");
    }
    let out_iter = match args.out_iter {
        Some(0) => anyhow::bail!("out-iter must be positive"),
        Some(n) => n,
        None => args.max_iter,
    };

    let corpus = Corpus::read_lda_c(&args.data, args.ndoc, args.nword)?;

    let options = HdpOptions {
        alpha: args.alpha,
        beta: args.beta,
        gamma: args.gamma,
        table_size: args.table_size,
        seed: args.seed,
    };

    let mut hdp = Hdp::new(corpus, options)?;

    let params_file = format!("{}/params.json", args.outdir);
    mkdir(&params_file)?;
    let mut params = open_buf_writer(&params_file)?;
    serde_json::to_writer_pretty(&mut params, hdp.options())?;
    writeln!(params)?;
    params.flush()?;

    hdp.initialize().log();
    if args.check {
        hdp.check()?;
    }

    let pb = ProgressBar::new(args.max_iter as u64);
    if verbose {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    for _ in 0..args.max_iter {
        let iter = hdp.iterate();
        if args.check {
            hdp.check()?;
        }

        let i = iter.summary.iteration;
        if i % out_iter == 0 {
            write_snapshot(&hdp, &args.outdir, i)?;
        }
        iter.summary.log();
        pb.inc(1);
    }
    pb.finish_and_clear();

    let last = hdp.summary();
    info!(
        "{} topics over {} tables after {} iterations",
        last.n_dish, last.n_table, last.iteration
    );
    Ok(())
}

fn write_snapshot(hdp: &Hdp, outdir: &str, iteration: usize) -> anyhow::Result<()> {
    let topic_file = format!("{}/{:04}_topics.txt", outdir, iteration);
    let assign_file = format!("{}/{:04}_assignments.txt", outdir, iteration);

    let mut topic_out = open_buf_writer(&topic_file)?;
    write_topics(hdp.state(), &mut topic_out)?;
    topic_out.flush()?;

    let mut assign_out = open_buf_writer(&assign_file)?;
    write_assignments(hdp.state(), &mut assign_out)?;
    assign_out.flush()?;

    info!("wrote {} and {}", topic_file, assign_file);
    Ok(())
}
