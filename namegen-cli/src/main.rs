use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use namegen_core::io::{load_config, load_model, read_corpus, save_model, train};
use namegen_core::{distinct_names, BuiltinAlphabets, GenerationConfig, Locale, NameRequest};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(name = "namegen", about = "Train Markov name models and generate names from them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Learn a model from a file of newline separated names
    Train(TrainArgs),
    /// Generate names from a trained model
    Generate(GenerateArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Corpus file, one name per line
    #[arg(short, long)]
    input: PathBuf,

    /// Model file to write (`.json` for text, anything else for binary)
    #[arg(short, long)]
    output: PathBuf,

    /// TOML file with default settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Order of the Markov chain (how many letters to consider)
    #[arg(long)]
    order: Option<usize>,

    /// Prior mass per alphabet letter; higher is more random
    #[arg(long)]
    prior: Option<f64>,

    /// Locale used for sometimes generating letters unseen in the training data
    #[arg(long)]
    locale: Option<String>,
}

#[derive(Args)]
struct GenerateArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// TOML file with default settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of distinct names to generate
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Retries per name when a draw repeats an earlier or excluded name
    #[arg(long, default_value_t = 100)]
    nb_try: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Corpus whose names must not be generated again
    #[arg(long)]
    exclude: Option<PathBuf>,
}

fn base_config(path: Option<&Path>) -> Result<GenerationConfig> {
    match path {
        Some(path) => load_config(path).with_context(|| format!("reading config {}", path.display())),
        None => Ok(GenerationConfig::default()),
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    let mut config = base_config(args.config.as_deref())?;
    if let Some(order) = args.order {
        config.order = order;
    }
    if args.prior.is_some() {
        config.prior = args.prior;
    }
    if let Some(locale) = &args.locale {
        config.locale = Locale::new(locale)?;
    }
    config.validate()?;

    let start = Instant::now();
    let lines = read_corpus(&args.input).with_context(|| format!("reading corpus {}", args.input.display()))?;
    let model = train(&lines, &config, Arc::new(BuiltinAlphabets))?;
    log::info!(
        "File {} analyzed in {} ms ({} names, {} contexts)",
        args.input.display(),
        start.elapsed().as_millis(),
        lines.len(),
        model.context_count()
    );

    save_model(&args.output, &model).with_context(|| format!("writing model {}", args.output.display()))?;
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let config = base_config(args.config.as_deref())?;
    let model = load_model(&args.model).with_context(|| format!("loading model {}", args.model.display()))?;

    let mut request = NameRequest::new(args.count.unwrap_or(config.count));
    request.nb_try = args.nb_try;
    if let Some(path) = &args.exclude {
        request.exclude = read_corpus(path)?.into_iter().collect::<HashSet<_>>();
    }

    let names = match args.seed {
        Some(seed) => distinct_names(&model, &request, &mut StdRng::seed_from_u64(seed))?,
        None => distinct_names(&model, &request, &mut rand::rng())?,
    };
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    match Cli::parse().command {
        Command::Train(args) => run_train(args),
        Command::Generate(args) => run_generate(args),
    }
}
