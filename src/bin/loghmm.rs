use clap::{Parser, Subcommand};
use loghmm::{
    cli,
    config::{LearnConfig, OpdfKind},
};

#[derive(Parser, Debug)]
#[clap(author, about, version)]
struct Opts {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Learn HMM from sequences by k-means clustering, then refine it by Baum-Welch
    Kmeans {
        /// Learning configuration JSON. Flags override its fields.
        #[clap(long)]
        config: Option<std::path::PathBuf>,
        /// Number of hidden states
        #[clap(short = 'n')]
        n_states: Option<usize>,
        /// Number of Baum-Welch iterations after k-means
        #[clap(short = 'i')]
        n_iterations: Option<usize>,
        /// Seed of the k-means initialization
        #[clap(short = 's')]
        seed: Option<u64>,
        /// gaussian, lognormal or discrete:<n_symbols>
        #[clap(long)]
        opdf: Option<OpdfKind>,
        /// Input sequence filename
        seqs: std::path::PathBuf,
        /// Output model filename
        #[clap(short, long)]
        output: std::path::PathBuf,
    },
    /// Refine HMM by Baum-Welch
    BaumWelch {
        /// Learning configuration JSON. Flags override its fields.
        #[clap(long)]
        config: Option<std::path::PathBuf>,
        /// Number of iterations
        #[clap(short = 'i')]
        n_iterations: Option<usize>,
        /// gaussian, lognormal or discrete:<n_symbols>
        #[clap(long)]
        opdf: Option<OpdfKind>,
        /// Run the iterations on a single thread
        #[clap(long)]
        serial: bool,
        /// Input model filename
        model: std::path::PathBuf,
        /// Input sequence filename
        seqs: std::path::PathBuf,
        /// Output model filename
        #[clap(short, long)]
        output: std::path::PathBuf,
    },
    /// Print the most likely state sequence of each sequence
    Viterbi {
        #[clap(long, default_value = "gaussian")]
        opdf: OpdfKind,
        model: std::path::PathBuf,
        seqs: std::path::PathBuf,
    },
    /// Print the log likelihood of each sequence
    Likelihood {
        #[clap(long, default_value = "gaussian")]
        opdf: OpdfKind,
        model: std::path::PathBuf,
        seqs: std::path::PathBuf,
    },
    /// Sample sequences from HMM
    Generate {
        #[clap(long, default_value = "gaussian")]
        opdf: OpdfKind,
        /// Number of sequences
        #[clap(short = 'n', default_value_t = 10)]
        n: usize,
        /// Length of each sequence
        #[clap(short = 'l', default_value_t = 100)]
        length: usize,
        #[clap(short = 's', default_value_t = 0)]
        seed: u64,
        model: std::path::PathBuf,
    },
    /// Draw HMM in dot format
    Dot {
        #[clap(long, default_value = "gaussian")]
        opdf: OpdfKind,
        model: std::path::PathBuf,
    },
    /// Print HMM
    Show {
        #[clap(long, default_value = "gaussian")]
        opdf: OpdfKind,
        model: std::path::PathBuf,
    },
}

fn load_config(path: &Option<std::path::PathBuf>) -> loghmm::error::Result<LearnConfig> {
    match path {
        Some(path) => LearnConfig::from_json_file(path),
        None => Ok(LearnConfig::default()),
    }
}

fn run(opts: &Opts) -> loghmm::error::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match &opts.command {
        Commands::Kmeans {
            config,
            n_states,
            n_iterations,
            seed,
            opdf,
            seqs,
            output,
        } => {
            let mut config = load_config(config)?;
            if let Some(n_states) = n_states {
                config.n_states = *n_states;
            }
            if let Some(n_iterations) = n_iterations {
                config.n_iterations = *n_iterations;
            }
            if let Some(seed) = seed {
                config.seed = *seed;
            }
            if let Some(opdf) = opdf {
                config.opdf = *opdf;
            }
            println!("# config={:?}", config);
            cli::kmeans(&config, seqs, output)
        }
        Commands::BaumWelch {
            config,
            n_iterations,
            opdf,
            serial,
            model,
            seqs,
            output,
        } => {
            let mut config = load_config(config)?;
            if let Some(n_iterations) = n_iterations {
                config.n_iterations = *n_iterations;
            }
            if let Some(opdf) = opdf {
                config.opdf = *opdf;
            }
            if *serial {
                config.parallel = false;
            }
            println!("# config={:?}", config);
            cli::baum_welch(&config, model, seqs, output)
        }
        Commands::Viterbi { opdf, model, seqs } => cli::viterbi(*opdf, model, seqs, &mut out),
        Commands::Likelihood { opdf, model, seqs } => {
            cli::likelihood(*opdf, model, seqs, &mut out)
        }
        Commands::Generate {
            opdf,
            n,
            length,
            seed,
            model,
        } => cli::generate(*opdf, model, *n, *length, *seed, &mut out),
        Commands::Dot { opdf, model } => cli::dot(*opdf, model, &mut out),
        Commands::Show { opdf, model } => cli::show(*opdf, model, &mut out),
    }
}

fn main() {
    env_logger::init();
    let opts: Opts = Opts::parse();
    println!("# started_at={}", chrono::Local::now());
    println!("# n_threads={}", rayon::current_num_threads());
    println!("# opts={:?}", opts);
    if let Err(e) = run(&opts) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
    println!("# finished_at={}", chrono::Local::now());
}
