//! bcryptx CLI
//!
//! Tune bcrypt costs for this machine, and hash, verify or inspect passwords
//! with the tuned costs.
//!
//! Usage:
//!   bcryptx tune --quick-ms 400 --strong-ms 1600
//!   bcryptx hash --tier strong 'correct horse'
//!   bcryptx verify '$2b$10$...' 'correct horse'
//!   bcryptx inspect '$2b$10$...'

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use bcryptx_core::{Bcrypter, Error, Tier, TunerConfig};

mod report;

#[derive(Parser, Debug)]
#[command(name = "bcryptx")]
#[command(about = "bcrypt hashing with quick and strong costs tuned to this machine")]
#[command(version)]
struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    tuning: TuningArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct TuningArgs {
    /// JSON config file (quick_max_latency_ms, strong_max_latency_ms, concurrency_limit)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Quick tier latency budget in milliseconds
    #[arg(long, global = true)]
    quick_ms: Option<u64>,

    /// Strong tier latency budget in milliseconds
    #[arg(long, global = true)]
    strong_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tune costs and print the latency table
    Tune {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Hash a password at a tier's cost
    Hash {
        #[arg(long, value_enum, default_value_t = TierArg::Quick)]
        tier: TierArg,

        password: String,
    },

    /// Check a password against a hash
    Verify { hash: String, password: String },

    /// Show a hash's cost and the highest tier it satisfies
    Inspect {
        hash: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TierArg {
    Quick,
    Strong,
}

impl From<TierArg> for Tier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Quick => Tier::Quick,
            TierArg::Strong => Tier::Strong,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<Error>() {
                Some(err) => eprintln!("error [{}]: {}", err.code(), err),
                None => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8) {
    let level = log_level(verbose);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(&cli.tuning)?;
    tracing::info!(
        quick_ms = config.quick_max_latency.as_millis() as u64,
        strong_ms = config.strong_max_latency.as_millis() as u64,
        "Using latency budgets"
    );
    let bcx = Bcrypter::new(config);

    match cli.command {
        Command::Tune { json } => {
            let tuning = bcx.tune()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report::TuneOutput::new(&tuning))?);
            } else {
                print!("{}", report::render_table(&tuning));
            }
        }
        Command::Hash { tier, password } => {
            println!("{}", bcx.generate(tier.into(), &password)?);
        }
        Command::Verify { hash, password } => match bcx.compare(&hash, &password) {
            Ok(()) => println!("match"),
            Err(Error::Mismatch) => {
                println!("mismatch");
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => return Err(e.into()),
        },
        Command::Inspect { hash, json } => {
            let cost = bcx.validate_hash(&hash)?;
            let costs = bcx.current_costs()?;
            let tier = bcx.tier_of(&hash)?;
            let output = report::InspectOutput { cost, tier, tuned: costs };
            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{output}");
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_config(args: &TuningArgs) -> anyhow::Result<TunerConfig> {
    let mut config = match &args.config {
        Some(path) => TunerConfig::load(path)?,
        None => TunerConfig::default(),
    };

    if let Some(ms) = args.quick_ms {
        config = config.with_quick_max_latency(Duration::from_millis(ms));
    }
    if let Some(ms) = args.strong_ms {
        config = config.with_strong_max_latency(Duration::from_millis(ms));
    }

    Ok(config.normalized())
}
