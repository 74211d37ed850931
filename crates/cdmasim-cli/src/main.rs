//! Spread-Spectrum Simulator Command-Line Interface
//!
//! This CLI provides tools for:
//! - Simulating two users sharing a Gold code family over a noisy channel
//! - Simulating a single user through XOR spreading with bit errors
//! - Sweeping BER against channel noise
//! - Printing or checking the configuration
//!
//! Reports are printed to stdout and kept in a rotating report directory.

mod store;

use anyhow::{Context, Result};
use cdmasim_core::error_injection::ErrorPattern;
use cdmasim_core::observe::{init_logging, LogConfig};
use cdmasim_sim::{
    CdmaParams, CdmaSimulator, ConfigOrigin, DataSource, LinkParams, LinkSimulator, NoiseSweep,
    SimConfig,
};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use store::{ReportStore, CDMA_PREFIX, LINK_PREFIX};
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "cdmasim")]
#[command(author, version, about = "Gold code spread-spectrum simulator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (default: search path)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed of the random source (default: from entropy)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Print reports without saving them
    #[arg(long, global = true)]
    no_save: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Two users sharing a Gold code family over an AWGN channel
    Cdma {
        /// Register width n (codes are 2^n - 1 chips)
        #[arg(long)]
        width: Option<u32>,

        /// Taps of the first register, e.g. 0,3
        #[arg(long, value_delimiter = ',')]
        poly1: Option<Vec<u32>>,

        /// Taps of the second register, e.g. 0,2,3,8
        #[arg(long, value_delimiter = ',')]
        poly2: Option<Vec<u32>>,

        /// User A first seed (decimal, 0b or 0x)
        #[arg(long, value_parser = parse_seed)]
        seed_a1: Option<u64>,

        /// User A second seed
        #[arg(long, value_parser = parse_seed)]
        seed_a2: Option<u64>,

        /// User B first seed
        #[arg(long, value_parser = parse_seed)]
        seed_b1: Option<u64>,

        /// User B second seed
        #[arg(long, value_parser = parse_seed)]
        seed_b2: Option<u64>,

        /// User A text
        #[arg(long)]
        text_a: Option<String>,

        /// User B text
        #[arg(long)]
        text_b: Option<String>,

        /// Random bits for every user without --text-*
        #[arg(long)]
        random_bits: Option<usize>,

        /// Channel noise standard deviation
        #[arg(long)]
        noise: Option<f64>,
    },

    /// One user through XOR spreading and bit-error injection
    Link {
        /// Register width n
        #[arg(long)]
        width: Option<u32>,

        /// Taps of the first register
        #[arg(long, value_delimiter = ',')]
        poly1: Option<Vec<u32>>,

        /// Taps of the second register
        #[arg(long, value_delimiter = ',')]
        poly2: Option<Vec<u32>>,

        /// First seed (decimal, 0b or 0x)
        #[arg(long, value_parser = parse_seed)]
        seed1: Option<u64>,

        /// Second seed
        #[arg(long, value_parser = parse_seed)]
        seed2: Option<u64>,

        /// Text payload
        #[arg(long, conflicts_with = "random_bits")]
        text: Option<String>,

        /// Random payload of this many bits
        #[arg(long)]
        random_bits: Option<usize>,

        /// Percentage of bits to flip (0-100)
        #[arg(long)]
        error_rate: Option<f64>,

        /// Error placement (random, burst)
        #[arg(long)]
        error_kind: Option<ErrorPattern>,

        /// Skip the receiver
        #[arg(long)]
        no_decode: bool,
    },

    /// BER vs channel noise for the configured two-user setup
    Sweep {
        /// Noise standard deviations, e.g. 0,5,10,20
        #[arg(long, value_delimiter = ',')]
        noise_levels: Option<Vec<f64>>,

        /// Maximum runs per noise level
        #[arg(long)]
        trials: Option<usize>,

        /// CSV output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print configuration
    Config {
        /// Print the loaded configuration instead of the defaults
        #[arg(long)]
        effective: bool,

        /// Validate every section of the loaded configuration and exit
        #[arg(long, conflicts_with = "effective")]
        check: bool,
    },
}

/// Parse a seed given in decimal, `0b` binary or `0x` hex.
fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let parsed = if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2)
    } else if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|e| format!("invalid seed '{}': {}", s, e))
}

fn load_config(path: Option<&PathBuf>) -> Result<(SimConfig, ConfigOrigin)> {
    match path {
        Some(path) => {
            let config = SimConfig::load_from(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            let origin = ConfigOrigin {
                file: Some(path.clone()),
                ..Default::default()
            };
            Ok((config, origin))
        }
        None => SimConfig::load().context("Failed to load config"),
    }
}

fn log_origin(origin: &ConfigOrigin) {
    if let Some(path) = &origin.missing_env {
        warn!(path = %path.display(), "CDMASIM_CONFIG points to a missing file");
    }
    match &origin.file {
        Some(path) => debug!(path = %path.display(), "loaded configuration"),
        None => debug!("no configuration file, using defaults"),
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(rand::random);
    info!(seed, "random source seeded");
    StdRng::seed_from_u64(seed)
}

fn save_report(
    config: &SimConfig,
    no_save: bool,
    kind: &str,
    prefix: &'static str,
    report: &str,
    timestamp: chrono::DateTime<chrono::Utc>,
) -> Result<()> {
    if no_save || !config.output.save {
        return Ok(());
    }
    config.output.validate().context("Invalid output configuration")?;
    let store = ReportStore::new(config.output.dir.join(kind), prefix, config.output.keep);
    let path = store
        .save(report, timestamp)
        .with_context(|| format!("Failed to save report to {}", store.dir().display()))?;
    info!(path = %path.display(), "report saved");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_cdma(
    config: &SimConfig,
    rng: &mut StdRng,
    no_save: bool,
    width: Option<u32>,
    poly1: Option<Vec<u32>>,
    poly2: Option<Vec<u32>>,
    seeds: [Option<u64>; 4],
    text_a: Option<String>,
    text_b: Option<String>,
    random_bits: Option<usize>,
    noise: Option<f64>,
) -> Result<()> {
    let mut params: CdmaParams = config.cdma.clone();
    if let Some(width) = width {
        params.width = width;
    }
    if let Some(poly1) = poly1 {
        params.poly1 = poly1;
    }
    if let Some(poly2) = poly2 {
        params.poly2 = poly2;
    }
    let [a1, a2, b1, b2] = seeds;
    params.user_a.seed1 = a1.unwrap_or(params.user_a.seed1);
    params.user_a.seed2 = a2.unwrap_or(params.user_a.seed2);
    params.user_b.seed1 = b1.unwrap_or(params.user_b.seed1);
    params.user_b.seed2 = b2.unwrap_or(params.user_b.seed2);
    if let Some(bits) = random_bits {
        params.user_a.data = DataSource::Random(bits);
        params.user_b.data = DataSource::Random(bits);
    }
    if let Some(text) = text_a {
        params.user_a.data = DataSource::Text(text);
    }
    if let Some(text) = text_b {
        params.user_b.data = DataSource::Text(text);
    }
    if let Some(noise) = noise {
        params.noise_std = noise;
    }

    let sim = CdmaSimulator::new(params).context("Invalid CDMA parameters")?;
    let result = sim.run(rng).context("CDMA simulation failed")?;
    info!(
        errors_a = result.user_a.errors,
        errors_b = result.user_b.errors,
        "CDMA simulation complete"
    );

    let report = result.to_string();
    println!("{}", report);
    save_report(config, no_save, "cdma", CDMA_PREFIX, &report, result.timestamp)
}

#[allow(clippy::too_many_arguments)]
fn cmd_link(
    config: &SimConfig,
    rng: &mut StdRng,
    no_save: bool,
    width: Option<u32>,
    poly1: Option<Vec<u32>>,
    poly2: Option<Vec<u32>>,
    seed1: Option<u64>,
    seed2: Option<u64>,
    text: Option<String>,
    random_bits: Option<usize>,
    error_rate: Option<f64>,
    error_kind: Option<ErrorPattern>,
    no_decode: bool,
) -> Result<()> {
    let mut params: LinkParams = config.link.clone();
    if let Some(width) = width {
        params.width = width;
    }
    if let Some(poly1) = poly1 {
        params.poly1 = poly1;
    }
    if let Some(poly2) = poly2 {
        params.poly2 = poly2;
    }
    params.seed1 = seed1.unwrap_or(params.seed1);
    params.seed2 = seed2.unwrap_or(params.seed2);
    if let Some(text) = text {
        params.data = DataSource::Text(text);
    }
    if let Some(bits) = random_bits {
        params.data = DataSource::Random(bits);
    }
    params.error_rate = error_rate.unwrap_or(params.error_rate);
    params.error_pattern = error_kind.unwrap_or(params.error_pattern);
    if no_decode {
        params.decode = false;
    }

    let sim = LinkSimulator::new(params).context("Invalid link parameters")?;
    let result = sim.run(rng).context("Link simulation failed")?;
    info!(
        errors_introduced = result.errors_introduced,
        "link simulation complete"
    );

    let report = result.to_string();
    println!("{}", report);
    save_report(config, no_save, "link", LINK_PREFIX, &report, result.timestamp)
}

fn cmd_sweep(
    config: &SimConfig,
    noise_levels: Option<Vec<f64>>,
    trials: Option<usize>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut params = config.sweep.clone();
    if let Some(levels) = noise_levels {
        params.noise_levels = levels;
    }
    params.trials = trials.unwrap_or(params.trials);

    let sweep = NoiseSweep::new(&config.cdma, params).context("Invalid sweep parameters")?;
    let curve = sweep.run().context("Noise sweep failed")?;
    let csv = curve.to_csv();

    match output {
        Some(path) => {
            std::fs::write(&path, &csv)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), points = curve.points().len(), "BER curve written");
        }
        None => print!("{}", csv),
    }
    Ok(())
}

fn cmd_config(config: &SimConfig, effective: bool, check: bool) -> Result<()> {
    if check {
        config.validate().context("Invalid configuration")?;
        println!("configuration OK");
    } else if effective {
        print!(
            "{}",
            serde_yaml::to_string(config).context("Failed to render configuration")?
        );
    } else {
        print!("{}", SimConfig::example_yaml());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = load_config(cli.config.as_ref());
    let logging = match &loaded {
        Ok((config, _)) => config.logging.clone(),
        Err(_) => LogConfig::default(),
    };
    init_logging(&logging.with_verbosity(cli.verbose));
    let (config, origin) = loaded?;
    log_origin(&origin);

    match cli.command {
        Commands::Cdma {
            width,
            poly1,
            poly2,
            seed_a1,
            seed_a2,
            seed_b1,
            seed_b2,
            text_a,
            text_b,
            random_bits,
            noise,
        } => cmd_cdma(
            &config,
            &mut make_rng(cli.seed),
            cli.no_save,
            width,
            poly1,
            poly2,
            [seed_a1, seed_a2, seed_b1, seed_b2],
            text_a,
            text_b,
            random_bits,
            noise,
        ),

        Commands::Link {
            width,
            poly1,
            poly2,
            seed1,
            seed2,
            text,
            random_bits,
            error_rate,
            error_kind,
            no_decode,
        } => cmd_link(
            &config,
            &mut make_rng(cli.seed),
            cli.no_save,
            width,
            poly1,
            poly2,
            seed1,
            seed2,
            text,
            random_bits,
            error_rate,
            error_kind,
            no_decode,
        ),

        Commands::Sweep {
            noise_levels,
            trials,
            output,
        } => cmd_sweep(&config, noise_levels, trials, output),

        Commands::Config { effective, check } => cmd_config(&config, effective, check),
    }
}
