//! ebb-cli — Curve inspector for Ebb auction engines.
//!
//! Prints the price schedule a parameter set produces, quotes the settlement
//! needed for a lot at a point in an epoch, and predicts the address the
//! factory would give an engine. Nothing here touches a live engine.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::debug;

use ebb_auction::factory::{default_implementation, derive_engine_address};
use ebb_auction::FactoryDefaults;
use ebb_core::constants::WAD;
use ebb_core::traits::PriceCurve;
use ebb_core::types::{Address, Amount, DecayParams};
use ebb_pricing::{amount_needed, compute_scaler, ExponentialDecay};

/// Ebb auction curve inspector.
#[derive(Parser)]
#[command(name = "ebb-cli")]
#[command(version, about = "Inspect decaying-price auction curves.")]
struct Cli {
    /// Log level used when RUST_LOG is unset.
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Log output format (text or json).
    #[arg(long, default_value = "text", global = true)]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the price schedule over one epoch.
    Curve(CurveArgs),
    /// Quote the settlement needed for a lot.
    Quote(QuoteArgs),
    /// Predict the address of a factory-created engine.
    Address(AddressArgs),
}

/// Pricing parameters, layered over an optional defaults file.
#[derive(Args)]
struct PricingArgs {
    /// JSON file with factory defaults; flags below override it.
    #[arg(long)]
    defaults: Option<PathBuf>,

    /// Starting price in whole settlement units per whole unit sold.
    #[arg(long)]
    starting_price: Option<u128>,

    /// Per-step decay in basis points (1..=9999).
    #[arg(long)]
    decay_bps: Option<u64>,

    /// Seconds per step.
    #[arg(long)]
    step_duration: Option<u64>,

    /// WAD-scaled price floor.
    #[arg(long)]
    minimum_price: Option<u128>,

    /// Epoch length in seconds.
    #[arg(long)]
    auction_length: Option<u64>,
}

#[derive(Args)]
struct CurveArgs {
    #[command(flatten)]
    pricing: PricingArgs,

    /// Print one row every N steps.
    #[arg(long, default_value = "60")]
    every: u64,

    /// Emit JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct QuoteArgs {
    #[command(flatten)]
    pricing: PricingArgs,

    /// Lot size in the sold asset's smallest units.
    #[arg(short, long)]
    amount: Amount,

    /// Seconds since the kick.
    #[arg(short, long, default_value = "0")]
    elapsed: u64,

    /// Decimals of the asset being sold.
    #[arg(long, default_value = "18")]
    from_decimals: u8,

    /// Decimals of the settlement asset.
    #[arg(long, default_value = "18")]
    want_decimals: u8,

    /// Emit JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AddressArgs {
    /// Settlement asset.
    #[arg(long)]
    want: Address,

    /// Proceeds receiver.
    #[arg(long)]
    receiver: Address,

    /// Initial governance.
    #[arg(long)]
    governance: Address,

    /// Account asking the factory for the engine.
    #[arg(long)]
    caller: Address,

    /// Implementation id (default: this build's engine).
    #[arg(long)]
    implementation: Option<Address>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    match cli.command {
        Commands::Curve(args) => curve(args),
        Commands::Quote(args) => quote(args),
        Commands::Address(args) => address(args),
    }
}

/// Initialize tracing with the given level and output format.
fn init_logging(level: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

impl PricingArgs {
    /// Defaults file (or built-ins) with any flags applied, validated.
    fn resolve(&self) -> Result<FactoryDefaults> {
        let mut defaults = match &self.defaults {
            Some(path) => load_defaults(path)?,
            None => FactoryDefaults::default(),
        };
        if let Some(v) = self.starting_price {
            defaults.starting_price = v;
        }
        if let Some(v) = self.decay_bps {
            defaults.step_decay_rate_bps = v;
        }
        if let Some(v) = self.step_duration {
            defaults.step_duration = v;
        }
        if let Some(v) = self.minimum_price {
            defaults.minimum_price = v;
        }
        if let Some(v) = self.auction_length {
            defaults.auction_length = v;
        }
        defaults.validate().context("invalid pricing parameters")?;
        debug!(?defaults, "pricing resolved");
        Ok(defaults)
    }
}

fn load_defaults(path: &Path) -> Result<FactoryDefaults> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read defaults: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse defaults: {}", path.display()))
}

fn decay_params(defaults: &FactoryDefaults) -> DecayParams {
    DecayParams {
        starting_price: defaults.starting_price,
        step_decay_rate_bps: defaults.step_decay_rate_bps,
        step_duration: defaults.step_duration,
        minimum_price: defaults.minimum_price,
    }
}

/// Print the price at every `every`-th step and at the end of the epoch.
fn curve(args: CurveArgs) -> Result<()> {
    let defaults = args.pricing.resolve()?;
    let params = decay_params(&defaults);
    let curve = ExponentialDecay::new();
    let stride = args
        .every
        .max(1)
        .checked_mul(defaults.step_duration)
        .context("row stride overflows")?;

    let mut rows = Vec::new();
    let mut elapsed = 0u64;
    loop {
        let price = curve.unit_price(&params, elapsed)?;
        rows.push((elapsed, curve.steps(&params, elapsed), price));
        if elapsed >= defaults.auction_length {
            break;
        }
        elapsed = elapsed.saturating_add(stride).min(defaults.auction_length);
    }

    if args.json {
        let out: Vec<_> = rows
            .iter()
            .map(|(elapsed, step, price)| {
                json!({ "elapsed": elapsed, "step": step, "price_wad": price.to_string() })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{:>10}  {:>6}  price", "elapsed", "step");
    for (elapsed, step, price) in rows {
        println!("{elapsed:>10}  {step:>6}  {}", format_wad(price));
    }
    Ok(())
}

/// Print the settlement needed for `amount` at `elapsed` seconds into an epoch.
fn quote(args: QuoteArgs) -> Result<()> {
    let defaults = args.pricing.resolve()?;
    if args.elapsed > defaults.auction_length {
        bail!(
            "Epoch has expired: {}s elapsed, auction length is {}s",
            args.elapsed,
            defaults.auction_length
        );
    }

    let scaler = compute_scaler(args.from_decimals, args.want_decimals)?;
    let price = ExponentialDecay::new().unit_price(&decay_params(&defaults), args.elapsed)?;
    let needed = amount_needed(args.amount, price, scaler)?;

    if args.json {
        let out = json!({
            "amount": args.amount.to_string(),
            "elapsed": args.elapsed,
            "price_wad": price.to_string(),
            "scaler": scaler.to_string(),
            "amount_needed": needed.to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Price:          {}", format_wad(price));
    println!("Scaler:         {scaler}");
    println!("Amount needed:  {needed}");
    Ok(())
}

fn address(args: AddressArgs) -> Result<()> {
    let implementation = args.implementation.unwrap_or_else(default_implementation);
    let engine = derive_engine_address(
        implementation,
        args.want,
        args.receiver,
        args.governance,
        args.caller,
    );
    println!("{engine}");
    Ok(())
}

/// Render a WAD-scaled value as a decimal string.
fn format_wad(value: u128) -> String {
    let whole = value / WAD;
    let frac = value % WAD;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{frac:018}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
