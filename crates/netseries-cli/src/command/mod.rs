use clap::{ArgAction, Args, Parser, Subcommand};
use netseries_stats::binning::{
    BinningWindow, DEFAULT_BUCKET_WIDTH, DEFAULT_MAX_TIME, EmptyBucketPolicy,
};
use tracing_subscriber::EnvFilter;

use self::{
    bandwidth::BandwidthArg, delay::DelayArg, fairness::FairnessArg,
    fairness_over_time::FairnessOverTimeArg,
};

mod bandwidth;
mod delay;
mod fairness;
mod fairness_over_time;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v: debug, -vv: trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Align bandwidth logs and emit a figure document
    Bandwidth(#[clap(flatten)] BandwidthArg),
    /// Collect delay logs and emit a figure document
    Delay(#[clap(flatten)] DelayArg),
    /// Compute Jain's fairness index for one or more rows of values
    Fairness(#[clap(flatten)] FairnessArg),
    /// Compute per-bucket fairness across aligned bandwidth logs
    FairnessOverTime(#[clap(flatten)] FairnessOverTimeArg),
}

/// Analysis window shared by every session in one invocation.
#[derive(Debug, Clone, Args)]
pub(crate) struct WindowArg {
    /// Analysis window length in seconds
    #[arg(long, default_value_t = DEFAULT_MAX_TIME)]
    pub window: f64,

    /// Bucket width in seconds
    #[arg(long, default_value_t = DEFAULT_BUCKET_WIDTH)]
    pub bucket_width: f64,

    /// Value of buckets without samples (zero or nan)
    #[arg(long, default_value_t = EmptyBucketPolicy::Zero)]
    pub empty_buckets: EmptyBucketPolicy,
}

impl WindowArg {
    pub fn binning_window(&self) -> anyhow::Result<BinningWindow> {
        Ok(BinningWindow::new(self.window, self.bucket_width)?)
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);
    match args.mode {
        Mode::Bandwidth(arg) => bandwidth::run(&arg)?,
        Mode::Delay(arg) => delay::run(&arg)?,
        Mode::Fairness(arg) => fairness::run(&arg)?,
        Mode::FairnessOverTime(arg) => fairness_over_time::run(&arg)?,
    }
    Ok(())
}
