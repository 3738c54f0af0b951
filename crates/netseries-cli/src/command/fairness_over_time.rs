use std::{io::Write, path::PathBuf};

use clap::Args;
use netseries_analysis::series::SeriesCollection;
use netseries_stats::{binning::BinningWindow, descriptive::DescriptiveStats, fairness};
use serde::Serialize;

use crate::{
    command::{WindowArg, bandwidth},
    util,
};

#[derive(Debug, Clone, Args)]
pub(crate) struct FairnessOverTimeArg {
    /// Directory containing bandwidth logs (*.json, *.txt), searched recursively
    pub dir: PathBuf,

    #[clap(flatten)]
    pub window: WindowArg,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Output path; stdout if omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct FairnessOverTimeReport {
    window: BinningWindow,
    sessions: Vec<String>,
    /// Jain index per bucket; `None` where it is undefined
    buckets: Vec<BucketFairness>,
    /// Summary of the defined per-bucket indices
    summary: Option<DescriptiveStats>,
    /// Jain index of the per-session window means
    overall: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct BucketFairness {
    center: f64,
    index: Option<f64>,
}

impl FairnessOverTimeReport {
    fn new(collection: &SeriesCollection) -> Self {
        let window = *collection.window();
        let buckets = window
            .bucket_centers()
            .into_iter()
            .zip(collection.fairness_over_time())
            .map(|(center, index)| BucketFairness { center, index })
            .collect::<Vec<_>>();
        let summary = DescriptiveStats::new(buckets.iter().filter_map(|bucket| bucket.index));
        let overall = (collection.len() >= 2)
            .then(|| fairness::jain_index(&collection.window_means()).ok())
            .flatten();
        Self {
            window,
            sessions: collection.iter().map(|series| series.name.clone()).collect(),
            buckets,
            summary,
            overall,
        }
    }

    fn write_table<W>(&self, writer: &mut W) -> std::io::Result<()>
    where
        W: Write,
    {
        writeln!(writer, "Sessions: {}", self.sessions.join(", "))?;
        writeln!(writer)?;
        writeln!(writer, "  {:>10} {:>10}", "Time (s)", "Jain")?;
        writeln!(writer, "  {}", "-".repeat(21))?;
        for bucket in &self.buckets {
            let index = bucket
                .index
                .map_or_else(|| "N/A".to_owned(), |index| format!("{index:.4}"));
            writeln!(writer, "  {:>10.2} {:>10}", bucket.center, index)?;
        }
        writeln!(writer)?;
        if let Some(summary) = &self.summary {
            writeln!(
                writer,
                "Defined buckets: {} mean={:.4} median={:.4} min={:.4}",
                summary.count, summary.mean, summary.median, summary.min
            )?;
        }
        match self.overall {
            Some(overall) => writeln!(writer, "Overall (window means): {overall:.4}")?,
            None => writeln!(writer, "Overall (window means): N/A")?,
        }
        Ok(())
    }
}

pub(crate) fn run(arg: &FairnessOverTimeArg) -> anyhow::Result<()> {
    let (_sessions, collection) = bandwidth::align_bandwidth_logs(&arg.dir, &arg.window)?;
    if collection.len() < 2 {
        tracing::warn!(
            series = collection.len(),
            "fairness needs at least two sessions"
        );
    }
    let report = FairnessOverTimeReport::new(&collection);

    if arg.json {
        util::Output::save_json(&report, arg.output.as_deref())?;
        return Ok(());
    }
    util::Output::from_output_path(arg.output.as_deref())?
        .write_with(|output| report.write_table(output))
}
