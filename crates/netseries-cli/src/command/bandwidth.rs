use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use netseries_analysis::{
    extract::{ExtractorConfig, LogFormat},
    figure::{FigureDocument, FigureStyle},
    reference::ReferenceSchedule,
    series::SeriesCollection,
    session::Session,
};

use crate::{command::WindowArg, schema::figure_config::FigureConfig, util};

#[derive(Debug, Clone, Args)]
pub(crate) struct BandwidthArg {
    /// Directory containing bandwidth logs (*.json, *.txt), searched recursively
    pub dir: PathBuf,

    /// Output path for the figure document (JSON); stdout if omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[clap(flatten)]
    pub window: WindowArg,

    /// Figure configuration file with style overrides and reference changes
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Reference schedule file (`{ "changes": [[t, level], ...] }`)
    #[arg(long, conflicts_with = "no_reference")]
    pub reference: Option<PathBuf>,

    /// Do not draw reference bands
    #[arg(long)]
    pub no_reference: bool,

    /// Figure title
    #[arg(long)]
    pub title: Option<String>,
}

pub(crate) fn run(arg: &BandwidthArg) -> anyhow::Result<()> {
    let config = FigureConfig::load(arg.config.as_deref())?;
    let style = config
        .style_over(FigureStyle::bandwidth())
        .context("Invalid style in figure config")?;
    let schedule = match (&arg.reference, arg.no_reference) {
        (_, true) => None,
        (Some(path), false) => {
            let schedule: ReferenceSchedule = util::read_json_file("reference schedule", path)?;
            Some(schedule)
        }
        (None, false) => Some(config.schedule()),
    };

    let (sessions, collection) = align_bandwidth_logs(&arg.dir, &arg.window)?;
    let mut doc = build_document(&sessions, &collection, style, schedule.as_ref())?;
    doc.title.clone_from(&arg.title);

    util::Output::save_json(&doc, arg.output.as_deref())?;
    Ok(())
}

/// Loads every bandwidth log under `dir` and aligns them onto one window.
///
/// Delay logs are skipped. Fails when no log yields samples.
pub(crate) fn align_bandwidth_logs(
    dir: &Path,
    window_arg: &WindowArg,
) -> anyhow::Result<(Vec<Session>, SeriesCollection)> {
    let window = window_arg.binning_window()?;
    let config = ExtractorConfig {
        max_time: window.max_time(),
    };

    let paths = util::discover_files(dir, |path| util::has_extension(path, &["json", "txt"]))?;
    let sessions = util::load_sessions(&paths, &config)?
        .into_iter()
        .filter(|session| {
            let keep = session.format != LogFormat::DelayLine;
            if !keep {
                tracing::debug!(session = %session.name, "delay log; skipped");
            }
            keep
        })
        .collect::<Vec<_>>();
    if sessions.is_empty() {
        anyhow::bail!("No data files found in {}", dir.display());
    }

    let collection = SeriesCollection::from_sessions(&sessions, window, window_arg.empty_buckets)
        .with_context(|| format!("Failed to align sessions in {}", dir.display()))?;
    tracing::info!(
        series = collection.len(),
        buckets = window.bucket_count(),
        "sessions aligned",
    );
    Ok((sessions, collection))
}

fn build_document(
    sessions: &[Session],
    collection: &SeriesCollection,
    style: FigureStyle,
    schedule: Option<&ReferenceSchedule>,
) -> anyhow::Result<FigureDocument> {
    let window = collection.window();
    let mut doc = FigureDocument::new(style, window.max_time());
    for series in collection.iter() {
        // The collection keeps the first session of each name.
        let format = sessions
            .iter()
            .find(|session| session.name == series.name)
            .map_or(LogFormat::IntervalReport, |session| session.format);
        doc.push_aligned(series, format);
    }
    if let Some(schedule) = schedule {
        let segments = schedule
            .segments(window.max_time())
            .context("Invalid reference schedule")?;
        doc.set_reference(segments);
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use netseries_analysis::figure::Marker;
    use netseries_stats::binning::{DEFAULT_BUCKET_WIDTH, EmptyBucketPolicy};

    use super::*;

    fn window_arg(window: f64) -> WindowArg {
        WindowArg {
            window,
            bucket_width: DEFAULT_BUCKET_WIDTH,
            empty_buckets: EmptyBucketPolicy::Zero,
        }
    }

    fn bandwidth_arg(dir: &Path, output: &Path) -> BandwidthArg {
        BandwidthArg {
            dir: dir.to_owned(),
            output: Some(output.to_owned()),
            window: window_arg(120.0),
            config: None,
            reference: None,
            no_reference: false,
            title: None,
        }
    }

    fn write_interval_log(path: &Path, mbps: f64) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            path,
            format!(
                r#"{{ "intervals": [{{ "sum": {{ "start": 0, "bits_per_second": {} }} }}] }}"#,
                mbps * 1e6
            ),
        )
        .unwrap();
    }

    fn write_logs(dir: &Path) {
        fs::write(
            dir.join("cubic.json"),
            r#"{ "intervals": [
                { "sum": { "start": 0.0, "bits_per_second": 85000000.0 } },
                { "sum": { "start": 60.0, "bits_per_second": 92000000.0 } }
            ] }"#,
        )
        .unwrap();
        fs::write(
            dir.join("LIFE.txt"),
            "[qperf]|log_cnt:0|qperf_speed:85000Kbit/s\n\
             [qperf]|log_cnt:1|qperf_speed:92000Kbit/s\n",
        )
        .unwrap();
        let delay_dir = dir.join("bbr");
        fs::create_dir_all(&delay_dir).unwrap();
        fs::write(delay_dir.join("client_log.txt"), "send_time:1000000|delay:10\n").unwrap();
    }

    fn read_document(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_align_skips_delay_logs() {
        let dir = tempfile::tempdir().unwrap();
        write_logs(dir.path());

        let (sessions, collection) =
            align_bandwidth_logs(dir.path(), &window_arg(120.0)).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(collection.len(), 2);
        assert!(collection.get("bbr").is_none());

        let cubic = collection.get("cubic").unwrap();
        assert_eq!(cubic.values[0], 85.0);
        assert_eq!(cubic.values[60], 92.0);

        let life = collection.get("LIFE").unwrap();
        assert_eq!(life.values[0], 85.0);
        assert_eq!(life.values[1], 92.0);
    }

    #[test]
    fn test_same_stem_in_sibling_directories() {
        let dir = tempfile::tempdir().unwrap();
        write_interval_log(&dir.path().join("run1").join("cubic.json"), 10.0);
        write_interval_log(&dir.path().join("run2").join("cubic.json"), 30.0);
        fs::write(
            dir.path().join("LIFE.txt"),
            "[qperf]|log_cnt:0|qperf_speed:20000Kbit/s\n",
        )
        .unwrap();

        let (sessions, collection) =
            align_bandwidth_logs(dir.path(), &window_arg(120.0)).unwrap();
        assert_eq!(sessions.len(), 3);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get("LIFE").unwrap().values[0], 20.0);
        // Discovery is path-ordered, so run1 wins.
        assert_eq!(collection.get("cubic").unwrap().values[0], 10.0);
    }

    #[test]
    fn test_document_markers_and_reference() {
        let dir = tempfile::tempdir().unwrap();
        write_logs(dir.path());
        let (sessions, collection) =
            align_bandwidth_logs(dir.path(), &window_arg(120.0)).unwrap();

        let schedule = ReferenceSchedule::default();
        let doc = build_document(
            &sessions,
            &collection,
            FigureStyle::bandwidth(),
            Some(&schedule),
        )
        .unwrap();
        // Name order: uppercase sorts first.
        assert_eq!(doc.series[0].name, "LIFE");
        assert!(doc.series[0].shaded);
        assert_eq!(doc.series[0].marker, Marker::Square);
        assert_eq!(doc.series[1].marker, Marker::Circle);
        assert_eq!(doc.reference.len(), 8);
        assert_eq!(doc.change_markers.len(), 7);

        let doc = build_document(&sessions, &collection, FigureStyle::bandwidth(), None).unwrap();
        assert!(doc.reference.is_empty());
        assert!(doc.change_markers.is_empty());
    }

    #[test]
    fn test_no_data_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "nothing here\n").unwrap();
        let err = align_bandwidth_logs(dir.path(), &window_arg(120.0)).unwrap_err();
        assert!(err.to_string().starts_with("No data files found"));
    }

    #[test]
    fn test_run_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        write_logs(dir.path());
        let output = dir.path().join("out").join("figure.json");
        let arg = BandwidthArg {
            window: window_arg(60.0),
            title: Some("Bandwidth".to_owned()),
            ..bandwidth_arg(dir.path(), &output)
        };
        run(&arg).unwrap();

        let doc = read_document(&output);
        assert_eq!(doc["title"], "Bandwidth");
        assert_eq!(doc["x_limit"], 60.0);
        assert_eq!(doc["series"].as_array().unwrap().len(), 2);
        // Changes at or after the window end are dropped.
        assert_eq!(doc["reference"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_run_with_config_file() {
        let logs = tempfile::tempdir().unwrap();
        write_logs(logs.path());
        let work = tempfile::tempdir().unwrap();
        let config = work.path().join("figure.json");
        fs::write(
            &config,
            r#"{ "changes": [[0, 50], [60, 70]], "style": { "dpi": 300, "highlight": "cubic" } }"#,
        )
        .unwrap();
        let output = work.path().join("figure_out.json");
        let arg = BandwidthArg {
            config: Some(config),
            ..bandwidth_arg(logs.path(), &output)
        };
        run(&arg).unwrap();

        let doc = read_document(&output);
        assert_eq!(doc["style"]["dpi"], 300);
        assert_eq!(doc["style"]["y_label"], "Bandwidth (Mbps)");
        assert_eq!(doc["series"][0]["shaded"], false);
        assert_eq!(doc["series"][1]["shaded"], true);
        assert_eq!(
            doc["reference"],
            serde_json::json!([
                { "start": 0.0, "end": 60.0, "level": 50.0 },
                { "start": 60.0, "end": 120.0, "level": 70.0 },
            ])
        );
        assert_eq!(doc["change_markers"], serde_json::json!([60.0]));
    }

    #[test]
    fn test_run_with_reference_file() {
        let logs = tempfile::tempdir().unwrap();
        write_logs(logs.path());
        let work = tempfile::tempdir().unwrap();
        let config = work.path().join("figure.json");
        fs::write(&config, r#"{ "changes": [[0, 50]] }"#).unwrap();
        let reference = work.path().join("reference.json");
        fs::write(&reference, r#"{ "changes": [[0, 10], [30, 20], [90, 30]] }"#).unwrap();
        let output = work.path().join("figure_out.json");

        let arg = BandwidthArg {
            config: Some(config),
            reference: Some(reference),
            ..bandwidth_arg(logs.path(), &output)
        };
        run(&arg).unwrap();
        let doc = read_document(&output);
        assert_eq!(doc["reference"].as_array().unwrap().len(), 3);
        assert_eq!(doc["reference"][0]["level"], 10.0);

        let arg = BandwidthArg {
            no_reference: true,
            reference: None,
            ..arg
        };
        run(&arg).unwrap();
        let doc = read_document(&output);
        assert!(doc["reference"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_run_rejects_bad_config() {
        let logs = tempfile::tempdir().unwrap();
        write_logs(logs.path());
        let work = tempfile::tempdir().unwrap();
        let output = work.path().join("figure_out.json");

        let config = work.path().join("figure.json");
        fs::write(&config, r#"{ "style": { "dpi": "high" } }"#).unwrap();
        let arg = BandwidthArg {
            config: Some(config),
            ..bandwidth_arg(logs.path(), &output)
        };
        assert!(run(&arg).is_err());

        let arg = BandwidthArg {
            config: None,
            reference: Some(work.path().join("missing.json")),
            ..arg
        };
        assert!(run(&arg).is_err());
    }
}
