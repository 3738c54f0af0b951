use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use netseries_analysis::{
    extract::{DELAY_LOG_FILE_NAME, ExtractorConfig, LogFormat},
    figure::{FigureDocument, FigureStyle},
    sample::RawSample,
    session::Session,
};
use netseries_stats::binning::DEFAULT_MAX_TIME;

use crate::{schema::figure_config::FigureConfig, util};

#[derive(Debug, Clone, Args)]
pub(crate) struct DelayArg {
    /// Directory containing per-session `client_log.txt` files, searched recursively
    pub dir: PathBuf,

    /// Output path for the figure document (JSON); stdout if omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Analysis window length in seconds
    #[arg(long, default_value_t = DEFAULT_MAX_TIME)]
    pub window: f64,

    /// Figure configuration file; only the `style` key is used
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub(crate) fn run(arg: &DelayArg) -> anyhow::Result<()> {
    if !(arg.window.is_finite() && arg.window > 0.0) {
        anyhow::bail!("window must be positive and finite, got {}", arg.window);
    }
    let style = FigureConfig::load(arg.config.as_deref())?
        .style_over(FigureStyle::delay())
        .context("Invalid style in figure config")?;

    let sessions = load_delay_sessions(arg)?;
    let mut doc = FigureDocument::new(style, arg.window);
    for session in &sessions {
        let samples = session
            .normalized(arg.window)
            .with_context(|| format!("Session '{}' is out of order", session.name))?;
        let (times, values): (Vec<f64>, Vec<f64>) =
            samples.iter().map(RawSample::as_pair).unzip();
        doc.push_series(&session.name, session.format, times, values);
    }

    util::Output::save_json(&doc, arg.output.as_deref())?;
    Ok(())
}

fn load_delay_sessions(arg: &DelayArg) -> anyhow::Result<Vec<Session>> {
    let paths = util::discover_files(&arg.dir, |path| {
        path.file_name()
            .is_some_and(|name| name == DELAY_LOG_FILE_NAME)
    })?;
    let mut sessions = util::load_sessions(&paths, &ExtractorConfig::default())?;
    sessions.retain(|session| session.format == LogFormat::DelayLine);
    if sessions.is_empty() {
        anyhow::bail!("No data files found in {}", arg.dir.display());
    }
    sessions.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write_delay_log(dir: &std::path::Path, session: &str, content: &str) {
        let session_dir = dir.join(session);
        fs::create_dir_all(&session_dir).unwrap();
        fs::write(session_dir.join(DELAY_LOG_FILE_NAME), content).unwrap();
    }

    #[test]
    fn test_run_emits_unbinned_series() {
        let dir = tempfile::tempdir().unwrap();
        write_delay_log(
            dir.path(),
            "LIFE",
            "send_time:5000000|delay:120\nsend_time:5500000|delay:80\nsend_time:9000000|delay:60\n",
        );
        write_delay_log(dir.path(), "cubic", "send_time:1000000|delay:300\n");
        fs::write(dir.path().join("other.txt"), "send_time:1|delay:1\n").unwrap();

        let output = dir.path().join("delay.json");
        let arg = DelayArg {
            dir: dir.path().to_owned(),
            output: Some(output.clone()),
            window: 3.0,
            config: None,
        };
        run(&arg).unwrap();

        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        let series = doc["series"].as_array().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0]["name"], "LIFE");
        assert_eq!(series[0]["shaded"], true);
        assert_eq!(series[0]["marker"], "");
        assert_eq!(series[0]["times"], serde_json::json!([0.0, 0.5]));
        assert_eq!(series[0]["values"], serde_json::json!([120.0, 80.0]));
        assert_eq!(series[1]["name"], "cubic");
        assert_eq!(doc["style"]["y_label"], "Delay (μs)");
        assert_eq!(doc["x_limit"], 3.0);
    }

    #[test]
    fn test_missing_logs() {
        let dir = tempfile::tempdir().unwrap();
        let arg = DelayArg {
            dir: dir.path().to_owned(),
            output: None,
            window: DEFAULT_MAX_TIME,
            config: None,
        };
        assert!(run(&arg).is_err());

        let arg = DelayArg {
            window: -1.0,
            ..arg
        };
        assert!(run(&arg).is_err());
    }

    #[test]
    fn test_partial_style_keeps_delay_preset() {
        let dir = tempfile::tempdir().unwrap();
        write_delay_log(dir.path(), "LIFE", "send_time:1000000|delay:10\n");
        let config = dir.path().join("figure.json");
        fs::write(&config, r#"{ "style": { "dpi": 300 } }"#).unwrap();

        let output = dir.path().join("delay.json");
        let arg = DelayArg {
            dir: dir.path().to_owned(),
            output: Some(output.clone()),
            window: DEFAULT_MAX_TIME,
            config: Some(config),
        };
        run(&arg).unwrap();

        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(doc["style"]["dpi"], 300);
        assert_eq!(doc["style"]["y_label"], "Delay (μs)");
        assert_eq!(doc["style"]["size"], serde_json::json!([10.0, 6.0]));
    }
}
