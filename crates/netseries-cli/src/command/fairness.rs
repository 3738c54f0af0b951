use std::{io::Write, path::PathBuf};

use anyhow::Context;
use clap::Args;
use netseries_stats::fairness;
use serde::Serialize;

use crate::util;

#[derive(Debug, Clone, Args)]
pub(crate) struct FairnessArg {
    /// Values of a single row (one per session)
    #[arg(
        required_unless_present = "rows",
        conflicts_with = "rows",
        allow_negative_numbers = true
    )]
    pub values: Vec<f64>,

    /// JSON file with one row per line of the report: `[[x1, x2, ...], ...]`
    #[arg(long)]
    pub rows: Option<PathBuf>,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Output path; stdout if omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report rows without a defined index instead of failing
    #[arg(long)]
    pub skip_degenerate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct FairnessRow {
    row: usize,
    values: Vec<f64>,
    index: Option<f64>,
    error: Option<String>,
}

pub(crate) fn run(arg: &FairnessArg) -> anyhow::Result<()> {
    let rows: Vec<Vec<f64>> = match &arg.rows {
        Some(path) => util::read_json_file("fairness rows", path)?,
        None => vec![arg.values.clone()],
    };
    let report = score_rows(rows, arg.skip_degenerate)?;

    if arg.json {
        util::Output::save_json(&report, arg.output.as_deref())?;
        return Ok(());
    }
    util::Output::from_output_path(arg.output.as_deref())?
        .write_with(|output| write_table(output, &report))
}

fn score_rows(rows: Vec<Vec<f64>>, skip_degenerate: bool) -> anyhow::Result<Vec<FairnessRow>> {
    let results = fairness::jain_rows(&rows);
    rows.into_iter()
        .zip(results)
        .enumerate()
        .map(|(row, (values, result))| match result {
            Ok(index) => Ok(FairnessRow {
                row,
                values,
                index: Some(index),
                error: None,
            }),
            Err(err) if skip_degenerate => {
                tracing::warn!(row, %err, "no fairness index");
                Ok(FairnessRow {
                    row,
                    values,
                    index: None,
                    error: Some(err.to_string()),
                })
            }
            Err(err) => Err(err).with_context(|| format!("Row {row} has no fairness index")),
        })
        .collect()
}

fn write_table<W>(writer: &mut W, report: &[FairnessRow]) -> std::io::Result<()>
where
    W: Write,
{
    writeln!(writer, "  {:>5} {:>6} {:>10}  Values", "Row", "N", "Jain")?;
    writeln!(writer, "  {}", "-".repeat(32))?;
    for row in report {
        let index = row
            .index
            .map_or_else(|| "N/A".to_owned(), |index| format!("{index:.6}"));
        let values = row
            .values
            .iter()
            .map(|v| format!("{v:.2}"))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            writer,
            "  {:>5} {:>6} {:>10}  [{}]",
            row.row,
            row.values.len(),
            index,
            values
        )?;
    }
    Ok(())
}
