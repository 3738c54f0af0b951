//! Figure documents handed to the renderer
//!
//! Drawing is done by an external renderer. This module assembles everything
//! it needs into one serializable [`FigureDocument`]: the series, the reference
//! bands, and an explicit [`FigureStyle`]. Style travels with the document, so
//! there is no process-wide plotting state.
//!
//! # Serialization
//!
//! ```json
//! {
//!   "style": { "palette": ["#FF0000", ...], "x_label": "Time (s)", ... },
//!   "x_limit": 120.0,
//!   "series": [
//!     { "name": "LIFE", "label": "LIFE", "color": "#FF0000", "marker": "s",
//!       "shaded": true, "times": [...], "values": [...] }
//!   ],
//!   "reference": [{ "start": 0.0, "end": 15.0, "level": 85.42 }],
//!   "change_markers": [15.0, 30.0]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::{extract::LogFormat, reference::ReferenceSegment, series::AlignedSeries};

/// Line colors, cycled in series order.
pub const DEFAULT_PALETTE: [&str; 7] = [
    "#FF0000", "#FFA500", "#FFD700", "#006400", "#0000FF", "#4B0082", "#800080",
];

/// Session whose area is shaded by default.
pub const DEFAULT_HIGHLIGHT: &str = "LIFE";

/// Point marker drawn on a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Marker {
    #[serde(rename = "o")]
    Circle,
    #[serde(rename = "s")]
    Square,
    #[serde(rename = "")]
    Plain,
}

impl Marker {
    /// Marker used for series extracted from `format`.
    #[must_use]
    pub const fn for_format(format: LogFormat) -> Self {
        match format {
            LogFormat::IntervalReport => Self::Circle,
            LogFormat::TaggedLine => Self::Square,
            LogFormat::DelayLine => Self::Plain,
        }
    }
}

/// Presentation settings consumed by the renderer.
///
/// Every field has a default, so a config file may override only a few.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureStyle {
    pub palette: Vec<String>,
    /// Figure size in inches (width, height)
    pub size: (f64, f64),
    pub dpi: u32,
    pub font_family: String,
    pub font_size: f64,
    pub line_width: f64,
    pub marker_size: f64,
    /// Draw a marker on every n-th point
    pub marker_every: usize,
    pub x_label: String,
    pub y_label: String,
    pub x_major_tick: f64,
    pub x_minor_tick: f64,
    pub y_major_tick: f64,
    pub y_minor_tick: f64,
    pub legend_columns: usize,
    /// Session whose area under the curve is shaded (matched case-insensitively)
    pub highlight: Option<String>,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self::bandwidth()
    }
}

impl FigureStyle {
    /// Style for bandwidth-over-time figures.
    #[must_use]
    pub fn bandwidth() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(ToString::to_string).collect(),
            size: (8.0, 5.0),
            dpi: 600,
            font_family: "Arial".to_owned(),
            font_size: 6.0,
            line_width: 0.8,
            marker_size: 2.0,
            marker_every: 15,
            x_label: "Time (s)".to_owned(),
            y_label: "Bandwidth (Mbps)".to_owned(),
            x_major_tick: 15.0,
            x_minor_tick: 5.0,
            y_major_tick: 20.0,
            y_minor_tick: 5.0,
            legend_columns: 9,
            highlight: Some(DEFAULT_HIGHLIGHT.to_owned()),
        }
    }

    /// Style for delay-over-time figures.
    #[must_use]
    pub fn delay() -> Self {
        Self {
            size: (10.0, 6.0),
            dpi: 100,
            font_size: 10.0,
            y_label: "Delay (μs)".to_owned(),
            y_major_tick: 0.0,
            y_minor_tick: 0.0,
            legend_columns: 1,
            ..Self::bandwidth()
        }
    }

    fn color(&self, index: usize) -> String {
        if self.palette.is_empty() {
            return "#000000".to_owned();
        }
        self.palette[index % self.palette.len()].clone()
    }

    fn is_highlighted(&self, name: &str) -> bool {
        self.highlight
            .as_deref()
            .is_some_and(|highlight| highlight.trim().eq_ignore_ascii_case(name.trim()))
    }
}

/// One drawable line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesEntry {
    pub name: String,
    /// Legend label (`_` shown as spaces)
    pub label: String,
    pub color: String,
    pub marker: Marker,
    /// Whether the renderer should shade the area under this line
    pub shaded: bool,
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

/// Everything the renderer needs for one figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureDocument {
    pub title: Option<String>,
    pub style: FigureStyle,
    /// Right edge of the x axis
    pub x_limit: f64,
    pub series: Vec<SeriesEntry>,
    pub reference: Vec<ReferenceSegment>,
    pub change_markers: Vec<f64>,
}

impl FigureDocument {
    #[must_use]
    pub fn new(style: FigureStyle, x_limit: f64) -> Self {
        Self {
            title: None,
            style,
            x_limit,
            series: vec![],
            reference: vec![],
            change_markers: vec![],
        }
    }

    /// Appends a line, assigning the next palette color.
    ///
    /// Only the first series matching the highlight is shaded.
    pub fn push_series(
        &mut self,
        name: &str,
        format: LogFormat,
        times: Vec<f64>,
        values: Vec<f64>,
    ) {
        let shaded = self.style.is_highlighted(name) && !self.series.iter().any(|s| s.shaded);
        let entry = SeriesEntry {
            name: name.to_owned(),
            label: name.replace('_', " "),
            color: self.style.color(self.series.len()),
            marker: Marker::for_format(format),
            shaded,
            times,
            values,
        };
        self.series.push(entry);
    }

    /// Appends an aligned series on its bucket-center axis.
    pub fn push_aligned(&mut self, series: &AlignedSeries, format: LogFormat) {
        self.push_series(
            &series.name,
            format,
            series.bucket_centers.clone(),
            series.values.clone(),
        );
    }

    /// Sets the reference bands and the change markers drawn between them.
    pub fn set_reference(&mut self, segments: Vec<ReferenceSegment>) {
        self.change_markers = segments.iter().skip(1).map(|s| s.start).collect();
        self.reference = segments;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: f64, level: f64) -> ReferenceSegment {
        ReferenceSegment { start, end, level }
    }

    #[test]
    fn test_colors_cycle_and_highlight_once() {
        let mut doc = FigureDocument::new(FigureStyle::bandwidth(), 120.0);
        for i in 0..8 {
            doc.push_series(&format!("s{i}"), LogFormat::IntervalReport, vec![], vec![]);
        }
        doc.push_series("life", LogFormat::TaggedLine, vec![0.5], vec![1.0]);
        doc.push_series("LIFE", LogFormat::TaggedLine, vec![0.5], vec![1.0]);

        assert_eq!(doc.series[0].color, "#FF0000");
        assert_eq!(doc.series[7].color, "#FF0000");
        assert_eq!(doc.series[8].marker, Marker::Square);
        assert!(doc.series[8].shaded);
        assert!(!doc.series[9].shaded);
    }

    #[test]
    fn test_label_and_reference() {
        let mut doc = FigureDocument::new(FigureStyle::bandwidth(), 10.0);
        doc.push_series("tcp_bbr_v2", LogFormat::IntervalReport, vec![], vec![]);
        assert_eq!(doc.series[0].label, "tcp bbr v2");
        assert_eq!(doc.series[0].marker, Marker::Circle);

        doc.set_reference(vec![
            segment(0.0, 5.0, 1.0),
            segment(5.0, 10.0, 2.0),
        ]);
        assert_eq!(doc.change_markers, vec![5.0]);
    }

    #[test]
    fn test_style_partial_override() {
        let style: FigureStyle =
            serde_json::from_str(r#"{ "dpi": 300, "highlight": null }"#).unwrap();
        assert_eq!(style.dpi, 300);
        assert_eq!(style.highlight, None);
        assert_eq!(style.palette.len(), DEFAULT_PALETTE.len());
    }

    #[test]
    fn test_marker_serialization() {
        let json = serde_json::to_string(&[Marker::Circle, Marker::Square, Marker::Plain]).unwrap();
        assert_eq!(json, r#"["o","s",""]"#);
    }
}
