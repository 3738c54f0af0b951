use std::path::Path;

use netseries_analysis::{figure::FigureStyle, reference::ReferenceSchedule};
use serde::Deserialize;

use crate::util;

/// Optional figure configuration file.
///
/// ```json
/// {
///   "changes": [[0, 85.42], [15, 72.8]],
///   "style": { "dpi": 300, "highlight": "BBR" }
/// }
/// ```
///
/// Missing keys fall back to the built-in schedule and to the command's style
/// preset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    /// Reference `(time, level)` changes
    pub changes: Option<Vec<(f64, f64)>>,
    /// Style fields to override; kept raw so they can be laid over any preset
    pub style: Option<serde_json::Map<String, serde_json::Value>>,
}

impl FigureConfig {
    /// Reads the config at `path`, or the empty config when there is none.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let config: Self = util::read_json_file("figure config", path)?;
        Ok(config)
    }

    pub fn schedule(&self) -> ReferenceSchedule {
        self.changes
            .clone()
            .map_or_else(ReferenceSchedule::default, |changes| ReferenceSchedule {
                changes,
            })
    }

    /// `preset` with the configured style fields replaced.
    pub fn style_over(&self, preset: FigureStyle) -> serde_json::Result<FigureStyle> {
        let Some(overrides) = &self.style else {
            return Ok(preset);
        };
        let mut style = serde_json::to_value(preset)?;
        if let Some(fields) = style.as_object_mut() {
            fields.extend(overrides.clone());
        }
        serde_json::from_value(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FigureConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.schedule(), ReferenceSchedule::default());
        assert_eq!(
            config.style_over(FigureStyle::delay()).unwrap(),
            FigureStyle::delay()
        );
    }

    #[test]
    fn test_overrides() {
        let config: FigureConfig =
            serde_json::from_str(r#"{ "changes": [[0, 5]], "style": { "dpi": 72 } }"#).unwrap();
        assert_eq!(config.schedule().changes, vec![(0.0, 5.0)]);
        assert_eq!(config.style_over(FigureStyle::bandwidth()).unwrap().dpi, 72);
    }

    #[test]
    fn test_partial_style_keeps_preset_fields() {
        let config: FigureConfig =
            serde_json::from_str(r#"{ "style": { "dpi": 300, "highlight": null } }"#).unwrap();
        let style = config.style_over(FigureStyle::delay()).unwrap();
        let preset = FigureStyle::delay();
        assert_eq!(style.dpi, 300);
        assert_eq!(style.highlight, None);
        assert_eq!(style.y_label, preset.y_label);
        assert_eq!(style.size, preset.size);
        assert_eq!(style.y_major_tick, preset.y_major_tick);
    }

    #[test]
    fn test_invalid_style() {
        assert!(serde_json::from_str::<FigureConfig>(r#"{ "style": [1, 2] }"#).is_err());

        let config: FigureConfig =
            serde_json::from_str(r#"{ "style": { "dpi": "high" } }"#).unwrap();
        assert!(config.style_over(FigureStyle::bandwidth()).is_err());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.json");
        std::fs::write(&path, r#"{ "style": { "font_size": 9 } }"#).unwrap();
        let config = FigureConfig::load(Some(&path)).unwrap();
        assert_eq!(config.style_over(FigureStyle::delay()).unwrap().font_size, 9.0);

        assert!(FigureConfig::load(None).unwrap().style.is_none());
        assert!(FigureConfig::load(Some(&dir.path().join("missing.json"))).is_err());
    }
}
