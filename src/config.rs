//! Extension configuration from host layout properties
//!
//! Configuration is read from `layout.props` (defined in extension.json).
//! All default values come from extension.json via `PropertyReader`; the only thing
//! without a default is the field selection itself.

use crate::host::properties::PropertyReader;
use crate::host::{ExtensionError, Layout, Result};

/// Area fill mode for the component lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineFill {
    /// Plain line
    #[default]
    None,
    /// Fill down to y = 0
    ToZeroY,
    /// Fill to the previous trace
    ToNextY,
}

impl LineFill {
    /// Parse from the `line` property value
    ///
    /// Validation against the allowed values happens in PropertyReader::get_enum().
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "tozeroy" => Self::ToZeroY,
            "tonexty" => Self::ToNextY,
            _ => Self::None,
        }
    }

    /// Value understood by the chart backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ToZeroY => "tozeroy",
            Self::ToNextY => "tonexty",
        }
    }
}

/// The time dimension and measure the decomposition runs on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    pub dimension: String,
    pub measure: String,
}

#[derive(Debug, Clone)]
pub struct ExtensionConfig {
    pub fields: FieldSelection,

    /// Observations per season, passed to ts(frequency = ...)
    pub frequency: u32,

    pub line: LineFill,

    /// One palette slot per component (true) or `color_for_main` for all (false)
    pub colors: bool,

    pub color_for_main: usize,

    /// Show markers at `point_radius`; otherwise markers are size 1
    pub datapoints: bool,

    pub point_radius: f64,

    pub border_width: f64,

    /// Stack the four components in separate subplots
    pub decompose_in_four_charts: bool,

    pub show_legend: bool,

    /// X-axis gridlines
    pub x_scale: bool,

    /// Y-axis gridlines
    pub y_scale: bool,
}

impl ExtensionConfig {
    /// Build the configuration from a host layout
    ///
    /// Fails only when the dimension or measure is missing; every other property
    /// falls back to its extension.json default.
    pub fn from_layout(layout: &Layout) -> Result<Self> {
        let props = PropertyReader::new(&layout.props);

        let dimension = first_non_empty(props.get_string_list("dimensions"))
            .ok_or_else(|| ExtensionError::Config("no dimension selected".into()))?;
        let measure = first_non_empty(props.get_string_list("measures"))
            .ok_or_else(|| ExtensionError::Config("no measure selected".into()))?;

        // Bounds are enforced by the reader (frequency 1..=1500, colorForMain 0..=255)
        let frequency = u32::try_from(props.get_i64("frequency"))
            .map_err(|_| ExtensionError::Config("frequency out of range".into()))?;
        let color_for_main = usize::try_from(props.get_i64("colorForMain"))
            .map_err(|_| ExtensionError::Config("colorForMain out of range".into()))?;

        Ok(Self {
            fields: FieldSelection { dimension, measure },
            frequency,
            line: LineFill::parse(&props.get_enum("line")),
            colors: props.get_bool("colors"),
            color_for_main,
            datapoints: props.get_bool("datapoints"),
            point_radius: props.get_f64("pointRadius"),
            border_width: props.get_f64("borderWidth"),
            decompose_in_four_charts: props.get_bool("decomposeInFourCharts"),
            show_legend: props.get_bool("showLegend"),
            x_scale: props.get_bool("xScale"),
            y_scale: props.get_bool("yScale"),
        })
    }

    /// Marker size actually drawn
    pub fn marker_size(&self) -> f64 {
        if self.datapoints {
            self.point_radius
        } else {
            1.0
        }
    }
}

fn first_non_empty(values: Vec<String>) -> Option<String> {
    values
        .into_iter()
        .next()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layout(props: serde_json::Value) -> Layout {
        Layout {
            props,
            ..Default::default()
        }
    }

    #[test]
    fn test_line_fill_parse() {
        assert_eq!(LineFill::parse("tozeroy"), LineFill::ToZeroY);
        assert_eq!(LineFill::parse("ToNextY"), LineFill::ToNextY);
        assert_eq!(LineFill::parse("none"), LineFill::None);
        assert_eq!(LineFill::parse("whatever"), LineFill::None);
        assert_eq!(LineFill::ToZeroY.as_str(), "tozeroy");
    }

    #[test]
    fn test_config_defaults() {
        let config = ExtensionConfig::from_layout(&layout(json!({
            "dimensions": ["Month"],
            "measures": ["Sum(Sales)"]
        })))
        .unwrap();

        assert_eq!(config.fields.dimension, "Month");
        assert_eq!(config.fields.measure, "Sum(Sales)");
        assert_eq!(config.frequency, 12);
        assert_eq!(config.line, LineFill::None);
        assert!(config.colors);
        assert_eq!(config.color_for_main, 0);
        assert!(config.decompose_in_four_charts);
        assert_eq!(config.marker_size(), 1.0);
    }

    #[test]
    fn test_config_user_values() {
        let config = ExtensionConfig::from_layout(&layout(json!({
            "dimensions": ["Week"],
            "measures": ["Avg(Temp)"],
            "frequency": 52,
            "line": "tozeroy",
            "colors": false,
            "colorForMain": 5,
            "datapoints": true,
            "pointRadius": 6,
            "borderWidth": 2,
            "decomposeInFourCharts": false,
            "showLegend": false,
            "xScale": false,
            "yScale": true
        })))
        .unwrap();

        assert_eq!(config.frequency, 52);
        assert_eq!(config.line, LineFill::ToZeroY);
        assert!(!config.colors);
        assert_eq!(config.color_for_main, 5);
        assert_eq!(config.marker_size(), 6.0);
        assert_eq!(config.border_width, 2.0);
        assert!(!config.decompose_in_four_charts);
        assert!(!config.show_legend);
        assert!(!config.x_scale);
        assert!(config.y_scale);
    }

    #[test]
    fn test_config_oversized_frequency_falls_back() {
        let config = ExtensionConfig::from_layout(&layout(json!({
            "dimensions": ["Month"],
            "measures": ["Sum(Sales)"],
            "frequency": 5_000_000_000_i64,
            "colorForMain": 9_000_000_000_i64
        })))
        .unwrap();

        assert_eq!(config.frequency, 12);
        assert_eq!(config.color_for_main, 0);
    }

    #[test]
    fn test_config_missing_fields() {
        let err = ExtensionConfig::from_layout(&layout(json!({ "measures": ["Sum(X)"] })))
            .unwrap_err();
        assert!(matches!(err, ExtensionError::Config(_)));

        let err = ExtensionConfig::from_layout(&layout(json!({
            "dimensions": ["Month"],
            "measures": ["  "]
        })))
        .unwrap_err();
        assert!(matches!(err, ExtensionError::Config(_)));
    }
}
