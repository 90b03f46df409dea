//! Pivot of the result page into the four component series
//!
//! Rows come in as `[dimension, base, trend, seasonal, random, blank]`. Each component
//! becomes one dataset holding the dimension text (x), the measure value (y) and the
//! dimension element number, all in page row order.

use crate::config::ExtensionConfig;
use crate::host::palettes::{default_color, rgba};
use crate::host::{DataPage, ExtensionError, Result};
use serde::Serialize;

/// Cells a row must carry: the dimension plus the four drawn measures
const REQUIRED_CELLS: usize = 5;

/// Fill alpha relative to the line color
const FILL_ALPHA: f64 = 0.3;

/// Drawn components, in measure column order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Observed,
    Trend,
    Seasonal,
    Random,
}

impl SeriesKind {
    pub const ALL: [SeriesKind; 4] = [
        SeriesKind::Observed,
        SeriesKind::Trend,
        SeriesKind::Seasonal,
        SeriesKind::Random,
    ];

    /// Column of the row this component is read from
    pub fn column(&self) -> usize {
        self.position() + 1
    }

    /// 0-based position among the drawn components
    pub fn position(&self) -> usize {
        match self {
            SeriesKind::Observed => 0,
            SeriesKind::Trend => 1,
            SeriesKind::Seasonal => 2,
            SeriesKind::Random => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SeriesKind::Observed => "Observed",
            SeriesKind::Trend => "Trend",
            SeriesKind::Seasonal => "Seasonal",
            SeriesKind::Random => "Random",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: String,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub width: f64,
}

/// One chart trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    /// Category labels (dimension text)
    pub x: Vec<String>,
    /// Measure values; NaN where the script engine returned no value
    pub y: Vec<f64>,
    /// Dimension element numbers, for selection
    #[serde(rename = "elemNum")]
    pub elem_num: Vec<i64>,
    pub name: String,
    pub mode: String,
    pub fill: String,
    pub fillcolor: String,
    pub marker: Marker,
    pub line: Line,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Raw pivoted values for one component
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub kind: SeriesKind,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    pub elem_numbers: Vec<i64>,
}

/// Pivot the page into the four component series, preserving row order
pub fn pivot_series(page: &DataPage) -> Result<Vec<Series>> {
    if let Some((row, cells)) = page
        .matrix
        .iter()
        .enumerate()
        .find(|(_, cells)| cells.len() < REQUIRED_CELLS)
    {
        return Err(ExtensionError::MalformedPage {
            row,
            expected: REQUIRED_CELLS,
            found: cells.len(),
        });
    }

    let series = SeriesKind::ALL
        .iter()
        .map(|kind| {
            let column = kind.column();
            let mut categories = Vec::with_capacity(page.matrix.len());
            let mut values = Vec::with_capacity(page.matrix.len());
            let mut elem_numbers = Vec::with_capacity(page.matrix.len());

            for row in &page.matrix {
                categories.push(row[0].text.clone());
                elem_numbers.push(row[0].elem_number);
                values.push(row[column].num);
            }

            Series {
                kind: *kind,
                categories,
                values,
                elem_numbers,
            }
        })
        .collect();

    Ok(series)
}

/// Palette slot for a component
pub fn color_slot(kind: SeriesKind, config: &ExtensionConfig) -> usize {
    if config.colors {
        kind.position()
    } else {
        config.color_for_main
    }
}

/// Y axis a component is drawn against in split mode; Random keeps the primary axis
pub fn split_y_axis(kind: SeriesKind) -> Option<String> {
    match kind {
        SeriesKind::Random => None,
        other => Some(format!("y{}", 4 - other.position())),
    }
}

/// Turn a pivoted series into a styled dataset
pub fn style_dataset(series: Series, config: &ExtensionConfig) -> Dataset {
    let color = default_color(color_slot(series.kind, config));

    let (xaxis, yaxis) = if config.decompose_in_four_charts {
        match split_y_axis(series.kind) {
            Some(y) => (Some("x".to_string()), Some(y)),
            None => (None, None),
        }
    } else {
        (None, None)
    };

    Dataset {
        x: series.categories,
        y: series.values,
        elem_num: series.elem_numbers,
        name: series.kind.label().to_string(),
        mode: "lines+markers".to_string(),
        fill: config.line.as_str().to_string(),
        fillcolor: rgba(color, FILL_ALPHA),
        marker: Marker {
            color: rgba(color, 1.0),
            size: config.marker_size(),
        },
        line: Line {
            width: config.border_width,
        },
        xaxis,
        yaxis,
    }
}

/// Pivot and style in one go
pub fn build_datasets(page: &DataPage, config: &ExtensionConfig) -> Result<Vec<Dataset>> {
    Ok(pivot_series(page)?
        .into_iter()
        .map(|s| style_dataset(s, config))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LineFill;
    use crate::host::{Cell, Layout};
    use serde_json::json;

    fn row(dim: &str, elem: i64, values: [f64; 5]) -> Vec<Cell> {
        let mut cells = vec![Cell::new(dim, f64::NAN, elem)];
        cells.extend(values.iter().map(|v| Cell::new(v.to_string(), *v, 0)));
        cells
    }

    fn config(props: serde_json::Value) -> ExtensionConfig {
        let mut props = props;
        props["dimensions"] = json!(["Month"]);
        props["measures"] = json!(["Sum(Sales)"]);
        ExtensionConfig::from_layout(&Layout {
            props,
            ..Default::default()
        })
        .unwrap()
    }

    fn sample_page() -> DataPage {
        DataPage {
            matrix: vec![
                row("Jan", 0, [10.0, 8.0, 1.0, 1.0, 0.0]),
                row("Feb", 1, [12.0, 9.0, 2.0, 1.0, 0.0]),
                row("Mar", 2, [11.0, f64::NAN, -1.0, 3.0, 0.0]),
            ],
        }
    }

    #[test]
    fn test_series_kind_columns() {
        let columns: Vec<usize> = SeriesKind::ALL.iter().map(|k| k.column()).collect();
        assert_eq!(columns, vec![1, 2, 3, 4]);
        assert_eq!(SeriesKind::Random.label(), "Random");
    }

    #[test]
    fn test_pivot_length_and_order() {
        let series = pivot_series(&sample_page()).unwrap();
        assert_eq!(series.len(), 4);
        for s in &series {
            assert_eq!(s.categories, vec!["Jan", "Feb", "Mar"]);
            assert_eq!(s.elem_numbers, vec![0, 1, 2]);
            assert_eq!(s.values.len(), 3);
        }
        assert_eq!(series[0].values, vec![10.0, 12.0, 11.0]);
        assert_eq!(series[1].values[..2], [8.0, 9.0]);
        assert!(series[1].values[2].is_nan());
        assert_eq!(series[2].values, vec![1.0, 2.0, -1.0]);
        assert_eq!(series[3].values, vec![1.0, 1.0, 3.0]);
    }

    #[test]
    fn test_pivot_empty_page() {
        let series = pivot_series(&DataPage::default()).unwrap();
        assert_eq!(series.len(), 4);
        assert!(series.iter().all(|s| s.categories.is_empty()));
    }

    #[test]
    fn test_pivot_short_row() {
        let mut page = sample_page();
        page.matrix[1].truncate(3);
        let err = pivot_series(&page).unwrap_err();
        assert!(matches!(
            err,
            ExtensionError::MalformedPage {
                row: 1,
                expected: 5,
                found: 3
            }
        ));
    }

    #[test]
    fn test_split_axis_assignment() {
        let datasets = build_datasets(&sample_page(), &config(json!({}))).unwrap();
        let axes: Vec<(Option<&str>, Option<&str>)> = datasets
            .iter()
            .map(|d| (d.xaxis.as_deref(), d.yaxis.as_deref()))
            .collect();
        assert_eq!(
            axes,
            vec![
                (Some("x"), Some("y4")),
                (Some("x"), Some("y3")),
                (Some("x"), Some("y2")),
                (None, None),
            ]
        );
    }

    #[test]
    fn test_combined_has_no_axis_overrides() {
        let datasets = build_datasets(
            &sample_page(),
            &config(json!({ "decomposeInFourCharts": false })),
        )
        .unwrap();
        let json = serde_json::to_value(&datasets).unwrap();
        for d in json.as_array().unwrap() {
            assert!(d.get("xaxis").is_none());
            assert!(d.get("yaxis").is_none());
        }
    }

    #[test]
    fn test_styling_distinct_colors() {
        let cfg = config(json!({
            "colors": true,
            "datapoints": true,
            "pointRadius": 5,
            "borderWidth": 3,
            "line": "tozeroy"
        }));
        assert_eq!(cfg.line, LineFill::ToZeroY);
        let datasets = build_datasets(&sample_page(), &cfg).unwrap();

        assert_eq!(datasets[0].marker.color, rgba(default_color(0), 1.0));
        assert_eq!(datasets[3].marker.color, rgba(default_color(3), 1.0));
        assert_eq!(datasets[2].fillcolor, rgba(default_color(2), 0.3));
        assert_ne!(datasets[0].marker.color, datasets[1].marker.color);
        assert!(datasets.iter().all(|d| d.marker.size == 5.0));
        assert!(datasets.iter().all(|d| d.line.width == 3.0));
        assert!(datasets.iter().all(|d| d.fill == "tozeroy"));
        assert!(datasets.iter().all(|d| d.mode == "lines+markers"));
    }

    #[test]
    fn test_styling_single_color() {
        let cfg = config(json!({ "colors": false, "colorForMain": 6 }));
        let datasets = build_datasets(&sample_page(), &cfg).unwrap();
        let expected = rgba(default_color(6), 1.0);
        assert!(datasets.iter().all(|d| d.marker.color == expected));
        assert!(datasets.iter().all(|d| d.marker.size == 1.0));
    }

    #[test]
    fn test_dataset_names() {
        let datasets = build_datasets(&sample_page(), &config(json!({}))).unwrap();
        let names: Vec<&str> = datasets.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Observed", "Trend", "Seasonal", "Random"]);
    }
}
