//! Host layout and hypercube data types
//!
//! These mirror the JSON the host hands to an extension: the property panel values
//! under `props`, and the evaluated hypercube (measure metadata plus data pages) under
//! `qHyperCube`. Numeric fields from the host are loose: a number can arrive as a JSON
//! number, as a string such as `"NaN"`, or not at all. Everything non-numeric becomes
//! `f64::NAN`.

use serde::{Deserialize, Deserializer, Serialize};

/// Extension layout as delivered by the host on every render
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Layout {
    /// Property panel values (see extension.json for the definitions)
    #[serde(default)]
    pub props: serde_json::Value,

    /// Evaluated hypercube
    #[serde(rename = "qHyperCube", default)]
    pub hypercube: HyperCube,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HyperCube {
    #[serde(rename = "qMeasureInfo", default)]
    pub measure_info: Vec<MeasureInfo>,

    /// Pages already delivered with the layout (usually empty, the extension fetches)
    #[serde(rename = "qDataPages", default)]
    pub data_pages: Vec<DataPage>,
}

impl HyperCube {
    /// True when a measure has neither a usable min nor max.
    ///
    /// A measure index past the end of the list counts as undefined.
    pub fn measure_is_undefined(&self, index: usize) -> bool {
        self.measure_info
            .get(index)
            .map(MeasureInfo::is_undefined)
            .unwrap_or(true)
    }
}

/// Aggregate metadata for one measure column
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MeasureInfo {
    #[serde(rename = "qFallbackTitle", default)]
    pub title: String,

    #[serde(rename = "qMin", default = "nan", deserialize_with = "loose_f64")]
    pub min: f64,

    #[serde(rename = "qMax", default = "nan", deserialize_with = "loose_f64")]
    pub max: f64,

    #[serde(rename = "qNumFormat", default)]
    pub num_format: NumFormat,
}

impl MeasureInfo {
    pub fn is_undefined(&self) -> bool {
        self.min.is_nan() && self.max.is_nan()
    }
}

impl Default for MeasureInfo {
    fn default() -> Self {
        Self {
            title: String::new(),
            min: f64::NAN,
            max: f64::NAN,
            num_format: NumFormat::default(),
        }
    }
}

/// Number format attached to a measure by the host
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NumFormat {
    /// Format type: U (auto), F (number), M (money), R (real), I (integer), D (date) ...
    #[serde(rename = "qType", default)]
    pub kind: String,

    #[serde(rename = "qnDec", default)]
    pub decimals: Option<u32>,

    #[serde(rename = "qUseThou", default)]
    pub use_thousands: Option<u32>,

    /// Format pattern, e.g. `$#,##0.00` or `0.0%`
    #[serde(rename = "qFmt", default)]
    pub pattern: Option<String>,

    #[serde(rename = "qDec", default)]
    pub decimal_sep: Option<String>,

    #[serde(rename = "qThou", default)]
    pub thousands_sep: Option<String>,
}

/// Fetch window for one data page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageRequest {
    #[serde(rename = "qTop")]
    pub top: usize,
    #[serde(rename = "qLeft")]
    pub left: usize,
    #[serde(rename = "qWidth")]
    pub width: usize,
    #[serde(rename = "qHeight")]
    pub height: usize,
}

/// One page of hypercube data in row-major order
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DataPage {
    #[serde(rename = "qMatrix", default)]
    pub matrix: Vec<Vec<Cell>>,
}

impl DataPage {
    /// Cut the page down to a request window
    pub fn window(&self, request: &PageRequest) -> DataPage {
        let matrix = self
            .matrix
            .iter()
            .skip(request.top)
            .take(request.height)
            .map(|row| {
                row.iter()
                    .skip(request.left)
                    .take(request.width)
                    .cloned()
                    .collect()
            })
            .collect();
        DataPage { matrix }
    }
}

/// A single hypercube cell
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Cell {
    #[serde(rename = "qText", default)]
    pub text: String,

    #[serde(rename = "qNum", default = "nan", deserialize_with = "loose_f64")]
    pub num: f64,

    /// Element number of the value; negative for nulls and "others" buckets
    #[serde(rename = "qElemNumber", default)]
    pub elem_number: i64,
}

impl Cell {
    pub fn new(text: impl Into<String>, num: f64, elem_number: i64) -> Self {
        Self {
            text: text.into(),
            num,
            elem_number,
        }
    }
}

fn nan() -> f64 {
    f64::NAN
}

/// Accept a number, a numeric string, `"NaN"`, or null; anything else is NaN
fn loose_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}
