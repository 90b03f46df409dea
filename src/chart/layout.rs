//! Chart layout options
//!
//! Combined mode draws all components on one pair of axes and passes no layout to the
//! chart backend. Split mode stacks four y axes bottom-to-top as
//! Random, Seasonal, Trend, Observed, sharing one x axis.

use crate::config::ExtensionConfig;
use crate::host::{HyperCube, MeasureInfo};
use serde::Serialize;
use std::collections::BTreeMap;

/// Vertical gap between stacked subplots
pub const SUBPLOT_GAP: f64 = 0.01;

/// Measure whose number format drives the tick labels of every axis
const FORMAT_MEASURE_INDEX: usize = 0;

/// Split-mode axis titles, bottom to top
const SPLIT_TITLES: [&str; 4] = ["Random", "Seasonal", "Trend", "Observed"];

/// Tick label formatting derived from a measure's number format
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AxisFormat {
    /// d3-format specifier, e.g. `,.2f` or `.1%`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickformat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickprefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticksuffix: Option<String>,
}

impl AxisFormat {
    /// Derive tick formatting from the measure's `qNumFormat`
    ///
    /// Only the positive section of the pattern (before the first unquoted `;`) is
    /// used. It is split around its digit placeholders (`0` and `#`): text before the
    /// first one is the prefix, text after the last one the suffix. A `%` in the suffix
    /// switches to percent format. Without a pattern, `qnDec` and `qUseThou` decide
    /// the format. Auto-formatted measures get no overrides.
    pub fn from_measure(info: &MeasureInfo) -> Self {
        let format = &info.num_format;
        if format.kind.is_empty() || format.kind.eq_ignore_ascii_case("U") {
            return Self::default();
        }

        let pattern = match format.pattern.as_deref() {
            Some(p) if !p.is_empty() => positive_section(p),
            _ => return Self::from_decimals(format.decimals, format.use_thousands),
        };

        let is_placeholder = |c: char| c == '0' || c == '#';
        let (first, last) = match (pattern.find(is_placeholder), pattern.rfind(is_placeholder)) {
            (Some(first), Some(last)) => (first, last),
            _ => return Self::default(),
        };

        let prefix = &pattern[..first];
        let body = &pattern[first..=last];
        let raw_suffix = &pattern[last + 1..];

        let percent = raw_suffix.contains('%');
        let suffix: String = raw_suffix.chars().filter(|c| *c != '%').collect();

        let decimal_sep = format.decimal_sep.as_deref().unwrap_or(".");
        let thousands_sep = format.thousands_sep.as_deref().unwrap_or(",");

        let decimals = match body.rfind(decimal_sep) {
            Some(pos) if !decimal_sep.is_empty() => body[pos + decimal_sep.len()..]
                .chars()
                .filter(|c| is_placeholder(*c))
                .count(),
            _ => 0,
        };
        let grouping = !thousands_sep.is_empty()
            && thousands_sep != decimal_sep
            && body.contains(thousands_sep);

        let tickformat = format!(
            "{}.{}{}",
            if grouping { "," } else { "" },
            decimals,
            if percent { "%" } else { "f" }
        );

        Self {
            tickformat: Some(tickformat),
            tickprefix: non_empty(prefix),
            ticksuffix: non_empty(&suffix),
        }
    }

    fn from_decimals(decimals: Option<u32>, use_thousands: Option<u32>) -> Self {
        match decimals {
            Some(decimals) => Self {
                tickformat: Some(format!(
                    "{}.{}f",
                    if use_thousands.unwrap_or(0) != 0 { "," } else { "" },
                    decimals
                )),
                ..Default::default()
            },
            None => Self::default(),
        }
    }

    /// Formatting for the measure at `index`, none if it does not exist
    pub fn for_measure_index(hypercube: &HyperCube, index: usize) -> Self {
        hypercube
            .measure_info
            .get(index)
            .map(Self::from_measure)
            .unwrap_or_default()
    }
}

/// Part of a number format pattern before the first `;` outside quotes
fn positive_section(pattern: &str) -> &str {
    let mut quote = None;
    for (i, c) in pattern.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, ';') => return &pattern[..i],
            _ => {}
        }
    }
    pattern
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XAxisOptions {
    pub showgrid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YAxisOptions {
    pub title: String,
    pub domain: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    pub showgrid: bool,
    #[serde(flatten)]
    pub format: AxisFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub r: u32,
    pub t: u32,
}

/// Layout passed to the chart backend in split mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutOptions {
    pub showlegend: bool,
    pub xaxis: XAxisOptions,
    /// Keyed `yaxis`, `yaxis2`, ...
    #[serde(flatten)]
    pub y_axes: BTreeMap<String, YAxisOptions>,
    pub dragmode: String,
    pub margin: Margin,
}

/// Layout key of the n-th y axis (1-based)
pub fn y_axis_key(n: usize) -> String {
    if n <= 1 {
        "yaxis".to_string()
    } else {
        format!("yaxis{}", n)
    }
}

/// Stacked, non-overlapping domains over [0, 1], bottom first
///
/// Each band is `1 / count` tall; all but the top band give up `gap` at their upper
/// edge, the top band reaches 1.
pub fn stacked_domains(count: usize, gap: f64) -> Vec<[f64; 2]> {
    if count == 0 {
        return Vec::new();
    }
    let band = 1.0 / count as f64;
    (0..count)
        .map(|k| {
            let start = k as f64 * band;
            let end = if k + 1 == count {
                1.0
            } else {
                (k + 1) as f64 * band - gap
            };
            [start, end]
        })
        .collect()
}

/// Layout options for the configured mode; `None` in combined mode
pub fn build_layout(config: &ExtensionConfig, hypercube: &HyperCube) -> Option<LayoutOptions> {
    if !config.decompose_in_four_charts {
        return None;
    }

    let format = AxisFormat::for_measure_index(hypercube, FORMAT_MEASURE_INDEX);
    let domains = stacked_domains(SPLIT_TITLES.len(), SUBPLOT_GAP);

    let y_axes = SPLIT_TITLES
        .iter()
        .zip(domains)
        .enumerate()
        .map(|(i, (title, domain))| {
            let options = YAxisOptions {
                title: title.to_string(),
                domain,
                // Every subplot shares the single x axis
                anchor: if i == 0 { None } else { Some("x".to_string()) },
                showgrid: config.y_scale,
                format: format.clone(),
            };
            (y_axis_key(i + 1), options)
        })
        .collect();

    Some(LayoutOptions {
        showlegend: config.show_legend,
        xaxis: XAxisOptions {
            showgrid: config.x_scale,
        },
        y_axes,
        dragmode: "select".to_string(),
        margin: Margin { r: 10, t: 0 },
    })
}
