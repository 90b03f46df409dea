//! Chart backend seam
//!
//! The extension hands finished datasets and layout to a [`ChartRenderer`]; it never
//! touches the UI node itself. The caller owns the [`RenderTarget`] and passes it in on
//! every render, and each draw or error surface fully replaces what the target showed.

use super::layout::LayoutOptions;
use super::selection::SelectionBinding;
use super::series::Dataset;
use crate::host::{ExtensionError, Result};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Caller-owned handle to the UI node a chart is drawn into
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderTarget {
    id: String,
}

impl RenderTarget {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// A drawn chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartHandle {
    pub id: Uuid,
    pub target: RenderTarget,
}

/// Static error panel shown in place of a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSurface {
    /// All decomposed measures came back empty (too few points for the frequency,
    /// or the script engine produced nothing)
    NotDecomposable,
    /// The data page could not be fetched
    BackendUnavailable,
}

impl ErrorSurface {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorSurface::NotDecomposable => {
                "Could not decompose the data. Check the R connection and that there are at least two full periods of data for the selected frequency."
            }
            ErrorSurface::BackendUnavailable => {
                "Could not retrieve data from the analytics backend."
            }
        }
    }
}

pub trait ChartRenderer {
    /// Draw the datasets into the target; `layout` is `None` for backend defaults
    fn draw(
        &mut self,
        target: &RenderTarget,
        datasets: &[Dataset],
        layout: Option<&LayoutOptions>,
    ) -> Result<ChartHandle>;

    /// Wire click/box-select events on a drawn chart to element selection
    fn set_events(&mut self, chart: &ChartHandle, binding: SelectionBinding) -> Result<()>;

    /// Show an error surface in place of the chart
    fn display_error(&mut self, target: &RenderTarget, surface: ErrorSurface) -> Result<()>;
}

/// What a target currently shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TargetContent {
    Figure(Figure),
    Error { error: ErrorSurface, message: String },
}

/// Plotly-style figure document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Dataset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutOptions>,
}

/// Renderer that keeps each target's content as a JSON-serializable figure
#[derive(Debug, Default)]
pub struct FigureRenderer {
    targets: HashMap<RenderTarget, TargetContent>,
    bindings: HashMap<Uuid, SelectionBinding>,
    current: HashMap<RenderTarget, Uuid>,
}

impl FigureRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self, target: &RenderTarget) -> Option<&TargetContent> {
        self.targets.get(target)
    }

    pub fn binding(&self, chart: &ChartHandle) -> Option<&SelectionBinding> {
        self.bindings.get(&chart.id)
    }

    /// Serialized content of a target
    pub fn to_json(&self, target: &RenderTarget) -> Result<String> {
        let content = self
            .targets
            .get(target)
            .ok_or_else(|| ExtensionError::Render(format!("nothing drawn in '{}'", target.id())))?;
        Ok(serde_json::to_string_pretty(content)?)
    }

    /// Drop the previous chart (and its event binding) of a target
    fn clear(&mut self, target: &RenderTarget) {
        if let Some(old) = self.current.remove(target) {
            self.bindings.remove(&old);
        }
        self.targets.remove(target);
    }
}

impl ChartRenderer for FigureRenderer {
    fn draw(
        &mut self,
        target: &RenderTarget,
        datasets: &[Dataset],
        layout: Option<&LayoutOptions>,
    ) -> Result<ChartHandle> {
        self.clear(target);

        let handle = ChartHandle {
            id: Uuid::new_v4(),
            target: target.clone(),
        };
        self.targets.insert(
            target.clone(),
            TargetContent::Figure(Figure {
                data: datasets.to_vec(),
                layout: layout.cloned(),
            }),
        );
        self.current.insert(target.clone(), handle.id);
        Ok(handle)
    }

    fn set_events(&mut self, chart: &ChartHandle, binding: SelectionBinding) -> Result<()> {
        match self.current.get(&chart.target) {
            Some(id) if *id == chart.id => {
                self.bindings.insert(chart.id, binding);
                Ok(())
            }
            _ => Err(ExtensionError::Render(format!(
                "chart {} is no longer shown in '{}'",
                chart.id,
                chart.target.id()
            ))),
        }
    }

    fn display_error(&mut self, target: &RenderTarget, surface: ErrorSurface) -> Result<()> {
        self.clear(target);
        self.targets.insert(
            target.clone(),
            TargetContent::Error {
                error: surface,
                message: surface.message().to_string(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(name: &str) -> Dataset {
        use super::super::series::{Line, Marker};
        Dataset {
            x: vec!["Jan".into()],
            y: vec![1.0],
            elem_num: vec![0],
            name: name.into(),
            mode: "lines+markers".into(),
            fill: "none".into(),
            fillcolor: "rgba(0,0,0,0.3)".into(),
            marker: Marker {
                color: "rgba(0,0,0,1)".into(),
                size: 1.0,
            },
            line: Line { width: 1.0 },
            xaxis: None,
            yaxis: None,
        }
    }

    #[test]
    fn test_draw_replaces_target() {
        let mut renderer = FigureRenderer::new();
        let target = RenderTarget::new("chart-1");

        let first = renderer.draw(&target, &[dataset("A")], None).unwrap();
        renderer
            .set_events(&first, SelectionBinding::from_datasets(&[dataset("A")]))
            .unwrap();
        let second = renderer.draw(&target, &[dataset("B")], None).unwrap();

        assert_ne!(first.id, second.id);
        assert!(renderer.binding(&first).is_none());
        match renderer.content(&target) {
            Some(TargetContent::Figure(fig)) => assert_eq!(fig.data[0].name, "B"),
            other => panic!("unexpected content: {:?}", other),
        }

        // events for a replaced chart are refused
        assert!(renderer
            .set_events(&first, SelectionBinding::default())
            .is_err());
    }

    #[test]
    fn test_error_surface_replaces_chart() {
        let mut renderer = FigureRenderer::new();
        let target = RenderTarget::new("chart-2");
        renderer.draw(&target, &[dataset("A")], None).unwrap();
        renderer
            .display_error(&target, ErrorSurface::NotDecomposable)
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&renderer.to_json(&target).unwrap()).unwrap();
        assert_eq!(json["error"], "not_decomposable");
        assert!(json["message"].as_str().unwrap().contains("decompose"));
    }

    #[test]
    fn test_figure_json_without_layout() {
        let mut renderer = FigureRenderer::new();
        let target = RenderTarget::new("chart-3");
        renderer.draw(&target, &[dataset("A")], None).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&renderer.to_json(&target).unwrap()).unwrap();
        assert!(json.get("layout").is_none());
        assert_eq!(json["data"][0]["elemNum"], serde_json::json!([0]));
    }

    #[test]
    fn test_to_json_unknown_target() {
        let renderer = FigureRenderer::new();
        assert!(renderer.to_json(&RenderTarget::new("nope")).is_err());
    }
}
