//! Chart construction
//!
//! Structure:
//! - `series.rs`: Pivot of result rows into the four component datasets and their styling
//! - `layout.rs`: Combined vs. split layout, stacked axis domains, tick formatting
//! - `renderer.rs`: `ChartRenderer` trait, render targets, and the JSON `FigureRenderer`
//! - `selection.rs`: Mapping picked points back to dimension element numbers

pub mod layout;
pub mod renderer;
pub mod selection;
pub mod series;

pub use layout::{build_layout, AxisFormat, LayoutOptions};
pub use renderer::{ChartHandle, ChartRenderer, ErrorSurface, FigureRenderer, RenderTarget};
pub use selection::{apply_selection, PointRef, SelectionBinding};
pub use series::{build_datasets, pivot_series, Dataset, Series, SeriesKind};
