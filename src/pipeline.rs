//! Result rendering pipeline
//!
//! The pipeline:
//! 1. Fetches one page of the decomposition hypercube
//! 2. Checks the decomposed measures actually produced values
//! 3. Pivots rows into the four component datasets
//! 4. Builds the layout for combined or split mode
//! 5. Draws through the ChartRenderer and binds selection events
//!
//! One render is `fetching → { error displayed | chart drawn }`, with no retry.

use crate::chart::{
    build_datasets, build_layout, ChartHandle, ChartRenderer, ErrorSurface, RenderTarget,
    SelectionBinding,
};
use crate::config::ExtensionConfig;
use crate::host::{
    DataPage, ExtensionError, HyperCube, Layout, PageRequest, QueryClient, Result,
};

/// Fixed fetch window: dimension + five measures, at most 1500 rows
pub const PAGE_REQUEST: PageRequest = PageRequest {
    top: 0,
    left: 0,
    width: 6,
    height: 1500,
};

/// Measure indices holding the trend, seasonal and random components
const DECOMPOSED_MEASURES: [usize; 3] = [1, 2, 3];

/// How a render finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Chart drawn and events bound
    Drawn(ChartHandle),
    /// Decomposed measures were all empty; the error surface is shown instead
    NotDecomposable,
}

/// True when none of the decomposed measures has a min or max
pub fn is_decomposable(hypercube: &HyperCube) -> bool {
    !DECOMPOSED_MEASURES
        .iter()
        .all(|idx| hypercube.measure_is_undefined(*idx))
}

/// Render the decomposition chart for the current layout
///
/// Resolves once the chart is drawn and its events are bound, or once an error
/// surface is shown. A failed fetch shows `ErrorSurface::BackendUnavailable` and
/// returns `ExtensionError::Fetch`.
pub async fn draw_chart<C, R>(
    client: &C,
    renderer: &mut R,
    layout: &Layout,
    target: &RenderTarget,
) -> Result<RenderOutcome>
where
    C: QueryClient + ?Sized,
    R: ChartRenderer + ?Sized,
{
    let config = ExtensionConfig::from_layout(layout)?;

    log::debug!(
        "Requesting page: top={}, left={}, width={}, height={}",
        PAGE_REQUEST.top,
        PAGE_REQUEST.left,
        PAGE_REQUEST.width,
        PAGE_REQUEST.height
    );
    let pages = match client.get_data(&[PAGE_REQUEST]).await {
        Ok(pages) => pages,
        Err(e) => {
            log::error!("Data fetch failed for '{}': {}", target.id(), e);
            renderer.display_error(target, ErrorSurface::BackendUnavailable)?;
            return Err(ExtensionError::Fetch(e));
        }
    };

    if !is_decomposable(&layout.hypercube) {
        log::error!(
            "Decomposed measures are all NaN for '{}' (frequency={})",
            target.id(),
            config.frequency
        );
        renderer.display_error(target, ErrorSurface::NotDecomposable)?;
        return Ok(RenderOutcome::NotDecomposable);
    }

    let page = match pages.into_iter().next() {
        Some(page) => page,
        None => {
            log::warn!(
                "Host returned no data page for '{}', drawing empty series",
                target.id()
            );
            DataPage::default()
        }
    };
    log::debug!("Received {} row(s)", page.matrix.len());

    let datasets = build_datasets(&page, &config)?;
    let chart_layout = build_layout(&config, &layout.hypercube);

    let chart = renderer.draw(target, &datasets, chart_layout.as_ref())?;
    renderer.set_events(&chart, SelectionBinding::from_datasets(&datasets))?;

    log::info!(
        "Drew {} series of {} point(s) into '{}' ({} mode)",
        datasets.len(),
        datasets.first().map_or(0, |d| d.len()),
        target.id(),
        if chart_layout.is_some() { "split" } else { "combined" }
    );
    Ok(RenderOutcome::Drawn(chart))
}
