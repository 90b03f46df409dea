//! Time-series decomposition chart - Development entry point
//!
//! Runs the configurator and renderer against a layout fixture instead of a live host,
//! and writes the resulting figure (or error surface) to a local JSON file.
//!
//! Usage:
//! ```bash
//! export FIXTURE_PATH=fixtures/monthly_sales.json
//! export OUTPUT_PATH=decomposition.json
//! export RUST_LOG=debug
//! cargo run --bin dev
//! ```

use anyhow::Context;
use std::time::Instant;
use ts_decomposition_chart::chart::{FigureRenderer, RenderTarget};
use ts_decomposition_chart::host::{FixtureClient, Layout};
use ts_decomposition_chart::{draw_chart, ExtensionConfig, QueryConfigurator, RenderOutcome};

fn log_phase(start: Instant, phase: &str) {
    log::info!("[PHASE @{:.3}s] {}", start.elapsed().as_secs_f64(), phase);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_spec = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _logger = flexi_logger::Logger::try_with_str(&log_spec)?.start()?;

    let start = Instant::now();
    log_phase(start, "START: Development run");

    let fixture_path = std::env::var("FIXTURE_PATH")
        .unwrap_or_else(|_| "fixtures/monthly_sales.json".to_string());
    let output_path =
        std::env::var("OUTPUT_PATH").unwrap_or_else(|_| "decomposition.json".to_string());

    log::info!("Fixture: {}", fixture_path);
    log::info!("Output: {}", output_path);

    let fixture = std::fs::read_to_string(&fixture_path)
        .with_context(|| format!("Failed to read fixture '{}'", fixture_path))?;
    let layout: Layout = serde_json::from_str(&fixture)
        .with_context(|| format!("Failed to parse fixture '{}'", fixture_path))?;

    let client = FixtureClient::from_layout(&layout);
    let config = ExtensionConfig::from_layout(&layout)?;

    log::info!("Configuration loaded:");
    log::info!("  Dimension: {}", config.fields.dimension);
    log::info!("  Measure: {}", config.fields.measure);
    log::info!("  Frequency: {}", config.frequency);
    log::info!("  Split charts: {}", config.decompose_in_four_charts);

    log_phase(start, "PHASE 1: Applying hypercube patch");
    let mut configurator = QueryConfigurator::new();
    configurator.create_cube(&client, &config).await?;
    for (patches, _) in client.applied_patches().await {
        for patch in patches {
            log::debug!("  {:?} {} = {}", patch.op, patch.path, patch.value);
        }
    }

    log_phase(start, "PHASE 2: Rendering");
    let target = RenderTarget::new("aat-chart-dev");
    let mut renderer = FigureRenderer::new();
    let outcome = draw_chart(&client, &mut renderer, &layout, &target).await;

    match &outcome {
        Ok(RenderOutcome::Drawn(chart)) => log::info!("✓ Chart {} drawn", chart.id),
        Ok(RenderOutcome::NotDecomposable) => log::warn!("Data could not be decomposed"),
        Err(e) => log::error!("✗ Render failed: {}", e),
    }

    // The target shows an error surface in every failure branch except config errors
    if renderer.content(&target).is_some() {
        log_phase(start, "PHASE 3: Saving figure");
        std::fs::write(&output_path, renderer.to_json(&target)?)
            .with_context(|| format!("Failed to write '{}'", output_path))?;
        log::info!("✓ Saved {}", output_path);
    }

    log_phase(start, "COMPLETE");
    outcome.map(|_| ()).map_err(Into::into)
}
