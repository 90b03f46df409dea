//! Point selection → dimension element selection
//!
//! The chart backend reports picked points as (curve, point) indices. Every dataset
//! carries the dimension element number of each point, so a pick resolves to element
//! numbers that the host can select on dimension 0.

use super::series::Dataset;
use crate::host::{QueryClient, Result};

/// Dimension column selections are applied to
const SELECTION_DIMENSION: usize = 0;

/// A point reported by the chart backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointRef {
    /// Dataset index
    pub curve: usize,
    /// Point index inside the dataset
    pub point: usize,
}

/// Element numbers per dataset, captured at draw time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionBinding {
    elem_numbers: Vec<Vec<i64>>,
}

impl SelectionBinding {
    pub fn from_datasets(datasets: &[Dataset]) -> Self {
        Self {
            elem_numbers: datasets.iter().map(|d| d.elem_num.clone()).collect(),
        }
    }

    /// Distinct selectable element numbers for the picked points, ascending
    ///
    /// Unknown indices and negative element numbers (nulls, "others") are dropped.
    pub fn resolve(&self, points: &[PointRef]) -> Vec<i64> {
        let mut values: Vec<i64> = points
            .iter()
            .filter_map(|p| self.elem_numbers.get(p.curve)?.get(p.point).copied())
            .filter(|elem| *elem >= 0)
            .collect();
        values.sort_unstable();
        values.dedup();
        values
    }
}

/// Forward a pick to the host. Returns whether a selection call was made.
pub async fn apply_selection<C>(
    client: &C,
    binding: &SelectionBinding,
    points: &[PointRef],
    toggle: bool,
) -> Result<bool>
where
    C: QueryClient + ?Sized,
{
    let values = binding.resolve(points);
    if values.is_empty() {
        log::debug!("Selection resolved to no elements, skipping");
        return Ok(false);
    }

    log::info!("Selecting {} element(s)", values.len());
    client
        .select_values(SELECTION_DIMENSION, &values, toggle)
        .await?;
    Ok(true)
}
