//! Host query client
//!
//! The extension never talks to the host's object graph directly. Everything it needs
//! from the live hypercube object goes through [`QueryClient`]: applying a patch-set to
//! the definition, fetching a data page, and selecting values.
//!
//! [`FixtureClient`] is the in-memory implementation used by the `dev` binary and tests.

use super::error::HostError;
use super::hypercube::{DataPage, Layout, PageRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Patch operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
}

/// One entry of a patch-set against the live object definition
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PatchOperation {
    #[serde(rename = "qPath")]
    pub path: String,

    #[serde(rename = "qOp")]
    pub op: PatchOp,

    /// JSON text of the new value
    #[serde(rename = "qValue")]
    pub value: String,
}

impl PatchOperation {
    pub fn replace(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            op: PatchOp::Replace,
            value: value.into(),
        }
    }
}

/// Narrow view of the host's live hypercube object
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Apply a patch-set to the object definition in one call.
    ///
    /// `soft_patch` patches are session-only and not persisted by the host.
    async fn apply_patches(
        &self,
        patches: &[PatchOperation],
        soft_patch: bool,
    ) -> Result<(), HostError>;

    /// Fetch data pages for the given windows (one page per request)
    async fn get_data(&self, requests: &[PageRequest]) -> Result<Vec<DataPage>, HostError>;

    /// Select element numbers on a dimension column
    async fn select_values(
        &self,
        dimension: usize,
        values: &[i64],
        toggle: bool,
    ) -> Result<(), HostError>;
}

/// A recorded `select_values` call
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionCall {
    pub dimension: usize,
    pub values: Vec<i64>,
    pub toggle: bool,
}

#[derive(Debug, Default)]
struct FixtureState {
    patches: Vec<(Vec<PatchOperation>, bool)>,
    selections: Vec<SelectionCall>,
    fetches: usize,
}

/// In-memory query client serving pre-evaluated pages
#[derive(Debug, Default)]
pub struct FixtureClient {
    pages: Vec<DataPage>,
    fail_fetch: Option<String>,
    state: Mutex<FixtureState>,
}

impl FixtureClient {
    pub fn new(pages: Vec<DataPage>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    /// Serve the pages embedded in a layout's `qDataPages`
    pub fn from_layout(layout: &Layout) -> Self {
        Self::new(layout.hypercube.data_pages.clone())
    }

    /// Make every fetch fail with the given backend message
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_fetch: Some(message.into()),
            ..Default::default()
        }
    }

    /// Patch-sets applied so far, with their soft-patch flag
    pub async fn applied_patches(&self) -> Vec<(Vec<PatchOperation>, bool)> {
        self.state.lock().await.patches.clone()
    }

    pub async fn selections(&self) -> Vec<SelectionCall> {
        self.state.lock().await.selections.clone()
    }

    pub async fn fetch_count(&self) -> usize {
        self.state.lock().await.fetches
    }
}

#[async_trait]
impl QueryClient for FixtureClient {
    async fn apply_patches(
        &self,
        patches: &[PatchOperation],
        soft_patch: bool,
    ) -> Result<(), HostError> {
        if let Some(bad) = patches.iter().find(|p| !p.path.starts_with('/')) {
            return Err(HostError::Patch(format!("invalid path '{}'", bad.path)));
        }

        log::debug!(
            "FixtureClient: applying {} patch(es), soft={}",
            patches.len(),
            soft_patch
        );
        self.state
            .lock()
            .await
            .patches
            .push((patches.to_vec(), soft_patch));
        Ok(())
    }

    async fn get_data(&self, requests: &[PageRequest]) -> Result<Vec<DataPage>, HostError> {
        self.state.lock().await.fetches += 1;

        if let Some(ref message) = self.fail_fetch {
            return Err(HostError::Fetch(message.clone()));
        }

        let source = self.pages.first().cloned().unwrap_or_default();
        Ok(requests.iter().map(|req| source.window(req)).collect())
    }

    async fn select_values(
        &self,
        dimension: usize,
        values: &[i64],
        toggle: bool,
    ) -> Result<(), HostError> {
        // The patched cube carries exactly one dimension
        if dimension != 0 {
            return Err(HostError::Selection(format!(
                "no dimension at index {}",
                dimension
            )));
        }
        if values.is_empty() {
            return Err(HostError::Selection("empty selection".into()));
        }

        self.state.lock().await.selections.push(SelectionCall {
            dimension,
            values: values.to_vec(),
            toggle,
        });
        Ok(())
    }
}
