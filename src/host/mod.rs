//! Host platform integration
//!
//! Everything that knows about the host's extension API lives here.
//!
//! Structure:
//! - `client.rs`: `QueryClient` trait (patch, fetch, select) and the in-memory `FixtureClient`
//! - `hypercube.rs`: Layout, measure metadata and data page types
//! - `properties.rs`: Property definitions from extension.json and the typed reader
//! - `palettes.rs`: Series color palettes
//! - `error.rs`: Error types

pub mod client;
pub mod error;
pub mod hypercube;
pub mod palettes;
pub mod properties;

pub use client::{FixtureClient, PatchOp, PatchOperation, QueryClient, SelectionCall};
pub use error::{ExtensionError, HostError, Result};
pub use hypercube::{Cell, DataPage, HyperCube, Layout, MeasureInfo, NumFormat, PageRequest};
