//! DOM-free graph core: schema, building, filtering and the transport payload.
//!
//! Data flows rows -> [`build`] -> [`Graph`] -> [`visible_subgraph`] ->
//! [`GraphPayload`]. The [`Graph`] is built once per dataset and only read
//! afterwards.

pub mod builder;
pub mod color;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod model;
pub mod payload;
pub mod record;
pub mod registry;

pub use builder::{BuildContext, BuildReport, BuildWarning, Graph, build, load};
pub use dataset::{Row, parse_rows};
pub use error::{DatasetError, LoadError, PayloadError, RegistryError, RowError};
pub use filter::{FilterSelection, OrphanPolicy, Subgraph, visible_subgraph};
pub use model::{DetailRecord, Edge, Node};
pub use payload::GraphPayload;
pub use registry::{CategoryRegistry, FilterGroup};
