//! Canvas force layout of the artist graph.

mod component;
mod render;
mod simulation;
mod state;
mod types;

pub use component::ForceGraphCanvas;
pub use types::ActiveDetail;
