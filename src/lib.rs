pub mod config;
pub mod grid;
pub mod process;
pub mod sink;

pub use config::{Layout, RunConfig};
pub use grid::{Cell, CellGrid};
pub use process::{run_pipeline, HeaderDescriptor, NormalizedRecord};
