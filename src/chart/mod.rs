//! Small-multiples chart pipeline: Configured (spec) -> DataBound -> Rendered.

pub mod grid;
pub mod plot;
pub mod render;

pub use plot::{BoundChart, ChartError, RenderedChart};
