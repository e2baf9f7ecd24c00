//! Pipeline: state machine, palette grounding and export.

pub mod export;
pub mod flow;
pub mod grounding;
pub mod state;

pub use export::ConfigExporter;
pub use flow::StylePipeline;
pub use grounding::{ground_palette, ColorGrounding, PaletteGrounding};
pub use state::{PipelineState, PipelineStatus};
