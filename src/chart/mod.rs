pub mod assembler;
pub mod export;
pub mod palette;
pub mod render;

pub use assembler::{ChartAssembler, ChartPoint, ChartSeries, ChartState};
pub use export::export_csv;
pub use palette::{color_for, Color, PALETTE};
pub use render::{ChartFileRenderer, LogRenderer, Renderer};
