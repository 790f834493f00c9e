mod component;
mod render;
mod state;
mod tooltip;

pub use component::GraphCanvas;
