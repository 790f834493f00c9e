mod controls;
mod graph_canvas;
mod link_table;

pub use controls::{ButtonGroup, DetailsPanel, Legend, NoticeBanner, SelectControl, ViewSwitch};
pub use graph_canvas::GraphCanvas;
pub use link_table::LinkTable;
