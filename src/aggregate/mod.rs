//! Derived views over a document: summary statistics, the sector-level
//! rollup, and the sector drill-down.

mod drilldown;
mod rollup;
mod stats;

pub use drilldown::{DrillOutcome, DrillState, EdgeDetail, NodeDetails, focus_subgraph, node_details};
pub use rollup::{SECTOR_PREFIX, sector_node_id, sector_of_node_id, sector_rollup};
pub use stats::{Summary, layer_summaries, legend_summaries, summarize};
