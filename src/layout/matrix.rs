//! Adjacency matrix indexed by document node order, consumed by the chord layout.
//!
//! Known limitation: when several links share the same ordered
//! (source, target) pair, the later link in document order overwrites the
//! earlier one. Values are not summed, since a chord cell carries a single
//! weight.

use crate::model::{GraphDocument, GraphIndex};

/// Square matrix where `cell(i, j)` is the value of the link `i -> j`.
#[derive(Clone, Debug, PartialEq)]
pub struct AdjacencyMatrix {
	n: usize,
	cells: Vec<f64>,
	/// Link index that wrote each non-zero cell, for colour and tooltip lookup.
	owners: Vec<Option<usize>>,
}

impl AdjacencyMatrix {
	/// Builds the matrix over all document nodes.
	///
	/// Links referencing unknown nodes are dropped with a warning.
	pub fn build(doc: &GraphDocument) -> Self {
		let index = GraphIndex::new(doc);
		let n = doc.nodes.len();
		let mut matrix = Self {
			n,
			cells: vec![0.0; n * n],
			owners: vec![None; n * n],
		};
		for resolved in index.resolved_links() {
			let cell = resolved.source * n + resolved.target;
			matrix.cells[cell] = resolved.link.value;
			matrix.owners[cell] = Some(resolved.index);
		}
		matrix
	}

	pub fn len(&self) -> usize {
		self.n
	}

	pub fn is_empty(&self) -> bool {
		self.n == 0
	}

	pub fn cell(&self, i: usize, j: usize) -> f64 {
		self.cells[i * self.n + j]
	}

	/// Link index that last wrote `cell(i, j)`.
	pub fn owner(&self, i: usize, j: usize) -> Option<usize> {
		self.owners[i * self.n + j]
	}

	/// Sum of row `i`.
	pub fn row_sum(&self, i: usize) -> f64 {
		self.cells[i * self.n..(i + 1) * self.n].iter().sum()
	}

	/// Rows as nested vectors.
	pub fn rows(&self) -> Vec<Vec<f64>> {
		self.cells.chunks(self.n.max(1)).take(self.n).map(<[f64]>::to_vec).collect()
	}
}
