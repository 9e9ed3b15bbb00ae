//! Dense all-pairs best-rate table.
//!
//! Built with a Floyd–Warshall pass that maximizes the product of rates
//! instead of minimizing a sum of weights. The table is rebuilt wholesale;
//! it is never patched after a store mutation.
//!
//! A cycle whose rates multiply above 1 has no best rate: looping it once
//! more always pays. Vertices on such a cycle are recorded at build time
//! and every pair whose route can reach one is reported through
//! [`PathTable::arbitrage_between`] instead of read from the table.

use crate::error::{GraphError, GraphResult};
use crate::registry::VertexIndex;
use crate::store::RateStore;

/// Rate of a vertex to itself.
const SELF_RATE: f64 = 1.0;

/// Best rates and next hops between every pair of vertices.
#[derive(Debug, Clone, Default)]
pub struct PathTable {
    size: usize,
    rates: Vec<f64>,
    next_hops: Vec<Option<VertexIndex>>,
    /// Vertices on a cycle with rate product above 1.
    arbitrage: Vec<VertexIndex>,
}

impl PathTable {
    /// Build the table for the first `size` vertices of the store.
    pub fn build(size: usize, store: &RateStore) -> GraphResult<Self> {
        if store.slot_count() != size {
            return Err(GraphError::invariant(format!(
                "registry holds {} vertices but rate store has {} slots",
                size,
                store.slot_count()
            )));
        }

        let mut table = Self {
            size,
            rates: vec![0.0; size * size],
            next_hops: vec![None; size * size],
            arbitrage: Vec::new(),
        };

        for row in 0..size {
            for (col, edge) in store.edges_from(VertexIndex(row)) {
                let cell = table.cell(row, col.0);
                table.rates[cell] = edge.rate;
                table.next_hops[cell] = Some(col);
            }
            // An isolated vertex has no self edge in the store.
            let diagonal = table.cell(row, row);
            table.rates[diagonal] = SELF_RATE;
            table.next_hops[diagonal] = Some(VertexIndex(row));
        }

        table.relax();
        table.pin_diagonal();
        Ok(table)
    }

    // Relaxation lifts the diagonal above 1 exactly for vertices on a
    // gaining cycle. Record them, then restore the self-rate.
    fn pin_diagonal(&mut self) {
        for vertex in 0..self.size {
            let diagonal = self.cell(vertex, vertex);
            if self.rates[diagonal] > SELF_RATE {
                self.arbitrage.push(VertexIndex(vertex));
            }
            self.rates[diagonal] = SELF_RATE;
            self.next_hops[diagonal] = Some(VertexIndex(vertex));
        }
    }

    fn relax(&mut self) {
        let n = self.size;
        for mid in 0..n {
            for row in 0..n {
                let to_mid = self.rates[self.cell(row, mid)];
                if to_mid == 0.0 {
                    continue;
                }
                let hop = self.next_hops[self.cell(row, mid)];
                for col in 0..n {
                    let candidate = to_mid * self.rates[self.cell(mid, col)];
                    let cell = self.cell(row, col);
                    if candidate > self.rates[cell] {
                        self.rates[cell] = candidate;
                        self.next_hops[cell] = hop;
                    }
                }
            }
        }
    }

    #[inline]
    fn cell(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    fn check_bounds(&self, index: VertexIndex) -> GraphResult<()> {
        if index.0 >= self.size {
            return Err(GraphError::invariant(format!(
                "vertex {} outside path table of size {}",
                index, self.size
            )));
        }
        Ok(())
    }

    /// Number of vertices covered.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Vertices on a cycle with rate product above 1, in registration order.
    pub fn arbitrage_vertices(&self) -> &[VertexIndex] {
        &self.arbitrage
    }

    /// Gaining-cycle vertices that a route from `from` to `to` can pass
    /// through. When non-empty the pair has no best rate and `rate`/`path`
    /// for it are meaningless. Always empty for `from == to`.
    pub fn arbitrage_between(
        &self,
        from: VertexIndex,
        to: VertexIndex,
    ) -> GraphResult<Vec<VertexIndex>> {
        self.check_bounds(from)?;
        self.check_bounds(to)?;
        if from == to {
            return Ok(Vec::new());
        }
        Ok(self
            .arbitrage
            .iter()
            .copied()
            .filter(|&mid| {
                self.rates[self.cell(from.0, mid.0)] > 0.0
                    && self.rates[self.cell(mid.0, to.0)] > 0.0
            })
            .collect())
    }

    /// Best rate from `from` to `to`; 0 when unreachable.
    pub fn rate(&self, from: VertexIndex, to: VertexIndex) -> GraphResult<f64> {
        self.check_bounds(from)?;
        self.check_bounds(to)?;
        Ok(self.rates[self.cell(from.0, to.0)])
    }

    /// First hop on the best path from `from` to `to`.
    pub fn next_hop(&self, from: VertexIndex, to: VertexIndex) -> GraphResult<Option<VertexIndex>> {
        self.check_bounds(from)?;
        self.check_bounds(to)?;
        Ok(self.next_hops[self.cell(from.0, to.0)])
    }

    /// Reconstruct the best path, both ends included.
    ///
    /// Empty when `to` is unreachable. A walk longer than the vertex count
    /// means the hops form a loop.
    pub fn path(&self, from: VertexIndex, to: VertexIndex) -> GraphResult<Vec<VertexIndex>> {
        let Some(mut cursor) = self.next_hop(from, to)? else {
            return Ok(Vec::new());
        };

        let mut path = vec![from];
        if from == to {
            return Ok(path);
        }

        loop {
            path.push(cursor);
            if cursor == to {
                return Ok(path);
            }
            if path.len() > self.size {
                return Err(GraphError::invariant(format!(
                    "path from {} to {} exceeds {} vertices",
                    from, to, self.size
                )));
            }
            cursor = self.next_hop(cursor, to)?.ok_or_else(|| {
                GraphError::invariant(format!(
                    "path from {} to {} breaks at {}",
                    from, to, cursor
                ))
            })?;
        }
    }
}
