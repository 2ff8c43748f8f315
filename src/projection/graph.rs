//! Neighbour graph over the planar points, derived from their triangulation.

/// Undirected adjacency: `neighbors[i]` is sorted and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanarGraph {
    neighbors: Vec<Vec<u32>>,
}

impl PlanarGraph {
    /// Builds the graph for `point_count` points from a flat triangle list.
    ///
    /// Indices must already be validated against `point_count`; a trailing
    /// partial triangle is ignored.
    #[must_use]
    pub fn from_triangles(point_count: usize, triangles: &[u32]) -> Self {
        let mut neighbors = vec![Vec::new(); point_count];
        for tri in triangles.chunks_exact(3) {
            let (a, b, c) = (tri[0], tri[1], tri[2]);
            neighbors[a as usize].extend([b, c]);
            neighbors[b as usize].extend([a, c]);
            neighbors[c as usize].extend([a, b]);
        }

        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        Self { neighbors }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    #[must_use]
    pub fn neighbors(&self, index: usize) -> &[u32] {
        self.neighbors.get(index).map_or(&[], Vec::as_slice)
    }

    /// Number of connected components, counting isolated points.
    #[must_use]
    pub fn component_count(&self) -> usize {
        let mut seen = vec![false; self.neighbors.len()];
        let mut stack = Vec::new();
        let mut count = 0;
        for root in 0..self.neighbors.len() {
            if seen[root] {
                continue;
            }
            count += 1;
            seen[root] = true;
            stack.push(root);
            while let Some(i) = stack.pop() {
                for &n in &self.neighbors[i] {
                    let n = n as usize;
                    if !seen[n] {
                        seen[n] = true;
                        stack.push(n);
                    }
                }
            }
        }
        count
    }
}
