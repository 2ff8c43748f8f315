//! Bucket grid over already placed planar points, used to find where to
//! re-seed the walk when it runs out of connected neighbours.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("no point found within the search radius")]
    NoPointFound,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct GridPoint {
    x: f64,
    y: f64,
    index: u32,
}

/// Append-only uniform grid keyed by `floor(coord / bucket_size)`.
///
/// Nearest queries are exact: rings are searched outward until no unvisited
/// ring can hold anything closer than the best candidate.
#[derive(Debug, Clone)]
pub struct PointGrid {
    bucket_size: f64,
    buckets: HashMap<(i64, i64), Vec<GridPoint>>,
    /// Inclusive bucket bounds of everything inserted so far.
    bounds: Option<((i64, i64), (i64, i64))>,
    len: usize,
}

/// Bucket keys are clamped to `±2^52` so ring arithmetic cannot overflow.
const MAX_BUCKET_KEY: f64 = 4_503_599_627_370_496.0;

impl PointGrid {
    pub const DEFAULT_BUCKET_SIZE: f64 = 5.0;

    #[must_use]
    pub fn new(bucket_size: f64) -> Self {
        let bucket_size = if bucket_size.is_finite() && bucket_size > 0.0 {
            bucket_size
        } else {
            Self::DEFAULT_BUCKET_SIZE
        };
        Self {
            bucket_size,
            buckets: HashMap::new(),
            bounds: None,
            len: 0,
        }
    }

    /// Picks a bucket size giving roughly one point per bucket over the
    /// bounding box of `coords` (packed xy).
    #[must_use]
    pub fn bucket_size_for(coords: &[f64]) -> f64 {
        let count = coords.len() / 2;
        if count == 0 {
            return Self::DEFAULT_BUCKET_SIZE;
        }
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in coords.chunks_exact(2) {
            min_x = min_x.min(p[0]);
            min_y = min_y.min(p[1]);
            max_x = max_x.max(p[0]);
            max_y = max_y.max(p[1]);
        }
        let extent = (max_x - min_x).max(max_y - min_y);
        #[allow(clippy::cast_precision_loss)]
        let size = extent / (count as f64).sqrt();
        if size.is_finite() && size > 0.0 { size } else { Self::DEFAULT_BUCKET_SIZE }
    }

    #[must_use]
    pub fn bucket_size(&self) -> f64 {
        self.bucket_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[allow(clippy::cast_possible_truncation)]
    fn bucket_of(&self, coord: f64) -> i64 {
        (coord / self.bucket_size).floor().clamp(-MAX_BUCKET_KEY, MAX_BUCKET_KEY) as i64
    }

    pub fn insert(&mut self, x: f64, y: f64, index: u32) {
        let key = (self.bucket_of(x), self.bucket_of(y));
        self.buckets.entry(key).or_default().push(GridPoint { x, y, index });
        self.bounds = Some(match self.bounds {
            None => (key, key),
            Some((lo, hi)) => ((lo.0.min(key.0), lo.1.min(key.1)), (hi.0.max(key.0), hi.1.max(key.1))),
        });
        self.len += 1;
    }

    /// Index of the inserted point closest to `(x, y)`.
    ///
    /// Ties resolve to the smallest index so results do not depend on
    /// insertion order within a bucket.
    pub fn nearest(&self, x: f64, y: f64) -> Result<u32, GridError> {
        let Some((lo, hi)) = self.bounds else {
            return Err(GridError::NoPointFound);
        };
        let bx = self.bucket_of(x);
        let by = self.bucket_of(y);

        // Rings closer than the occupied bounds are empty; rings past them too.
        let first_ring = (lo.0 - bx).max(bx - hi.0).max(lo.1 - by).max(by - hi.1).max(0);
        let max_ring = (bx - lo.0).abs().max((hi.0 - bx).abs()).max((by - lo.1).abs()).max((hi.1 - by).abs());
        let occupied = i64::try_from(self.buckets.len()).unwrap_or(i64::MAX);

        let mut best: Option<(f64, u32)> = None;
        for ring in first_ring..=max_ring {
            // The query may sit anywhere in its bucket, so ring `r` is at
            // least `r - 1` buckets away.
            #[allow(clippy::cast_precision_loss)]
            let ring_dist = (ring - 1).max(0) as f64 * self.bucket_size;
            if let Some((best_d2, _)) = best {
                if ring_dist * ring_dist > best_d2 {
                    break;
                }
            }

            // A ring with more cells than there are occupied buckets is
            // cheaper to answer by visiting every bucket.
            if ring.saturating_mul(8) > occupied {
                for bucket in self.buckets.values() {
                    consider(&mut best, bucket, x, y);
                }
                break;
            }

            for key in ring_cells(bx, by, ring) {
                if key.0 < lo.0 || key.0 > hi.0 || key.1 < lo.1 || key.1 > hi.1 {
                    continue;
                }
                if let Some(bucket) = self.buckets.get(&key) {
                    consider(&mut best, bucket, x, y);
                }
            }
        }

        best.map(|(_, index)| index).ok_or(GridError::NoPointFound)
    }
}

fn consider(best: &mut Option<(f64, u32)>, bucket: &[GridPoint], x: f64, y: f64) {
    for point in bucket {
        let dx = point.x - x;
        let dy = point.y - y;
        let d2 = dx * dx + dy * dy;
        let better = match *best {
            None => true,
            Some((best_d2, best_index)) => d2 < best_d2 || (d2 == best_d2 && point.index < best_index),
        };
        if better {
            *best = Some((d2, point.index));
        }
    }
}

/// Buckets at Chebyshev distance exactly `ring` from `(bx, by)`.
fn ring_cells(bx: i64, by: i64, ring: i64) -> impl Iterator<Item = (i64, i64)> {
    let rows = (bx - ring..=bx + ring).flat_map(move |i| {
        let bottom = std::iter::once((i, by - ring));
        let top = (ring > 0).then_some((i, by + ring));
        bottom.chain(top)
    });
    let columns = (by - ring + 1..by + ring).flat_map(move |j| [(bx - ring, j), (bx + ring, j)]);
    rows.chain(columns)
}
