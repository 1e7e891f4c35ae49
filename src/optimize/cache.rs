use std::collections::VecDeque;

use serde::Serialize;

/// Post-transform vertex cache efficiency of an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStatistics {
    /// Average cache misses per triangle. Lower is better.
    pub acmr: f32,
    /// Share of vertex fetches served from the cache, in percent.
    pub hit_percent: f32,
    pub misses: usize,
    pub num_triangles: usize,
}

/// FIFO vertex cache.
///
/// Membership is tracked with insertion timestamps: a vertex is resident while
/// fewer than `size` other vertices have been inserted after it.
struct FifoCache {
    size: usize,
    timestamp: u64,
    inserted_at: Vec<u64>,
    resident: VecDeque<u32>,
}

impl FifoCache {
    fn new(size: usize, num_vertices: usize) -> Self {
        Self {
            size,
            timestamp: size as u64 + 1,
            inserted_at: vec![0; num_vertices],
            resident: VecDeque::with_capacity(size + 1),
        }
    }

    #[inline]
    fn contains(&self, v: u32) -> bool {
        self.timestamp - self.inserted_at[v as usize] <= self.size as u64
    }

    /// Fetches `v`, returning whether it was a miss.
    #[inline]
    fn access(&mut self, v: u32) -> bool {
        if self.contains(v) {
            return false;
        }
        self.inserted_at[v as usize] = self.timestamp;
        self.timestamp += 1;
        self.resident.push_back(v);
        if self.resident.len() > self.size {
            self.resident.pop_front();
        }
        true
    }
}

/// Simulates a FIFO cache of `cache_size` entries over `indices`.
///
/// # Panics
/// If an index is not below `num_vertices`.
pub fn analyze_post_transform(indices: &[u32], num_vertices: usize, cache_size: usize) -> CacheStatistics {
    let num_triangles = indices.len() / 3;
    let mut cache = FifoCache::new(cache_size, num_vertices);
    let misses = indices.iter().filter(|&&v| cache.access(v)).count();

    if indices.is_empty() {
        return CacheStatistics { acmr: 0.0, hit_percent: 0.0, misses: 0, num_triangles: 0 };
    }

    let hits = indices.len() - misses;
    CacheStatistics {
        acmr: misses as f32 / num_triangles as f32,
        hit_percent: hits as f32 / indices.len() as f32 * 100.0,
        misses,
        num_triangles,
    }
}

/// Vertex to triangle adjacency, compacted as triangles are emitted so that
/// only live triangles are ever visited.
struct Adjacency {
    offsets: Vec<usize>,
    live: Vec<usize>,
    data: Vec<usize>,
}

impl Adjacency {
    fn new(indices: &[u32], num_vertices: usize) -> Self {
        let mut live = vec![0_usize; num_vertices];
        for &v in indices {
            live[v as usize] += 1;
        }

        let mut offsets = Vec::with_capacity(num_vertices + 1);
        let mut acc = 0;
        for &count in &live {
            offsets.push(acc);
            acc += count;
        }
        offsets.push(acc);

        let mut fill = offsets[..num_vertices].to_vec();
        let mut data = vec![0_usize; indices.len()];
        for (t, tri) in indices.chunks_exact(3).enumerate() {
            for &v in tri {
                data[fill[v as usize]] = t;
                fill[v as usize] += 1;
            }
        }

        Self { offsets, live, data }
    }

    #[inline]
    fn triangles(&self, v: u32) -> &[usize] {
        let start = self.offsets[v as usize];
        &self.data[start..start + self.live[v as usize]]
    }

    fn remove(&mut self, v: u32, t: usize) {
        let start = self.offsets[v as usize];
        let live = self.live[v as usize];
        let list = &mut self.data[start..start + live];
        if let Some(pos) = list.iter().position(|&x| x == t) {
            list.swap(pos, live - 1);
            self.live[v as usize] -= 1;
        }
    }
}

/// Greedy triangle ordering for a FIFO cache of `cache_size` entries.
///
/// At each step the live triangle with the most corners already in the cache is
/// emitted; ties go to the triangle that came first in the input. When no live
/// triangle touches the cache, the first remaining input triangle is taken.
/// Returns the new triangle order as input triangle numbers.
///
/// # Panics
/// If an index is not below `num_vertices`.
pub fn optimize_post_transform(indices: &[u32], num_vertices: usize, cache_size: usize) -> Vec<usize> {
    let num_triangles = indices.len() / 3;
    let mut adjacency = Adjacency::new(indices, num_vertices);
    let mut cache = FifoCache::new(cache_size, num_vertices);
    let mut emitted = vec![false; num_triangles];
    let mut order = Vec::with_capacity(num_triangles);
    let mut next_input = 0;

    let score = |cache: &FifoCache, t: usize| {
        indices[3 * t..3 * t + 3].iter().filter(|&&v| cache.contains(v)).count()
    };

    while order.len() < num_triangles {
        let mut best: Option<(usize, usize)> = None;
        for &v in &cache.resident {
            for &t in adjacency.triangles(v) {
                let s = score(&cache, t);
                let better = match best {
                    None => true,
                    Some((best_score, best_t)) => s > best_score || (s == best_score && t < best_t),
                };
                if better {
                    best = Some((s, t));
                }
            }
        }

        let t = match best {
            Some((_, t)) => t,
            None => {
                while emitted[next_input] {
                    next_input += 1;
                }
                next_input
            }
        };

        emitted[t] = true;
        order.push(t);
        for &v in &indices[3 * t..3 * t + 3] {
            adjacency.remove(v, t);
        }
        for &v in &indices[3 * t..3 * t + 3] {
            cache.access(v);
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `n` x `n` quads split into two triangles each, emitted row by row.
    pub(crate) fn grid(n: u32) -> (Vec<u32>, usize) {
        let w = n + 1;
        let mut indices = Vec::new();
        for y in 0..n {
            for x in 0..n {
                let i = y * w + x;
                indices.extend_from_slice(&[i, i + 1, i + w + 1]);
                indices.extend_from_slice(&[i, i + w + 1, i + w]);
            }
        }
        (indices, (w * w) as usize)
    }

    #[test]
    fn single_triangle() {
        let stats = analyze_post_transform(&[0, 1, 2], 3, 32);
        assert_eq!(stats.misses, 3);
        assert_eq!(stats.acmr, 3.0);
        assert_eq!(stats.hit_percent, 0.0);
    }

    #[test]
    fn shared_edge_hits() {
        let stats = analyze_post_transform(&[0, 1, 2, 2, 1, 3], 4, 32);
        assert_eq!(stats.misses, 4);
        assert_eq!(stats.acmr, 2.0);
        assert!((stats.hit_percent - 100.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn fifo_evicts_oldest() {
        // with room for two vertices, 0 is gone by the time it is fetched again
        let stats = analyze_post_transform(&[0, 1, 2, 0, 1, 2], 3, 2);
        assert_eq!(stats.misses, 6);
        let stats = analyze_post_transform(&[0, 1, 2, 0, 1, 2], 3, 3);
        assert_eq!(stats.misses, 3);
    }

    #[test]
    fn empty_index_buffer() {
        let stats = analyze_post_transform(&[], 0, 32);
        assert_eq!(stats.acmr, 0.0);
        assert_eq!(stats.num_triangles, 0);
    }

    #[test]
    fn order_is_a_permutation() {
        let (indices, num_vertices) = grid(12);
        let order = optimize_post_transform(&indices, num_vertices, 16);
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..indices.len() / 3).collect::<Vec<_>>());
    }

    #[test]
    fn strip_is_left_alone() {
        // each triangle shares an edge with the previous one; input order is already ideal
        let indices = [0, 1, 2, 1, 3, 2, 2, 3, 4, 3, 5, 4];
        assert_eq!(optimize_post_transform(&indices, 6, 32), vec![0, 1, 2, 3]);
    }

    #[test]
    fn interleaved_input_is_regrouped() {
        // two disjoint quads with their triangles interleaved
        let indices = [0, 1, 2, 4, 5, 6, 0, 2, 3, 4, 6, 7];
        let order = optimize_post_transform(&indices, 8, 32);
        assert_eq!(order, vec![0, 2, 1, 3]);
    }

    #[test]
    fn deterministic() {
        let (indices, num_vertices) = grid(20);
        let a = optimize_post_transform(&indices, num_vertices, 8);
        let b = optimize_post_transform(&indices, num_vertices, 8);
        assert_eq!(a, b);
    }

    #[test]
    fn scattered_grid_improves() {
        let (grid_indices, num_vertices) = grid(20);
        let num_triangles = grid_indices.len() / 3;
        // visit the triangles with a stride coprime to their count
        let indices: Vec<u32> = (0..num_triangles)
            .map(|t| (t * 37) % num_triangles)
            .flat_map(|t| grid_indices[3 * t..3 * t + 3].iter().copied())
            .collect();

        let before = analyze_post_transform(&indices, num_vertices, 16);
        let order = optimize_post_transform(&indices, num_vertices, 16);
        let reordered: Vec<u32> = order.iter().flat_map(|&t| indices[3 * t..3 * t + 3].iter().copied()).collect();
        let after = analyze_post_transform(&reordered, num_vertices, 16);

        assert!(before.acmr > 2.0);
        assert!(after.acmr < before.acmr, "{} >= {}", after.acmr, before.acmr);
        assert!(after.acmr >= 0.5);
    }
}
