//! Radial placement: the root at the center, successive BFS depths on
//! concentric rings.

use std::collections::VecDeque;

use armilla_core::geometry::Point;

use super::{Item, Placement, PlacementOptions};

pub struct Radial;

impl Placement for Radial {
    fn place(
        &self,
        items: &[Item],
        edges: &[(usize, usize)],
        opts: &PlacementOptions,
    ) -> Vec<Point> {
        let count = items.len();
        if count == 0 {
            return Vec::new();
        }

        let rings = bfs_rings(count, edges);
        let mut positions = vec![Point::default(); count];

        // Ring radii accumulate so adjacent rings clear each other's
        // largest items plus the configured layer spacing.
        let mut radius = 0.0f32;
        let mut previous_extent = 0.0f32;

        for (depth, ring) in rings.iter().enumerate() {
            let ring_extent = ring
                .iter()
                .map(|&item| items[item].size.extent())
                .fold(0.0, f32::max);

            if depth > 0 {
                radius += previous_extent / 2.0 + opts.layer_spacing + ring_extent / 2.0;
                // A ring must also be long enough for its members to sit
                // side by side.
                let needed_circumference: f32 = ring
                    .iter()
                    .map(|&item| items[item].size.extent() + opts.node_spacing)
                    .sum();
                radius = radius.max(needed_circumference / std::f32::consts::TAU);
            }

            for (slot, &item) in ring.iter().enumerate() {
                if depth == 0 {
                    positions[item] = Point::default();
                } else {
                    let angle = std::f32::consts::TAU * slot as f32 / ring.len() as f32
                        - std::f32::consts::FRAC_PI_2;
                    positions[item] = Point::new(radius * angle.cos(), radius * angle.sin());
                }
            }

            previous_extent = ring_extent;
        }

        positions
    }
}

/// BFS depths from a root chosen by out-degree (ties to the lowest index);
/// disconnected remainders restart at depth zero's ring successor, keeping
/// the forest on shared rings.
fn bfs_rings(count: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut out_degree = vec![0usize; count];
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); count];
    for &(source, target) in edges {
        if source != target && source < count && target < count {
            out_degree[source] += 1;
            neighbors[source].push(target);
            neighbors[target].push(source);
        }
    }

    let root = (0..count)
        .max_by(|&a, &b| out_degree[a].cmp(&out_degree[b]).then(b.cmp(&a)))
        .unwrap_or(0);

    let mut rings: Vec<Vec<usize>> = Vec::new();
    let mut visited = vec![false; count];
    let mut queue = VecDeque::from([(root, 0usize)]);

    loop {
        while let Some((item, depth)) = queue.pop_front() {
            if visited[item] {
                continue;
            }
            visited[item] = true;
            while rings.len() <= depth {
                rings.push(Vec::new());
            }
            rings[depth].push(item);

            for &next in &neighbors[item] {
                if !visited[next] {
                    queue.push_back((next, depth + 1));
                }
            }
        }

        // Disconnected items join the outermost ring's depth.
        match visited.iter().position(|&v| !v) {
            Some(item) => {
                let depth = rings.len().saturating_sub(1).max(1);
                queue.push_back((item, depth));
            }
            None => break,
        }
    }

    rings
}
