//! Stress-majorization placement.
//!
//! Follows the standard formulation: target distances are graph-theoretic
//! (BFS hop counts scaled by an ideal edge length), weights are `1/d²`, and
//! each sweep moves every item to the weighted average of the positions its
//! peers would assign it. Initialization is a deterministic circle; sweeps
//! stop early once the largest move falls under a threshold.

use std::collections::VecDeque;

use armilla_core::geometry::Point;

use super::{Item, Placement, PlacementOptions, grid_place};

/// Sweeps stop once no item moved farther than this.
const CONVERGENCE_THRESHOLD: f32 = 0.5;

/// Upper bound on sweeps regardless of the configured iteration budget.
const MAX_SWEEPS: usize = 60;

pub struct Stress;

impl Placement for Stress {
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
        if edges.is_empty() {
            // No distances to preserve; the grid is the honest answer.
            return grid_place(items, opts);
        }

        let ideal = ideal_edge_length(items, opts);
        let distances = bfs_distances(count, edges);

        // Deterministic circle initialization.
        let radius = (ideal * count as f32 / std::f32::consts::TAU).max(ideal);
        let mut positions: Vec<Point> = (0..count)
            .map(|index| {
                let angle = std::f32::consts::TAU * index as f32 / count as f32;
                Point::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect();

        let sweeps = MAX_SWEEPS.min(opts.max_iterations.max(1));
        for _ in 0..sweeps {
            let mut max_move = 0.0f32;

            for i in 0..count {
                let mut weight_sum = 0.0f32;
                let mut target_x = 0.0f32;
                let mut target_y = 0.0f32;

                for j in 0..count {
                    if i == j {
                        continue;
                    }
                    let hops = distances[i][j];
                    let target_distance = ideal * hops as f32;
                    let weight = 1.0 / (target_distance * target_distance);

                    let delta = positions[i] - positions[j];
                    let current = delta.hypot().max(0.01);
                    // Where j would like i to sit: at the ideal distance
                    // along their current direction.
                    let desired = positions[j] + delta.scale(target_distance / current);

                    weight_sum += weight;
                    target_x += weight * desired.x();
                    target_y += weight * desired.y();
                }

                if weight_sum > 0.0 {
                    let next = Point::new(target_x / weight_sum, target_y / weight_sum);
                    max_move = max_move.max(positions[i].distance_to(next));
                    positions[i] = next;
                }
            }

            if max_move < CONVERGENCE_THRESHOLD {
                break;
            }
        }

        positions
    }
}

/// Ideal length of one hop: the requested spacing plus the mean item extent.
fn ideal_edge_length(items: &[Item], opts: &PlacementOptions) -> f32 {
    let mean_extent =
        items.iter().map(|item| item.size.extent()).sum::<f32>() / items.len() as f32;
    opts.node_spacing + mean_extent
}

/// All-pairs hop counts via BFS from every item. Unreachable pairs get the
/// item count as an effective diameter, which keeps components apart
/// without special-casing them.
fn bfs_distances(count: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); count];
    for &(source, target) in edges {
        if source != target && source < count && target < count {
            neighbors[source].push(target);
            neighbors[target].push(source);
        }
    }

    let mut distances = vec![vec![count; count]; count];
    for start in 0..count {
        distances[start][start] = 0;
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for &next in &neighbors[current] {
                if distances[start][next] == count && next != start {
                    distances[start][next] = distances[start][current] + 1;
                    queue.push_back(next);
                }
            }
        }
    }

    distances
}

#[cfg(test)]
mod tests {
    use super::super::items_of_size;
    use super::*;

    fn options() -> PlacementOptions {
        PlacementOptions {
            node_spacing: 50.0,
            layer_spacing: 80.0,
            max_iterations: 300,
        }
    }

    #[test]
    fn hop_distances_shape_the_embedding() {
        // Path 0-1-2-3: the ends must land farther apart than neighbors.
        let items = items_of_size(4, 40.0, 40.0);
        let positions = Stress.place(&items, &[(0, 1), (1, 2), (2, 3)], &options());

        let adjacent = positions[0].distance_to(positions[1]);
        let ends = positions[0].distance_to(positions[3]);
        assert!(ends > adjacent * 1.5);
    }

    #[test]
    fn neighbors_approach_the_ideal_length() {
        let items = items_of_size(3, 40.0, 40.0);
        let opts = options();
        let positions = Stress.place(&items, &[(0, 1), (1, 2)], &opts);

        let ideal = ideal_edge_length(&items, &opts);
        let d = positions[0].distance_to(positions[1]);
        assert!(d > ideal * 0.5 && d < ideal * 2.0, "distance {d} vs ideal {ideal}");
    }

    #[test]
    fn edgeless_input_degrades_to_grid() {
        let items = items_of_size(4, 40.0, 40.0);
        let positions = Stress.place(&items, &[], &options());
        assert_eq!(positions.len(), 4);
    }

    #[test]
    fn bfs_distances_count_hops() {
        let distances = bfs_distances(4, &[(0, 1), (1, 2), (2, 3)]);
        assert_eq!(distances[0][3], 3);
        assert_eq!(distances[3][0], 3);
        assert_eq!(distances[1][1], 0);
    }

    #[test]
    fn unreachable_pairs_use_the_diameter_stand_in() {
        let distances = bfs_distances(4, &[(0, 1), (2, 3)]);
        assert_eq!(distances[0][2], 4);
    }
}
