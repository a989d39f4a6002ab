//! Force-directed placement.
//!
//! A spring/repulsion simulation: connected items attract proportionally to
//! their distance, all pairs repel with extra pressure inside a size-derived
//! minimum distance, and velocities are damped each step. Initial positions
//! come from a grid with seeded jitter, so two runs over the same scope are
//! byte-identical.

use armilla_core::geometry::{Point, Size};
use rand::{Rng, RngExt, SeedableRng, rngs::StdRng};

use super::{Item, Placement, PlacementOptions};

const SPRING_CONSTANT: f32 = 0.1;
const REPULSION_CONSTANT: f32 = 1000.0;
const DAMPING_FACTOR: f32 = 0.85;

/// Fixed jitter seed; determinism is part of the output contract.
const JITTER_SEED: u64 = 0x41524d_494c4c41;

/// Scale cap applied after the simulation settles.
const MAX_DIMENSION: f32 = 1200.0;

pub struct Force;

impl Placement for Force {
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
        if count == 1 {
            return vec![Point::default()];
        }

        let mut positions = initialize_positions(items, opts);
        let mut velocities = vec![(0.0f32, 0.0f32); count];

        for _ in 0..opts.max_iterations {
            let mut forces = vec![(0.0f32, 0.0f32); count];

            // Pairwise repulsion, stronger inside the minimum distance.
            for i in 0..count {
                for j in 0..count {
                    if i == j {
                        continue;
                    }
                    let delta = positions[i] - positions[j];
                    let distance = delta.hypot().max(1.0);
                    let min_distance =
                        pair_min_distance(items[i].size, items[j].size, opts.node_spacing);

                    let force_factor = if distance < min_distance {
                        REPULSION_CONSTANT * (min_distance / distance).powf(2.0)
                    } else {
                        REPULSION_CONSTANT / distance
                    };

                    forces[i].0 += force_factor * delta.x() / distance;
                    forces[i].1 += force_factor * delta.y() / distance;
                }
            }

            // Spring attraction along edges.
            for &(source, target) in edges {
                if source == target || source >= count || target >= count {
                    continue;
                }
                let delta = positions[source] - positions[target];
                let distance = delta.hypot().max(1.0);
                let force = SPRING_CONSTANT * distance;
                let force_x = force * delta.x() / distance;
                let force_y = force * delta.y() / distance;

                forces[source].0 -= force_x;
                forces[source].1 -= force_y;
                forces[target].0 += force_x;
                forces[target].1 += force_y;
            }

            for i in 0..count {
                let (vx, vy) = velocities[i];
                let (fx, fy) = forces[i];
                let new_vx = (vx + fx) * DAMPING_FACTOR;
                let new_vy = (vy + fy) * DAMPING_FACTOR;
                velocities[i] = (new_vx, new_vy);
                positions[i] = Point::new(positions[i].x() + new_vx, positions[i].y() + new_vy);
            }
        }

        center_and_cap(&mut positions);
        positions
    }
}

/// Grid initialization with seeded jitter to break symmetry.
fn initialize_positions(items: &[Item], opts: &PlacementOptions) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(JITTER_SEED);
    let grid_size = (items.len() as f32).sqrt().ceil() as usize;
    let cell_size = (opts.node_spacing
        + items
            .iter()
            .map(|item| item.size.extent())
            .fold(0.0, f32::max))
        * 1.5;

    items
        .iter()
        .enumerate()
        .map(|(index, _)| {
            let row = index / grid_size;
            let column = index % grid_size;
            let jitter_x: f32 = rng.random_range(-20.0..20.0);
            let jitter_y: f32 = rng.random_range(-20.0..20.0);
            Point::new(
                column as f32 * cell_size + jitter_x,
                row as f32 * cell_size + jitter_y,
            )
        })
        .collect()
}

/// Minimum comfortable distance between two items' centers.
fn pair_min_distance(a: Size, b: Size, node_spacing: f32) -> f32 {
    (a.width() + b.width() + a.height() + b.height()) / 4.0 + node_spacing
}

/// Centers the cloud on the origin and caps runaway spreads.
fn center_and_cap(positions: &mut [Point]) {
    if positions.is_empty() {
        return;
    }

    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for p in positions.iter() {
        min_x = min_x.min(p.x());
        min_y = min_y.min(p.y());
        max_x = max_x.max(p.x());
        max_y = max_y.max(p.y());
    }

    let center = Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    for p in positions.iter_mut() {
        *p = *p - center;
    }

    let width = max_x - min_x;
    let height = max_y - min_y;
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        let scale = MAX_DIMENSION / width.max(height);
        for p in positions.iter_mut() {
            *p = p.scale(scale);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::items_of_size;
    use super::*;

    fn options() -> PlacementOptions {
        PlacementOptions {
            node_spacing: 50.0,
            layer_spacing: 80.0,
            max_iterations: 120,
        }
    }

    #[test]
    fn connected_pairs_sit_closer_than_strangers() {
        let items = items_of_size(4, 40.0, 40.0);
        let positions = Force.place(&items, &[(0, 1)], &options());

        let connected = positions[0].distance_to(positions[1]);
        let strangers = positions[2].distance_to(positions[3]);
        assert!(connected < strangers);
    }

    #[test]
    fn items_keep_a_minimum_separation() {
        let items = items_of_size(5, 40.0, 40.0);
        let positions = Force.place(&items, &[(0, 1), (1, 2), (2, 3), (3, 4)], &options());

        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                assert!(
                    positions[i].distance_to(positions[j]) > 20.0,
                    "items {i} and {j} collapsed together"
                );
            }
        }
    }

    #[test]
    fn iteration_cap_is_honored_for_tiny_budgets() {
        let items = items_of_size(3, 40.0, 40.0);
        let tight = PlacementOptions {
            max_iterations: 1,
            ..options()
        };
        let positions = Force.place(&items, &[(0, 1)], &tight);
        assert_eq!(positions.len(), 3);
    }

    #[test]
    fn single_item_sits_at_origin() {
        let items = items_of_size(1, 40.0, 40.0);
        assert_eq!(Force.place(&items, &[], &options()), vec![Point::default()]);
    }
}
