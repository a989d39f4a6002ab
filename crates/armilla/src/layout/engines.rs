//! Placement algorithms.
//!
//! Every algorithm implements [`Placement`] with one contract: given sized
//! items and an adjacency list, return one center position per item,
//! honoring the spacing options. Algorithms compute in a top-to-bottom
//! frame; [`place`] transposes sizes going in and positions coming out for
//! horizontal directions, and flips an axis for the reversed ones. Absolute
//! offsets do not matter here: the layout engine normalizes each scope to
//! its bounding box afterwards.
//!
//! Algorithms must be deterministic. The force engine seeds its jitter; the
//! layered engine's `rust-sugiyama` pass is wrapped in `catch_unwind` and
//! falls back to a deterministic rank stack, so no scope can fail to place.

mod circular;
mod force;
mod grid;
mod layered;
mod mrtree;
mod radial;
mod stress;

use armilla_core::geometry::{Point, Size};

use crate::ast::{Direction, LayoutAlgorithm};

pub use grid::grid_place;

/// One sized unit to place: a node or an opaque container box.
#[derive(Debug, Clone, Copy)]
pub struct Item {
    pub size: Size,
}

impl Item {
    pub fn new(size: Size) -> Self {
        Self { size }
    }
}

/// Spacing and bound parameters passed to every algorithm.
#[derive(Debug, Clone, Copy)]
pub struct PlacementOptions {
    /// Minimum spacing between items within a rank, ring, or cluster.
    pub node_spacing: f32,
    /// Separation between ranks, rings, or tree levels.
    pub layer_spacing: f32,
    /// Upper bound on simulation iterations for the iterative engines.
    pub max_iterations: usize,
}

/// The placement contract shared by all algorithms.
pub trait Placement {
    /// Returns one center position per item, in item order.
    fn place(&self, items: &[Item], edges: &[(usize, usize)], opts: &PlacementOptions)
    -> Vec<Point>;
}

fn engine_for(algorithm: LayoutAlgorithm) -> &'static dyn Placement {
    match algorithm {
        LayoutAlgorithm::Layered => &layered::Layered,
        LayoutAlgorithm::Force => &force::Force,
        LayoutAlgorithm::Stress => &stress::Stress,
        LayoutAlgorithm::Radial => &radial::Radial,
        LayoutAlgorithm::Mrtree => &mrtree::Mrtree,
        LayoutAlgorithm::Circular => &circular::Circular,
    }
}

/// Places items with the selected algorithm, mapped into `direction`.
pub fn place(
    algorithm: LayoutAlgorithm,
    direction: Direction,
    items: &[Item],
    edges: &[(usize, usize)],
    opts: &PlacementOptions,
) -> Vec<Point> {
    if items.is_empty() {
        return Vec::new();
    }

    let horizontal = matches!(direction, Direction::LR | Direction::RL);
    let frame_items: Vec<Item> = if horizontal {
        items
            .iter()
            .map(|item| Item::new(item.size.transpose()))
            .collect()
    } else {
        items.to_vec()
    };

    let engine = engine_for(algorithm);
    let mut positions = engine.place(&frame_items, edges, opts);

    // An algorithm that could not place every item degrades to the grid,
    // never to a failed compile.
    if positions.len() != frame_items.len() {
        positions = grid::grid_place(&frame_items, opts);
    }

    for position in &mut positions {
        let mut p = *position;
        if horizontal {
            p = p.transpose();
        }
        match direction {
            Direction::RL => p = Point::new(-p.x(), p.y()),
            Direction::BT => p = Point::new(p.x(), -p.y()),
            Direction::LR | Direction::TB => {}
        }
        *position = p;
    }

    positions
}

#[cfg(test)]
pub(crate) fn items_of_size(count: usize, width: f32, height: f32) -> Vec<Item> {
    (0..count)
        .map(|_| Item::new(Size::new(width, height)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> PlacementOptions {
        PlacementOptions {
            node_spacing: 50.0,
            layer_spacing: 80.0,
            max_iterations: 300,
        }
    }

    #[test]
    fn every_algorithm_places_every_item() {
        let items = items_of_size(5, 60.0, 30.0);
        let edges = vec![(0, 1), (1, 2), (1, 3), (3, 4)];
        for algorithm in [
            LayoutAlgorithm::Layered,
            LayoutAlgorithm::Force,
            LayoutAlgorithm::Stress,
            LayoutAlgorithm::Radial,
            LayoutAlgorithm::Mrtree,
            LayoutAlgorithm::Circular,
        ] {
            let positions = place(algorithm, Direction::TB, &items, &edges, &options());
            assert_eq!(positions.len(), items.len(), "{algorithm:?}");
            for p in &positions {
                assert!(p.x().is_finite() && p.y().is_finite(), "{algorithm:?}");
            }
        }
    }

    #[test]
    fn empty_scope_places_nothing() {
        let positions = place(
            LayoutAlgorithm::Layered,
            Direction::TB,
            &[],
            &[],
            &options(),
        );
        assert!(positions.is_empty());
    }

    #[test]
    fn lr_direction_transposes_the_flow_axis() {
        let items = items_of_size(2, 60.0, 30.0);
        let edges = vec![(0, 1)];

        let tb = place(LayoutAlgorithm::Layered, Direction::TB, &items, &edges, &options());
        let lr = place(LayoutAlgorithm::Layered, Direction::LR, &items, &edges, &options());

        // TB separates along y, LR along x.
        assert!(tb[1].y() > tb[0].y());
        assert!((tb[1].x() - tb[0].x()).abs() < 1.0);
        assert!(lr[1].x() > lr[0].x());
        assert!((lr[1].y() - lr[0].y()).abs() < 1.0);
    }

    #[test]
    fn reversed_directions_flip_the_flow_axis() {
        let items = items_of_size(2, 60.0, 30.0);
        let edges = vec![(0, 1)];

        let bt = place(LayoutAlgorithm::Layered, Direction::BT, &items, &edges, &options());
        assert!(bt[1].y() < bt[0].y());

        let rl = place(LayoutAlgorithm::Layered, Direction::RL, &items, &edges, &options());
        assert!(rl[1].x() < rl[0].x());
    }

    #[test]
    fn placement_is_deterministic() {
        let items = items_of_size(8, 40.0, 40.0);
        let edges = vec![(0, 1), (0, 2), (2, 3), (4, 5), (6, 7)];
        for algorithm in [
            LayoutAlgorithm::Layered,
            LayoutAlgorithm::Force,
            LayoutAlgorithm::Stress,
            LayoutAlgorithm::Radial,
            LayoutAlgorithm::Mrtree,
            LayoutAlgorithm::Circular,
        ] {
            let a = place(algorithm, Direction::TB, &items, &edges, &options());
            let b = place(algorithm, Direction::TB, &items, &edges, &options());
            assert_eq!(a, b, "{algorithm:?} must be deterministic");
        }
    }
}
