//! Single-ring placement.
//!
//! Items sit on one circle in item order, starting at twelve o'clock. The
//! radius comes from the circumference needed to give every item its extent
//! plus spacing, with a floor for very small scopes.

use armilla_core::geometry::Point;

use super::{Item, Placement, PlacementOptions};

const MIN_RADIUS: f32 = 40.0;

pub struct Circular;

impl Placement for Circular {
    fn place(
        &self,
        items: &[Item],
        _edges: &[(usize, usize)],
        opts: &PlacementOptions,
    ) -> Vec<Point> {
        let count = items.len();
        if count == 0 {
            return Vec::new();
        }
        if count == 1 {
            return vec![Point::default()];
        }

        let circumference: f32 = items
            .iter()
            .map(|item| item.size.extent() + opts.node_spacing)
            .sum();
        let radius = (circumference / std::f32::consts::TAU).max(MIN_RADIUS);

        items
            .iter()
            .enumerate()
            .map(|(index, _)| {
                let angle = std::f32::consts::TAU * index as f32 / count as f32
                    - std::f32::consts::FRAC_PI_2;
                Point::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect()
    }
}
