//! Deterministic grid placement.
//!
//! The shared fallback: used directly for degenerate scopes and by any
//! algorithm that cannot produce a position for every item, so a compile
//! never fails on layout.

use armilla_core::geometry::Point;

use super::{Item, PlacementOptions};

/// Places items into rows of `ceil(sqrt(n))` columns, in item order.
pub fn grid_place(items: &[Item], opts: &PlacementOptions) -> Vec<Point> {
    if items.is_empty() {
        return Vec::new();
    }

    let columns = (items.len() as f32).sqrt().ceil() as usize;
    let mut positions = Vec::with_capacity(items.len());
    let mut y_cursor = 0.0;

    for row in items.chunks(columns) {
        let row_height = row
            .iter()
            .map(|item| item.size.height())
            .fold(0.0, f32::max);

        let mut x_cursor = 0.0;
        for item in row {
            positions.push(Point::new(
                x_cursor + item.size.width() / 2.0,
                y_cursor + row_height / 2.0,
            ));
            x_cursor += item.size.width() + opts.node_spacing;
        }

        y_cursor += row_height + opts.layer_spacing;
    }

    positions
}
